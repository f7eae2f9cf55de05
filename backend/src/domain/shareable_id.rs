//! Shareable identifiers for linked bank accounts.
//!
//! A shareable id lets a user hand out a reference to one of their accounts
//! (for example to receive a transfer) without exposing the provider's raw
//! account identifier in URLs. It is an obfuscation, not encryption: anyone
//! holding the id can decode it.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::ExternalAccountId;

/// Errors raised when decoding a shareable id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareableIdError {
    /// The text was not URL-safe unpadded base64.
    #[error("shareable id is not valid base64: {0}")]
    Encoding(String),
    /// The decoded bytes were not UTF-8.
    #[error("shareable id does not decode to UTF-8 text")]
    NotUtf8,
    /// The decoded text was not a valid account identifier.
    #[error("shareable id does not decode to an account id: {0}")]
    InvalidAccountId(String),
}

/// URL-safe, unpadded base64 of an external account identifier.
///
/// # Examples
/// ```
/// use bankdash::domain::{ExternalAccountId, ShareableId};
///
/// let account = ExternalAccountId::new("vzeNDwK7KQIm4yEog683uElbp9GRLEFXGK98D").unwrap();
/// let shareable = ShareableId::encode(&account);
/// assert_eq!(shareable.decode().unwrap(), account);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareableId(String);

impl ShareableId {
    /// Deterministically encode an account identifier.
    pub fn encode(account_id: &ExternalAccountId) -> Self {
        Self(URL_SAFE_NO_PAD.encode(account_id.as_str().as_bytes()))
    }

    /// Wrap previously encoded text without validating it.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Recover the account identifier.
    pub fn decode(&self) -> Result<ExternalAccountId, ShareableIdError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|err| ShareableIdError::Encoding(err.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|_| ShareableIdError::NotUtf8)?;
        ExternalAccountId::new(text).map_err(|err| ShareableIdError::InvalidAccountId(err.to_string()))
    }

    /// Borrow the encoded text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ShareableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
