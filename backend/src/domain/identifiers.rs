//! Opaque identifiers issued by the external platforms.
//!
//! The identity backend, the bank-link provider and the document store all
//! mint their own string identifiers. The domain never interprets them beyond
//! requiring that they are present and carry no surrounding whitespace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the identifier constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    /// The identifier was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind, used in the message.
        kind: &'static str,
    },
    /// The identifier carried leading or trailing whitespace.
    #[error("{kind} must not contain surrounding whitespace")]
    SurroundingWhitespace {
        /// Identifier kind, used in the message.
        kind: &'static str,
    },
}

macro_rules! opaque_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(IdentifierValidationError::Empty { kind: $kind });
                }
                if value.trim() != value {
                    return Err(IdentifierValidationError::SurroundingWhitespace { kind: $kind });
                }
                Ok(Self(value))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

opaque_identifier!(
    /// Identity-backend user identifier.
    ///
    /// # Examples
    /// ```
    /// use bankdash::domain::UserId;
    ///
    /// let id = UserId::new("64f0c2a1b3").expect("valid id");
    /// assert_eq!(id.as_str(), "64f0c2a1b3");
    /// assert!(UserId::new(" 64f0 ").is_err());
    /// ```
    UserId,
    "user id"
);

opaque_identifier!(
    /// Document-store identifier of a persisted record.
    DocumentId,
    "document id"
);

opaque_identifier!(
    /// Bank-link provider item identifier (one per linked institution login).
    ItemId,
    "item id"
);

opaque_identifier!(
    /// Bank-link provider identifier of one external account.
    ExternalAccountId,
    "external account id"
);
