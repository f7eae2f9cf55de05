//! Resource URLs handed out by the payment processor.
//!
//! The processor identifies customers and funding sources by absolute URL,
//! returned in the `Location` header of the creating request. Both wrappers
//! require an absolute `http` or `https` URL.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Validation errors for processor resource URLs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceUrlError {
    /// The value did not parse as an absolute URL.
    #[error("{kind} is not an absolute URL: {value}")]
    Unparseable {
        /// Resource kind, used in the message.
        kind: &'static str,
        /// Offending input.
        value: String,
    },
    /// The URL used a scheme other than http or https.
    #[error("{kind} must use http or https, got {scheme}")]
    UnsupportedScheme {
        /// Resource kind, used in the message.
        kind: &'static str,
        /// Offending scheme.
        scheme: String,
    },
    /// The URL path had no final segment to take an identifier from.
    #[error("{kind} has no trailing path segment")]
    MissingIdentifier {
        /// Resource kind, used in the message.
        kind: &'static str,
    },
}

fn parse_http_url(kind: &'static str, raw: &str) -> Result<Url, ResourceUrlError> {
    let url = Url::parse(raw.trim()).map_err(|_| ResourceUrlError::Unparseable {
        kind,
        value: raw.to_owned(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ResourceUrlError::UnsupportedScheme {
            kind,
            scheme: other.to_owned(),
        }),
    }
}

fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|segment| !segment.is_empty()).next_back()
}

/// Processor customer URL.
///
/// # Examples
/// ```
/// use bankdash::domain::CustomerUrl;
///
/// let url = CustomerUrl::parse("https://api-sandbox.dwolla.com/customers/abc-123").unwrap();
/// assert_eq!(url.customer_id().unwrap(), "abc-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerUrl(Url);

impl CustomerUrl {
    const KIND: &'static str = "customer url";

    /// Validate a customer URL.
    pub fn parse(raw: &str) -> Result<Self, ResourceUrlError> {
        let url = parse_http_url(Self::KIND, raw)?;
        if last_segment(&url).is_none() {
            return Err(ResourceUrlError::MissingIdentifier { kind: Self::KIND });
        }
        Ok(Self(url))
    }

    /// Customer identifier, the final path segment of the URL.
    pub fn customer_id(&self) -> Result<&str, ResourceUrlError> {
        last_segment(&self.0).ok_or(ResourceUrlError::MissingIdentifier { kind: Self::KIND })
    }

    /// Borrow the URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

/// Funding-source URL establishing a bank account with the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FundingSourceUrl(Url);

impl FundingSourceUrl {
    /// Validate a funding-source URL.
    pub fn parse(raw: &str) -> Result<Self, ResourceUrlError> {
        parse_http_url("funding source url", raw).map(Self)
    }

    /// Borrow the URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

macro_rules! url_string_conversions {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.into()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ResourceUrlError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }
    };
}

url_string_conversions!(CustomerUrl);
url_string_conversions!(FundingSourceUrl);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api-sandbox.dwolla.com/customers/abc-123", "abc-123")]
    #[case("https://api-sandbox.dwolla.com/customers/abc-123/", "abc-123")]
    fn customer_id_is_last_path_segment(#[case] raw: &str, #[case] expected: &str) {
        let url = CustomerUrl::parse(raw).expect("valid url");
        assert_eq!(url.customer_id().expect("segment"), expected);
    }

    #[rstest]
    fn customer_url_without_path_is_rejected() {
        let err = CustomerUrl::parse("https://api-sandbox.dwolla.com").expect_err("no segment");
        assert_eq!(err, ResourceUrlError::MissingIdentifier { kind: "customer url" });
    }

    #[rstest]
    #[case("not a url")]
    #[case("/funding-sources/1")]
    fn relative_or_garbage_urls_are_rejected(#[case] raw: &str) {
        assert!(matches!(
            FundingSourceUrl::parse(raw),
            Err(ResourceUrlError::Unparseable { .. })
        ));
    }

    #[rstest]
    fn non_http_schemes_are_rejected() {
        let err = FundingSourceUrl::parse("ftp://example.com/fs/1").expect_err("ftp");
        assert!(matches!(err, ResourceUrlError::UnsupportedScheme { scheme, .. } if scheme == "ftp"));
    }
}
