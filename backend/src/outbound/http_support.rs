//! Transport helpers shared by the reqwest-backed provider adapters.
//!
//! Adapters classify failures with [`HttpFailure`] and then translate the
//! classification into their own port error, so status-code policy lives in
//! one place.

use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{RequestBuilder, StatusCode, Url};

/// Coarse failure category of an outbound HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// 401 or 403.
    Unauthorized,
    /// 409.
    Conflict,
    /// 429.
    RateLimited,
    /// 408, 504 or a client-side timeout.
    Timeout,
    /// Any other 4xx.
    Rejected,
    /// Connection errors and 5xx.
    Transport,
}

/// Classified outbound failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpFailure {
    pub(crate) kind: FailureKind,
    pub(crate) message: String,
    /// Raw error body, empty for transport failures.
    pub(crate) body: Vec<u8>,
}

impl HttpFailure {
    /// Classify a non-success status, previewing the body in the message.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let preview = body_preview(body);
        let message = if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            format!("status {}: {}", status.as_u16(), preview)
        };
        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Unauthorized,
            StatusCode::CONFLICT => FailureKind::Conflict,
            StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::Timeout,
            _ if status.is_client_error() => FailureKind::Rejected,
            _ => FailureKind::Transport,
        };
        Self {
            kind,
            message,
            body: body.to_vec(),
        }
    }

    /// Classify a reqwest error raised before a response was read.
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Transport
        };
        Self {
            kind,
            message: error.to_string(),
            body: Vec::new(),
        }
    }
}

/// Successful response with its body fully read.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

/// Send `request` and read the body, failing on non-success statuses.
pub(crate) async fn execute(request: RequestBuilder) -> Result<RawResponse, HttpFailure> {
    let response = request
        .send()
        .await
        .map_err(|error| HttpFailure::from_transport(&error))?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|error| HttpFailure::from_transport(&error))?;
    if !status.is_success() {
        return Err(HttpFailure::from_status(status, body.as_ref()));
    }
    Ok(RawResponse {
        headers,
        body: body.to_vec(),
    })
}

/// Base URL of a provider API that path segments can be appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiBase(Url);

/// Raised when a configured endpoint cannot carry a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} cannot be used as an API base URL")]
pub struct InvalidBaseUrl(pub String);

impl ApiBase {
    /// Accept `url` when it is an absolute http(s) URL that can carry a path.
    pub(crate) fn new(url: Url) -> Result<Self, InvalidBaseUrl> {
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidBaseUrl(url.to_string()));
        }
        Ok(Self(url))
    }

    /// Append percent-encoded path segments to the base path.
    pub(crate) fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Value of the `Location` header, if present and valid UTF-8.
pub(crate) fn location(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Whitespace-collapsed, length-limited body text for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network transport helpers.

    use super::*;
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, FailureKind::Unauthorized)]
    #[case::forbidden(StatusCode::FORBIDDEN, FailureKind::Unauthorized)]
    #[case::conflict(StatusCode::CONFLICT, FailureKind::Conflict)]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, FailureKind::RateLimited)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, FailureKind::Timeout)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, FailureKind::Timeout)]
    #[case::bad_request(StatusCode::BAD_REQUEST, FailureKind::Rejected)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, FailureKind::Transport)]
    fn classifies_statuses(#[case] status: StatusCode, #[case] expected: FailureKind) {
        let failure = HttpFailure::from_status(status, b"{\"message\": \"nope\"}");
        assert_eq!(failure.kind, expected);
        assert!(failure.message.contains("nope"));
    }

    #[test]
    fn previews_are_compacted_and_truncated() {
        let body = format!("a  b\n{}", "x".repeat(400));
        let preview = body_preview(body.as_bytes());
        assert!(preview.starts_with("a b x"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[test]
    fn join_appends_encoded_segments_to_base_path() {
        let base = ApiBase::new(Url::parse("https://cloud.example.com/v1").expect("url"))
            .expect("base");
        let url = base.join(&["databases", "db 1", "documents"]);
        assert_eq!(url.as_str(), "https://cloud.example.com/v1/databases/db%201/documents");

        let trailing = ApiBase::new(Url::parse("https://cloud.example.com/v1/").expect("url"))
            .expect("base");
        assert_eq!(
            trailing.join(&["account"]).as_str(),
            "https://cloud.example.com/v1/account"
        );
    }

    #[test]
    fn rejects_non_http_bases() {
        assert!(ApiBase::new(Url::parse("mailto:ops@example.com").expect("url")).is_err());
    }

    #[test]
    fn reads_location_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(location(&headers), None);
        headers.insert(
            LOCATION,
            HeaderValue::from_static("https://api.example.com/customers/1"),
        );
        assert_eq!(location(&headers), Some("https://api.example.com/customers/1"));
    }
}
