//! Cache policy for per-user responses.
//!
//! Profile and bank-account payloads are private to the signed-in user and
//! must be revalidated on every reuse. Listings carry a weak validator so
//! clients can revalidate with `If-None-Match` and receive `304`.

use actix_web::HttpRequest;
use actix_web::http::header::IF_NONE_MATCH;

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// `Cache-Control` header tuple for private API responses.
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Weak validator for a listing view at `revision` holding `count` entries.
///
/// # Examples
/// ```
/// use bankdash::inbound::http::cache_control::weak_listing_etag;
///
/// assert_eq!(weak_listing_etag("banks", 3, 1), "W/\"banks-3-1\"");
/// ```
#[must_use]
pub fn weak_listing_etag(view: &str, revision: u64, count: usize) -> String {
    format!("W/\"{view}-{revision}-{count}\"")
}

/// Whether any `If-None-Match` candidate matches `etag` (or is `*`).
pub fn if_none_match(request: &HttpRequest, etag: &str) -> bool {
    request
        .headers()
        .get_all(IF_NONE_MATCH)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate == etag)
}
