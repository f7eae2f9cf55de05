//! Shared Appwrite REST client.
//!
//! One client serves both the account endpoints and the database endpoints.
//! Admin calls authenticate with the project API key; calls made on behalf of
//! a signed-in user carry the session secret instead.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use zeroize::Zeroizing;

use crate::domain::Session;
use crate::outbound::http_support::{ApiBase, InvalidBaseUrl};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Connection settings for an Appwrite project.
pub struct AppwriteConfig {
    /// API endpoint including the version prefix, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: Url,
    /// Project identifier.
    pub project_id: String,
    /// Server API key with account, session and database scopes.
    pub api_key: Zeroizing<String>,
    /// Database holding the application collections.
    pub database_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Failure to construct an [`AppwriteClient`].
#[derive(Debug, thiserror::Error)]
pub enum AppwriteClientError {
    /// The configured endpoint cannot carry a path.
    #[error(transparent)]
    InvalidEndpoint(#[from] InvalidBaseUrl),
    /// The reqwest client could not be built.
    #[error("failed to build Appwrite HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reqwest-backed Appwrite client implementing the identity and document ports.
pub struct AppwriteClient {
    http: Client,
    base: ApiBase,
    project_id: String,
    api_key: Zeroizing<String>,
    pub(super) database_id: String,
}

impl AppwriteClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is not an http(s) base URL or the
    /// reqwest client cannot be constructed.
    pub fn new(config: AppwriteConfig) -> Result<Self, AppwriteClientError> {
        let base = ApiBase::new(config.endpoint)?;
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base,
            project_id: config.project_id,
            api_key: config.api_key,
            database_id: config.database_id,
        })
    }

    /// Request authenticated with the project API key.
    pub(super) fn admin(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.base.join(segments))
            .header(PROJECT_HEADER, self.project_id.as_str())
            .header(KEY_HEADER, self.api_key.as_str())
    }

    /// Request made on behalf of the session's user.
    pub(super) fn as_user(
        &self,
        method: Method,
        segments: &[&str],
        session: &Session,
    ) -> RequestBuilder {
        self.http
            .request(method, self.base.join(segments))
            .header(PROJECT_HEADER, self.project_id.as_str())
            .header(SESSION_HEADER, session.secret().expose())
    }
}
