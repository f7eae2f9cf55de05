//! Reqwest-backed Dwolla client.
//!
//! Dwolla authenticates with an OAuth client-credentials token. The token is
//! cached until shortly before it expires and dropped whenever Dwolla answers
//! 401, so the next call fetches a fresh one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::dto::{CustomerBody, DwollaErrorDto, FundingSourceBody, HAL_JSON, TokenDto};
use crate::domain::ports::{FundingSourceRequest, NewCustomer, ProcessorError};
use crate::domain::{CustomerUrl, FundingSourceUrl};
use crate::outbound::http_support::{
    ApiBase, FailureKind, HttpFailure, InvalidBaseUrl, RawResponse, execute, location,
};

const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 60;

/// Credentials and endpoint for one Dwolla environment.
pub struct DwollaConfig {
    /// Environment base URL, e.g. `https://api-sandbox.dwolla.com`.
    pub base_url: Url,
    /// Application key.
    pub key: String,
    /// Application secret.
    pub secret: Zeroizing<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Failure to construct a [`DwollaClient`].
#[derive(Debug, thiserror::Error)]
pub enum DwollaClientError {
    /// The configured base URL cannot carry a path.
    #[error(transparent)]
    InvalidBaseUrl(#[from] InvalidBaseUrl),
    /// The reqwest client could not be built.
    #[error("failed to build Dwolla HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Clone)]
struct CachedToken {
    value: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

/// Dwolla adapter for customers and funding sources.
pub struct DwollaClient {
    http: Client,
    base: ApiBase,
    key: String,
    secret: Zeroizing<String>,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<CachedToken>>,
}

impl DwollaClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is unusable or the reqwest client
    /// cannot be constructed.
    pub fn new(config: DwollaConfig, clock: Arc<dyn Clock>) -> Result<Self, DwollaClientError> {
        let base = ApiBase::new(config.base_url)?;
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base,
            key: config.key,
            secret: config.secret,
            clock,
            token: Mutex::new(None),
        })
    }

    /// Create a personal verified customer and return its URL.
    ///
    /// `Ok(None)` means Dwolla accepted the request without a `Location`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError`] when Dwolla refuses or cannot be reached.
    pub async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Option<CustomerUrl>, ProcessorError> {
        let response = self
            .post_hal(&["customers"], &CustomerBody::from_domain(customer))
            .await?;
        let Some(raw) = location(&response.headers) else {
            return Ok(None);
        };
        let url = CustomerUrl::parse(raw)
            .map_err(|error| ProcessorError::decode(format!("customer location: {error}")))?;
        info!(customer = %url.as_url(), "Dwolla customer created");
        Ok(Some(url))
    }

    /// Attach a Plaid-backed funding source to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError`] when Dwolla refuses or cannot be reached.
    pub async fn create_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<Option<FundingSourceUrl>, ProcessorError> {
        let response = self
            .post_hal(
                &["customers", request.customer_id.as_str(), "funding-sources"],
                &FundingSourceBody {
                    plaid_token: request.processor_token.expose(),
                    name: request.bank_name.as_str(),
                },
            )
            .await?;
        location(&response.headers)
            .map(|raw| {
                FundingSourceUrl::parse(raw).map_err(|error| {
                    ProcessorError::decode(format!("funding source location: {error}"))
                })
            })
            .transpose()
    }

    async fn post_hal<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<RawResponse, ProcessorError> {
        let token = self.access_token().await?;
        let payload = serde_json::to_vec(body)
            .map_err(|error| ProcessorError::rejected(format!("unserialisable body: {error}")))?;
        let request = self
            .http
            .post(self.base.join(segments))
            .bearer_auth(token.as_str())
            .header(ACCEPT, HAL_JSON)
            .header(CONTENT_TYPE, HAL_JSON)
            .body(payload);
        execute(request).await.map_err(|failure| {
            if failure.kind == FailureKind::Unauthorized {
                self.forget_token();
            }
            map_failure(failure)
        })
    }

    async fn access_token(&self) -> Result<Zeroizing<String>, ProcessorError> {
        let now = self.clock.utc();
        if let Some(cached) = self.cached_token().filter(|token| token.expires_at > now) {
            return Ok(cached.value);
        }

        debug!("requesting Dwolla access token");
        let request = self
            .http
            .post(self.base.join(&["token"]))
            .basic_auth(self.key.as_str(), Some(self.secret.as_str()))
            .form(&[("grant_type", "client_credentials")]);
        let response = execute(request).await.map_err(map_failure)?;
        let dto: TokenDto = serde_json::from_slice(&response.body).map_err(|error| {
            ProcessorError::decode(format!("invalid Dwolla token payload: {error}"))
        })?;
        let lifetime = TimeDelta::seconds(
            dto.expires_in
                .saturating_sub(TOKEN_REFRESH_MARGIN_SECONDS)
                .max(0),
        );
        let token = CachedToken {
            value: Zeroizing::new(dto.access_token),
            expires_at: now + lifetime,
        };
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(token.value)
    }

    fn cached_token(&self) -> Option<CachedToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn forget_token(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn map_failure(failure: HttpFailure) -> ProcessorError {
    let message = serde_json::from_slice::<DwollaErrorDto>(&failure.body)
        .map_or(failure.message, |error| error.describe());
    match failure.kind {
        FailureKind::Unauthorized => ProcessorError::unauthorized(message),
        FailureKind::Timeout => ProcessorError::timeout(message),
        FailureKind::RateLimited | FailureKind::Transport => ProcessorError::transport(message),
        FailureKind::Conflict | FailureKind::Rejected => ProcessorError::rejected(message),
    }
}
