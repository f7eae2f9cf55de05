//! Reqwest-backed Plaid bank-link broker.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{
    AccessTokenBody, AccountsDto, Authenticated, DWOLLA_PROCESSOR, ExchangeDto, LinkTokenBody,
    LinkTokenDto, LinkUser, PlaidErrorDto, ProcessorTokenBody, ProcessorTokenDto,
    PublicTokenBody,
};
use crate::domain::ports::{
    BankLinkBroker, BankLinkError, ExternalAccount, LINK_COUNTRY_CODES, LINK_LANGUAGE,
    LINK_PRODUCTS, LinkTokenRequest, TokenExchange,
};
use crate::domain::{AccessToken, ExternalAccountId, LinkToken, ProcessorToken, PublicToken};
use crate::outbound::http_support::{ApiBase, FailureKind, HttpFailure, InvalidBaseUrl, execute};

const RATE_LIMIT_ERROR_TYPE: &str = "RATE_LIMIT_EXCEEDED";

/// Credentials and endpoint for one Plaid environment.
pub struct PlaidConfig {
    /// Environment base URL, e.g. `https://sandbox.plaid.com`.
    pub base_url: Url,
    /// Plaid client identifier.
    pub client_id: String,
    /// Plaid secret for the environment.
    pub secret: Zeroizing<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Failure to construct a [`PlaidClient`].
#[derive(Debug, thiserror::Error)]
pub enum PlaidClientError {
    /// The configured base URL cannot carry a path.
    #[error(transparent)]
    InvalidBaseUrl(#[from] InvalidBaseUrl),
    /// The reqwest client could not be built.
    #[error("failed to build Plaid HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Plaid adapter for link tokens, token exchange, accounts and processor tokens.
pub struct PlaidClient {
    http: Client,
    base: ApiBase,
    client_id: String,
    secret: Zeroizing<String>,
}

impl PlaidClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is unusable or the reqwest client
    /// cannot be constructed.
    pub fn new(config: PlaidConfig) -> Result<Self, PlaidClientError> {
        let base = ApiBase::new(config.base_url)?;
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base,
            client_id: config.client_id,
            secret: config.secret,
        })
    }

    /// Mint a processor token that lets Dwolla pull from one account.
    ///
    /// # Errors
    ///
    /// Returns [`BankLinkError`] when Plaid refuses or cannot be reached.
    pub async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &ExternalAccountId,
    ) -> Result<ProcessorToken, BankLinkError> {
        let dto: ProcessorTokenDto = self
            .post(
                &["processor", "token", "create"],
                ProcessorTokenBody {
                    access_token: access_token.expose(),
                    account_id: account_id.as_str(),
                    processor: DWOLLA_PROCESSOR,
                },
            )
            .await?;
        dto.into_domain().map_err(BankLinkError::decode)
    }

    async fn post<B, T>(&self, segments: &[&str], body: B) -> Result<T, BankLinkError>
    where
        B: Serialize + Send,
        T: DeserializeOwned,
    {
        debug!(endpoint = %segments.join("/"), "calling Plaid");
        let request = self
            .http
            .post(self.base.join(segments))
            .json(&Authenticated {
                client_id: self.client_id.as_str(),
                secret: self.secret.as_str(),
                body,
            });
        let response = execute(request).await.map_err(map_failure)?;
        serde_json::from_slice(&response.body).map_err(|error| {
            BankLinkError::decode(format!("invalid Plaid JSON payload: {error}"))
        })
    }
}

#[async_trait]
impl BankLinkBroker for PlaidClient {
    async fn create_link_token(
        &self,
        request: &LinkTokenRequest,
    ) -> Result<LinkToken, BankLinkError> {
        let dto: LinkTokenDto = self
            .post(
                &["link", "token", "create"],
                LinkTokenBody {
                    user: LinkUser {
                        client_user_id: request.client_user_id.as_str(),
                    },
                    client_name: request.client_name.as_str(),
                    products: LINK_PRODUCTS,
                    language: LINK_LANGUAGE,
                    country_codes: LINK_COUNTRY_CODES,
                },
            )
            .await?;
        dto.into_domain().map_err(BankLinkError::decode)
    }

    async fn exchange_public_token(
        &self,
        public_token: &PublicToken,
    ) -> Result<TokenExchange, BankLinkError> {
        let dto: ExchangeDto = self
            .post(
                &["item", "public_token", "exchange"],
                PublicTokenBody {
                    public_token: public_token.expose(),
                },
            )
            .await?;
        dto.into_domain().map_err(BankLinkError::decode)
    }

    async fn list_accounts(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<ExternalAccount>, BankLinkError> {
        let dto: AccountsDto = self
            .post(
                &["accounts", "get"],
                AccessTokenBody {
                    access_token: access_token.expose(),
                },
            )
            .await?;
        dto.into_domain().map_err(BankLinkError::decode)
    }
}

fn map_failure(failure: HttpFailure) -> BankLinkError {
    let envelope = serde_json::from_slice::<PlaidErrorDto>(&failure.body).ok();
    if envelope
        .as_ref()
        .is_some_and(|error| error.error_type == RATE_LIMIT_ERROR_TYPE)
    {
        return BankLinkError::rate_limited(failure.message);
    }
    let message = envelope.map_or(failure.message, |error| {
        format!(
            "{} {}: {}",
            error.error_type, error.error_code, error.error_message
        )
    });
    match failure.kind {
        FailureKind::RateLimited => BankLinkError::rate_limited(message),
        FailureKind::Timeout => BankLinkError::timeout(message),
        FailureKind::Transport => BankLinkError::transport(message),
        FailureKind::Unauthorized | FailureKind::Conflict | FailureKind::Rejected => {
            BankLinkError::rejected(message)
        }
    }
}
