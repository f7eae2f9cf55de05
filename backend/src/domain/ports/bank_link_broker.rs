//! Port abstraction for the bank-linking provider.
//!
//! The broker issues link tokens for the client-side linking flow, exchanges
//! the resulting public token for a durable access credential, and lists the
//! accounts behind that credential.

use async_trait::async_trait;

use crate::domain::{AccessToken, ExternalAccountId, ItemId, LinkToken, PublicToken, UserId};

use super::define_port_error;

/// Products requested for every link token.
pub const LINK_PRODUCTS: &[&str] = &["auth"];
/// Language of the linking UI.
pub const LINK_LANGUAGE: &str = "en";
/// Countries whose institutions may be linked.
pub const LINK_COUNTRY_CODES: &[&str] = &["US"];

define_port_error! {
    /// Errors raised by bank-link broker adapters.
    pub enum BankLinkError {
        /// The provider refused the request (bad token, unsupported product).
        Rejected { message: String } => "bank-link provider rejected the request: {message}",
        /// The provider throttled the caller.
        RateLimited { message: String } => "bank-link provider rate limited the request: {message}",
        /// The provider could not be reached.
        Transport { message: String } => "bank-link provider transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } => "bank-link provider timed out: {message}",
        /// The provider answered with an unexpected payload.
        Decode { message: String } => "failed to decode bank-link provider response: {message}",
    }
}

/// Parameters of a link-token request.
///
/// Product scope, language and country codes are fixed by
/// [`LINK_PRODUCTS`], [`LINK_LANGUAGE`] and [`LINK_COUNTRY_CODES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTokenRequest {
    /// Identity of the user the token is scoped to.
    pub client_user_id: UserId,
    /// Display name shown in the linking UI.
    pub client_name: String,
}

/// Durable credentials obtained from a public-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchange {
    /// Access credential for the linked item.
    pub access_token: AccessToken,
    /// Provider identifier of the linked item.
    pub item_id: ItemId,
}

/// One account behind a linked item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAccount {
    /// Provider account identifier.
    pub id: ExternalAccountId,
    /// Display name, e.g. "Plaid Checking".
    pub name: String,
    /// Last digits of the account number.
    pub mask: Option<String>,
    /// Account subtype, e.g. "checking".
    pub subtype: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankLinkBroker: Send + Sync {
    /// Request a short-lived link token for the client-side flow.
    async fn create_link_token(&self, request: &LinkTokenRequest)
    -> Result<LinkToken, BankLinkError>;

    /// Exchange a single-use public token for durable credentials.
    async fn exchange_public_token(
        &self,
        public_token: &PublicToken,
    ) -> Result<TokenExchange, BankLinkError>;

    /// List the accounts behind an access credential, in provider order.
    async fn list_accounts(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<ExternalAccount>, BankLinkError>;
}
