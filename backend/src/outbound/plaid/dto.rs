//! Plaid request and response DTOs.
//!
//! Every Plaid call is a JSON POST carrying the client credentials in the
//! body.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{ExternalAccount, TokenExchange};
use crate::domain::{AccessToken, ExternalAccountId, ItemId, LinkToken, ProcessorToken};

/// Processor name Plaid expects when minting tokens for Dwolla.
pub(super) const DWOLLA_PROCESSOR: &str = "dwolla";

#[derive(Debug, Serialize)]
pub(super) struct Authenticated<'a, T: Serialize> {
    pub(super) client_id: &'a str,
    pub(super) secret: &'a str,
    #[serde(flatten)]
    pub(super) body: T,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkTokenBody<'a> {
    pub(super) user: LinkUser<'a>,
    pub(super) client_name: &'a str,
    pub(super) products: &'a [&'a str],
    pub(super) language: &'a str,
    pub(super) country_codes: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub(super) struct LinkUser<'a> {
    pub(super) client_user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct PublicTokenBody<'a> {
    pub(super) public_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct AccessTokenBody<'a> {
    pub(super) access_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ProcessorTokenBody<'a> {
    pub(super) access_token: &'a str,
    pub(super) account_id: &'a str,
    pub(super) processor: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LinkTokenDto {
    link_token: String,
}

impl LinkTokenDto {
    pub(super) fn into_domain(self) -> Result<LinkToken, String> {
        if self.link_token.is_empty() {
            return Err("link_token is empty".to_owned());
        }
        Ok(LinkToken::new(self.link_token))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ExchangeDto {
    access_token: String,
    item_id: String,
}

impl ExchangeDto {
    pub(super) fn into_domain(self) -> Result<TokenExchange, String> {
        Ok(TokenExchange {
            access_token: AccessToken::new(self.access_token).map_err(|err| err.to_string())?,
            item_id: ItemId::new(self.item_id).map_err(|err| err.to_string())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountsDto {
    #[serde(default)]
    accounts: Vec<AccountDto>,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    account_id: String,
    name: String,
    mask: Option<String>,
    subtype: Option<String>,
}

impl AccountsDto {
    pub(super) fn into_domain(self) -> Result<Vec<ExternalAccount>, String> {
        self.accounts
            .into_iter()
            .map(|account| {
                Ok(ExternalAccount {
                    id: ExternalAccountId::new(account.account_id)
                        .map_err(|err| err.to_string())?,
                    name: account.name,
                    mask: account.mask,
                    subtype: account.subtype,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessorTokenDto {
    processor_token: String,
}

impl ProcessorTokenDto {
    pub(super) fn into_domain(self) -> Result<ProcessorToken, String> {
        ProcessorToken::new(self.processor_token).map_err(|err| err.to_string())
    }
}

/// Plaid's error envelope.
#[derive(Debug, Deserialize)]
pub(super) struct PlaidErrorDto {
    pub(super) error_type: String,
    pub(super) error_code: String,
    #[serde(default)]
    pub(super) error_message: String,
}
