//! Application settings loaded via OrthoConfig.
//!
//! Values come from `BANKDASH_*` environment variables, CLI flags or a
//! config file. Every provider credential is required; [`AppSettings::validate`]
//! reports all missing or blank values at once so start-up fails fast.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{CollectionId, Collections};
use crate::outbound::appwrite::AppwriteConfig;
use crate::outbound::dwolla::DwollaConfig;
use crate::outbound::plaid::PlaidConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Raw settings as read from the environment, CLI or config file.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BANKDASH")]
pub struct AppSettings {
    /// Identity and document backend base URL, e.g. `https://cloud.appwrite.io/v1`.
    pub appwrite_endpoint: Option<String>,
    pub appwrite_project: Option<String>,
    /// Admin API key for the identity backend.
    pub appwrite_key: Option<String>,
    pub appwrite_database_id: Option<String>,
    pub appwrite_user_collection_id: Option<String>,
    pub appwrite_bank_collection_id: Option<String>,
    pub plaid_client_id: Option<String>,
    pub plaid_secret: Option<String>,
    /// Bank-link provider base URL, e.g. `https://sandbox.plaid.com`.
    pub plaid_base_url: Option<String>,
    pub dwolla_key: Option<String>,
    pub dwolla_secret: Option<String>,
    /// Payment-processor base URL, e.g. `https://api-sandbox.dwolla.com`.
    pub dwolla_base_url: Option<String>,
    /// Listener address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// Outbound request timeout in seconds; defaults to 30.
    pub http_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("appwrite_endpoint", &self.appwrite_endpoint)
            .field("appwrite_project", &self.appwrite_project)
            .field("appwrite_key", &redacted(&self.appwrite_key))
            .field("appwrite_database_id", &self.appwrite_database_id)
            .field("appwrite_user_collection_id", &self.appwrite_user_collection_id)
            .field("appwrite_bank_collection_id", &self.appwrite_bank_collection_id)
            .field("plaid_client_id", &self.plaid_client_id)
            .field("plaid_secret", &redacted(&self.plaid_secret))
            .field("plaid_base_url", &self.plaid_base_url)
            .field("dwolla_key", &self.dwolla_key)
            .field("dwolla_secret", &redacted(&self.dwolla_secret))
            .field("dwolla_base_url", &self.dwolla_base_url)
            .field("bind_addr", &self.bind_addr)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Errors raised while validating [`AppSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required settings: {}", names.join(", "))]
    Missing { names: Vec<&'static str> },
    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid identifier for {name}: {message}")]
    InvalidIdentifier { name: &'static str, message: String },
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("http timeout must be at least one second")]
    ZeroTimeout,
}

/// Settings after validation, ready to build the provider clients.
pub struct ValidatedSettings {
    pub appwrite: AppwriteConfig,
    pub collections: Collections,
    pub plaid: PlaidConfig,
    pub dwolla: DwollaConfig,
    pub bind_addr: SocketAddr,
}

struct Required<'a> {
    missing: Vec<&'static str>,
    settings: &'a AppSettings,
}

impl<'a> Required<'a> {
    fn new(settings: &'a AppSettings) -> Self {
        Self {
            missing: Vec::new(),
            settings,
        }
    }

    fn take(&mut self, name: &'static str, pick: fn(&AppSettings) -> &Option<String>) -> String {
        match pick(self.settings).as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value.to_owned(),
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|source| SettingsError::InvalidUrl { name, source })
}

fn collection(name: &'static str, value: String) -> Result<CollectionId, SettingsError> {
    CollectionId::new(value).map_err(|err| SettingsError::InvalidIdentifier {
        name,
        message: err.to_string(),
    })
}

impl AppSettings {
    /// Outbound request timeout.
    pub fn http_timeout(&self) -> Result<Duration, SettingsError> {
        match self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS) {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Listener address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Check that every required value is present and well formed.
    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        let mut required = Required::new(self);
        let appwrite_endpoint =
            required.take("BANKDASH_APPWRITE_ENDPOINT", |s| &s.appwrite_endpoint);
        let project_id = required.take("BANKDASH_APPWRITE_PROJECT", |s| &s.appwrite_project);
        let api_key = required.take("BANKDASH_APPWRITE_KEY", |s| &s.appwrite_key);
        let database_id =
            required.take("BANKDASH_APPWRITE_DATABASE_ID", |s| &s.appwrite_database_id);
        let users = required.take("BANKDASH_APPWRITE_USER_COLLECTION_ID", |s| {
            &s.appwrite_user_collection_id
        });
        let bank_accounts = required.take("BANKDASH_APPWRITE_BANK_COLLECTION_ID", |s| {
            &s.appwrite_bank_collection_id
        });
        let plaid_client_id = required.take("BANKDASH_PLAID_CLIENT_ID", |s| &s.plaid_client_id);
        let plaid_secret = required.take("BANKDASH_PLAID_SECRET", |s| &s.plaid_secret);
        let plaid_base_url = required.take("BANKDASH_PLAID_BASE_URL", |s| &s.plaid_base_url);
        let dwolla_key = required.take("BANKDASH_DWOLLA_KEY", |s| &s.dwolla_key);
        let dwolla_secret = required.take("BANKDASH_DWOLLA_SECRET", |s| &s.dwolla_secret);
        let dwolla_base_url = required.take("BANKDASH_DWOLLA_BASE_URL", |s| &s.dwolla_base_url);
        if !required.missing.is_empty() {
            return Err(SettingsError::Missing {
                names: required.missing,
            });
        }

        let timeout = self.http_timeout()?;
        Ok(ValidatedSettings {
            appwrite: AppwriteConfig {
                endpoint: parse_url("BANKDASH_APPWRITE_ENDPOINT", &appwrite_endpoint)?,
                project_id,
                api_key: Zeroizing::new(api_key),
                database_id,
                timeout,
            },
            collections: Collections {
                users: collection("BANKDASH_APPWRITE_USER_COLLECTION_ID", users)?,
                bank_accounts: collection("BANKDASH_APPWRITE_BANK_COLLECTION_ID", bank_accounts)?,
            },
            plaid: PlaidConfig {
                base_url: parse_url("BANKDASH_PLAID_BASE_URL", &plaid_base_url)?,
                client_id: plaid_client_id,
                secret: Zeroizing::new(plaid_secret),
                timeout,
            },
            dwolla: DwollaConfig {
                base_url: parse_url("BANKDASH_DWOLLA_BASE_URL", &dwolla_base_url)?,
                key: dwolla_key,
                secret: Zeroizing::new(dwolla_secret),
                timeout,
            },
            bind_addr: self.bind_addr()?,
        })
    }
}
