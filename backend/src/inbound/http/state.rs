//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BankAccountQuery, BankLinking, UserAccounts};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
    pub bank_linking: Arc<dyn BankLinking>,
    pub bank_accounts: Arc<dyn BankAccountQuery>,
}

impl HttpState {
    /// Construct state from the three driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use bankdash::domain::ports::{BankAccountQuery, BankLinking, UserAccounts};
    /// use bankdash::inbound::http::state::HttpState;
    ///
    /// fn build(
    ///     accounts: Arc<dyn UserAccounts>,
    ///     bank_linking: Arc<dyn BankLinking>,
    ///     bank_accounts: Arc<dyn BankAccountQuery>,
    /// ) -> HttpState {
    ///     HttpState::new(accounts, bank_linking, bank_accounts)
    /// }
    /// ```
    pub fn new(
        accounts: Arc<dyn UserAccounts>,
        bank_linking: Arc<dyn BankLinking>,
        bank_accounts: Arc<dyn BankAccountQuery>,
    ) -> Self {
        Self {
            accounts,
            bank_linking,
            bank_accounts,
        }
    }
}
