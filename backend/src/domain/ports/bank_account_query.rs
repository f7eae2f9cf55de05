//! Driving port for read-only bank-account lookups.

use async_trait::async_trait;

use crate::domain::{DocumentId, Error, LinkedBankAccount, UserId};

/// Domain use-case port for querying linked bank accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankAccountQuery: Send + Sync {
    /// Accounts owned by `owner`, in store order.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<LinkedBankAccount>, Error>;

    /// One account by document identifier; `NotFound` when absent.
    async fn get_by_id(&self, id: &DocumentId) -> Result<LinkedBankAccount, Error>;

    /// Revision of the owner's listing, bumped whenever an account is linked.
    async fn listing_revision(&self, owner: &UserId) -> Result<u64, Error>;
}
