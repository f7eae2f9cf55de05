//! Port surface for invalidating cached listing views.
//!
//! After a bank account is linked, every view that lists the owner's accounts
//! is stale. Implementations keep a per-owner revision counter that inbound
//! adapters turn into validators (`ETag`), so clients refetch after a bump.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording or reading listing revisions.
    pub enum InvalidationError {
        /// The revision store could not be updated or read.
        Unavailable { message: String } => "listing revision store unavailable: {message}",
    }
}

/// Views whose content depends on an owner's linked accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingView {
    /// The owner's bank-account listing.
    BankAccounts,
}

impl ListingView {
    /// Views refreshed after a successful onboarding run.
    pub const AFTER_ONBOARDING: &'static [Self] = &[Self::BankAccounts];

    /// Stable label used in logs and validators.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankAccounts => "bank_accounts",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingInvalidator: Send + Sync {
    /// Mark `views` of `owner` as stale.
    async fn invalidate(
        &self,
        owner: &UserId,
        views: &[ListingView],
    ) -> Result<(), InvalidationError>;

    /// Current revision of one view. Starts at zero.
    async fn revision(&self, owner: &UserId, view: ListingView) -> Result<u64, InvalidationError>;
}

/// No-op implementation for when listing caches are not in use.
///
/// Invalidation is accepted and discarded; every revision reads as zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpListingInvalidator;

#[async_trait]
impl ListingInvalidator for NoOpListingInvalidator {
    async fn invalidate(
        &self,
        _owner: &UserId,
        _views: &[ListingView],
    ) -> Result<(), InvalidationError> {
        Ok(())
    }

    async fn revision(&self, _owner: &UserId, _view: ListingView) -> Result<u64, InvalidationError> {
        Ok(0)
    }
}
