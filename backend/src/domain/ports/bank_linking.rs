//! Driving port for the bank-linking flow.

use async_trait::async_trait;

use crate::domain::{Error, LinkToken, OnboardingOutcome, PublicToken, User};

/// Domain use-case port for linking external bank accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankLinking: Send + Sync {
    /// Issue a link token scoped to `user`.
    async fn create_link_token(&self, user: &User) -> Result<LinkToken, Error>;

    /// Run the onboarding pipeline for a completed link.
    async fn complete_link(
        &self,
        user: &User,
        public_token: &PublicToken,
    ) -> Result<OnboardingOutcome, Error>;
}
