//! Bank-account onboarding pipeline.
//!
//! Completing a bank link runs a fixed sequence of remote calls:
//!
//! 1. exchange the public token for an access credential and item id;
//! 2. list the item's accounts and take the first one;
//! 3. mint a processor token for that account;
//! 4. create a funding source under the user's processor customer;
//! 5. require that the processor returned a funding-source URL;
//! 6. persist the linked account with its shareable id;
//! 7. invalidate the owner's listing views.
//!
//! Any failing step aborts the remaining ones. Nothing already created
//! remotely is rolled back, and no record is persisted unless a funding
//! source exists.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::port_errors::{
    map_bank_link_error, map_persistence_error, map_processor_error,
};
use crate::domain::ports::{
    BankLinkBroker, BankLinkError, BankLinking, CollectionId, DocumentStore, FundingSourceRequest,
    LinkTokenRequest, ListingInvalidator, ListingView, PaymentProcessorBridge, PersistenceError,
    ProcessorError,
};
use crate::domain::{
    BankAccountRecord, Error, ExternalAccountId, ItemId, LinkToken, LinkedBankAccount,
    PublicToken, ShareableId, User,
};

/// Failure of one onboarding stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    /// Step 1: the public token could not be exchanged.
    #[error("public token exchange failed: {0}")]
    Exchange(#[source] BankLinkError),
    /// Step 2: the item's accounts could not be listed.
    #[error("account lookup failed: {0}")]
    AccountLookup(#[source] BankLinkError),
    /// Step 2: the item has no accounts.
    #[error("linked item {item_id} has no accounts")]
    NoAccounts {
        /// Item that came back empty.
        item_id: ItemId,
    },
    /// Step 3: the processor token could not be created.
    #[error("processor token creation failed: {0}")]
    ProcessorToken(#[source] ProcessorError),
    /// Step 4: the funding source could not be created.
    #[error("funding source creation failed: {0}")]
    FundingSource(#[source] ProcessorError),
    /// Step 5: the processor answered without a funding-source URL.
    #[error("payment processor returned no funding source for account {account_id}")]
    MissingFundingSource {
        /// Account the funding source was requested for.
        account_id: ExternalAccountId,
    },
    /// Step 6: the linked account could not be stored.
    #[error("failed to persist linked bank account: {0}")]
    Persistence(#[source] PersistenceError),
}

impl OnboardingError {
    /// Stable label of the failing stage.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Exchange(_) => "exchange",
            Self::AccountLookup(_) => "account_lookup",
            Self::NoAccounts { .. } => "no_accounts",
            Self::ProcessorToken(_) => "processor_token",
            Self::FundingSource(_) => "funding_source",
            Self::MissingFundingSource { .. } => "missing_funding_source",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl From<OnboardingError> for Error {
    fn from(error: OnboardingError) -> Self {
        let stage = error.stage();
        let mapped = match error {
            OnboardingError::Exchange(err) | OnboardingError::AccountLookup(err) => {
                map_bank_link_error(err)
            }
            OnboardingError::ProcessorToken(err) | OnboardingError::FundingSource(err) => {
                map_processor_error(err)
            }
            OnboardingError::Persistence(err) => map_persistence_error(err),
            err @ (OnboardingError::NoAccounts { .. }
            | OnboardingError::MissingFundingSource { .. }) => {
                Error::unprocessable(err.to_string())
            }
        };
        mapped.with_details(json!({ "stage": stage }))
    }
}

/// Link-token issuance failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkTokenError {
    /// The bank-link provider refused or failed the request.
    #[error("link token creation failed: {0}")]
    Broker(#[from] BankLinkError),
}

impl From<LinkTokenError> for Error {
    fn from(error: LinkTokenError) -> Self {
        match error {
            LinkTokenError::Broker(err) => map_bank_link_error(err),
        }
    }
}

/// Successful onboarding result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingOutcome {
    /// The newly persisted account.
    pub account: LinkedBankAccount,
}

/// Driven ports used by [`BankOnboardingService`].
#[derive(Clone)]
pub struct OnboardingPorts {
    /// Bank-link provider.
    pub broker: Arc<dyn BankLinkBroker>,
    /// Payment-processor bridge.
    pub processor: Arc<dyn PaymentProcessorBridge>,
    /// Document store holding linked accounts.
    pub store: Arc<dyn DocumentStore>,
    /// Listing views refreshed after a link.
    pub invalidator: Arc<dyn ListingInvalidator>,
    /// Collection holding linked accounts.
    pub bank_accounts: CollectionId,
}

/// Orchestrates link-token issuance and the onboarding pipeline.
#[derive(Clone)]
pub struct BankOnboardingService {
    ports: OnboardingPorts,
}

impl BankOnboardingService {
    /// Create the service over its driven ports.
    pub fn new(ports: OnboardingPorts) -> Self {
        Self { ports }
    }

    /// Request a link token scoped to `user`.
    pub async fn create_link_token(&self, user: &User) -> Result<LinkToken, LinkTokenError> {
        let request = LinkTokenRequest {
            client_user_id: user.id().clone(),
            client_name: user.name().full_name(),
        };
        let token = self.ports.broker.create_link_token(&request).await?;
        info!(user_id = %user.id(), "issued bank link token");
        Ok(token)
    }

    /// Run the onboarding pipeline for `user`.
    pub async fn run(
        &self,
        user: &User,
        public_token: &PublicToken,
    ) -> Result<OnboardingOutcome, OnboardingError> {
        let exchange = self
            .ports
            .broker
            .exchange_public_token(public_token)
            .await
            .map_err(OnboardingError::Exchange)?;
        info!(user_id = %user.id(), item_id = %exchange.item_id, stage = "exchange", "public token exchanged");

        let accounts = self
            .ports
            .broker
            .list_accounts(&exchange.access_token)
            .await
            .map_err(OnboardingError::AccountLookup)?;
        let Some(account) = accounts.into_iter().next() else {
            return Err(OnboardingError::NoAccounts {
                item_id: exchange.item_id,
            });
        };

        let processor_token = self
            .ports
            .processor
            .create_processor_token(&exchange.access_token, &account.id)
            .await
            .map_err(OnboardingError::ProcessorToken)?;

        let funding_source = self
            .ports
            .processor
            .create_funding_source(&FundingSourceRequest {
                customer_id: user.customer().id().to_owned(),
                processor_token,
                bank_name: account.name.clone(),
            })
            .await
            .map_err(OnboardingError::FundingSource)?
            .ok_or_else(|| OnboardingError::MissingFundingSource {
                account_id: account.id.clone(),
            })?;
        info!(user_id = %user.id(), item_id = %exchange.item_id, stage = "funding_source", "funding source created");

        let record = BankAccountRecord {
            owner: user.id().clone(),
            item_id: exchange.item_id,
            shareable_id: ShareableId::encode(&account.id),
            account_id: account.id,
            access_token: exchange.access_token,
            funding_source,
        };
        let account = self.persist(record).await?;
        info!(
            user_id = %user.id(),
            item_id = %account.record().item_id,
            document_id = %account.id(),
            stage = "persistence",
            "linked bank account persisted"
        );

        if let Err(err) = self
            .ports
            .invalidator
            .invalidate(user.id(), ListingView::AFTER_ONBOARDING)
            .await
        {
            warn!(user_id = %user.id(), error = %err, "failed to invalidate bank account listings");
        }

        Ok(OnboardingOutcome { account })
    }

    async fn persist(&self, record: BankAccountRecord) -> Result<LinkedBankAccount, OnboardingError> {
        let fields = record
            .to_document_fields()
            .map_err(OnboardingError::Persistence)?;
        let document = self
            .ports
            .store
            .persist(&self.ports.bank_accounts, fields)
            .await
            .map_err(OnboardingError::Persistence)?;
        Ok(LinkedBankAccount::new(
            document.id().clone(),
            document.created_at(),
            record,
        ))
    }
}

#[async_trait]
impl BankLinking for BankOnboardingService {
    async fn create_link_token(&self, user: &User) -> Result<LinkToken, Error> {
        Self::create_link_token(self, user).await.map_err(Error::from)
    }

    async fn complete_link(
        &self,
        user: &User,
        public_token: &PublicToken,
    ) -> Result<OnboardingOutcome, Error> {
        self.run(user, public_token).await.map_err(|err| {
            warn!(user_id = %user.id(), stage = err.stage(), error = %err, "bank onboarding failed");
            Error::from(err)
        })
    }
}

#[cfg(test)]
mod tests;
