//! Payment-processor bridge composed from the Plaid and Dwolla clients.
//!
//! Plaid mints the processor token; Dwolla owns customers and funding
//! sources. Plaid failures surface as processor errors because the domain
//! treats the whole bridge as one collaborator.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    BankLinkError, FundingSourceRequest, NewCustomer, PaymentProcessorBridge, ProcessorError,
};
use crate::domain::{AccessToken, CustomerUrl, ExternalAccountId, FundingSourceUrl, ProcessorToken};
use crate::outbound::dwolla::DwollaClient;
use crate::outbound::plaid::PlaidClient;

/// [`PaymentProcessorBridge`] backed by Plaid processor tokens and Dwolla.
#[derive(Clone)]
pub struct PlaidDwollaBridge {
    plaid: Arc<PlaidClient>,
    dwolla: Arc<DwollaClient>,
}

impl PlaidDwollaBridge {
    /// Compose the bridge from its two clients.
    pub fn new(plaid: Arc<PlaidClient>, dwolla: Arc<DwollaClient>) -> Self {
        Self { plaid, dwolla }
    }
}

#[async_trait]
impl PaymentProcessorBridge for PlaidDwollaBridge {
    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Option<CustomerUrl>, ProcessorError> {
        self.dwolla.create_customer(customer).await
    }

    async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &ExternalAccountId,
    ) -> Result<ProcessorToken, ProcessorError> {
        self.plaid
            .create_processor_token(access_token, account_id)
            .await
            .map_err(processor_error)
    }

    async fn create_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<Option<FundingSourceUrl>, ProcessorError> {
        self.dwolla.create_funding_source(request).await
    }
}

fn processor_error(error: BankLinkError) -> ProcessorError {
    let message = error.to_string();
    match error {
        BankLinkError::Rejected { .. } => ProcessorError::rejected(message),
        BankLinkError::Timeout { .. } => ProcessorError::timeout(message),
        BankLinkError::RateLimited { .. } | BankLinkError::Transport { .. } => {
            ProcessorError::transport(message)
        }
        BankLinkError::Decode { .. } => ProcessorError::decode(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rejected(
        BankLinkError::rejected("INVALID_INPUT"),
        ProcessorError::rejected("bank-link provider rejected the request: INVALID_INPUT")
    )]
    #[case::rate_limited(
        BankLinkError::rate_limited("slow"),
        ProcessorError::transport("bank-link provider rate limited the request: slow")
    )]
    #[case::timeout(
        BankLinkError::timeout("30s"),
        ProcessorError::timeout("bank-link provider timed out: 30s")
    )]
    fn plaid_failures_become_processor_errors(
        #[case] error: BankLinkError,
        #[case] expected: ProcessorError,
    ) {
        assert_eq!(processor_error(error), expected);
    }
}
