//! Port abstraction for the ACH payment-processor bridge.
//!
//! Bridging needs two providers: the bank-link provider mints a processor
//! token for one account, and the payment processor turns that token into a
//! funding source under a customer. Adapters may split the work between two
//! HTTP clients, but the domain sees a single bridge.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    AccessToken, CustomerUrl, DisplayName, Email, ExternalAccountId, FundingSourceUrl,
    PostalAddress, ProcessorToken, Ssn,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment-processor bridge adapters.
    pub enum ProcessorError {
        /// The provider refused the request, e.g. an unsupported account type.
        Rejected { message: String } => "payment processor rejected the request: {message}",
        /// The bridge's own credentials were not accepted.
        Unauthorized { message: String } => "payment processor refused credentials: {message}",
        /// The provider could not be reached.
        Transport { message: String } => "payment processor transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } => "payment processor timed out: {message}",
        /// The provider answered with an unexpected payload.
        Decode { message: String } => "failed to decode payment processor response: {message}",
    }
}

/// Profile of a new `personal` processor customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// Legal name.
    pub name: DisplayName,
    /// Contact email.
    pub email: Email,
    /// Residential address.
    pub address: PostalAddress,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Last four digits or full SSN, as accepted by the processor.
    pub ssn: Ssn,
}

/// Request to attach a bank account to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingSourceRequest {
    /// Processor customer identifier.
    pub customer_id: String,
    /// Token binding the external account to the processor.
    pub processor_token: ProcessorToken,
    /// Bank account display name.
    pub bank_name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProcessorBridge: Send + Sync {
    /// Register a customer. `None` when the processor answers without a
    /// resource location.
    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Option<CustomerUrl>, ProcessorError>;

    /// Mint a processor token for one external account.
    async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &ExternalAccountId,
    ) -> Result<ProcessorToken, ProcessorError>;

    /// Create a funding source. `None` when the processor answers without a
    /// resource location.
    async fn create_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<Option<FundingSourceUrl>, ProcessorError>;
}
