//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`IdentityGateway`, `DocumentStore`, `BankLinkBroker`,
//! `PaymentProcessorBridge`, `ListingInvalidator`) are implemented by
//! outbound adapters. Driving ports (`UserAccounts`, `BankLinking`,
//! `BankAccountQuery`) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod bank_account_query;
mod bank_link_broker;
mod bank_linking;
mod document_store;
mod identity_gateway;
mod listing_invalidation;
mod payment_processor;
mod user_accounts;

#[cfg(test)]
pub use bank_account_query::MockBankAccountQuery;
pub use bank_account_query::BankAccountQuery;
#[cfg(test)]
pub use bank_link_broker::MockBankLinkBroker;
pub use bank_link_broker::{
    BankLinkBroker, BankLinkError, ExternalAccount, LINK_COUNTRY_CODES, LINK_LANGUAGE,
    LINK_PRODUCTS, LinkTokenRequest, TokenExchange,
};
#[cfg(test)]
pub use bank_linking::MockBankLinking;
pub use bank_linking::BankLinking;
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    CollectionId, Collections, DOCUMENT_ID_ATTRIBUTE, Document, DocumentFields, DocumentStore,
    EqualityFilter, PersistenceError, encode_fields,
};
#[cfg(test)]
pub use identity_gateway::MockIdentityGateway;
pub use identity_gateway::{AuthError, IdentityAccount, IdentityGateway, NewIdentityAccount};
#[cfg(test)]
pub use listing_invalidation::MockListingInvalidator;
pub use listing_invalidation::{
    InvalidationError, ListingInvalidator, ListingView, NoOpListingInvalidator,
};
#[cfg(test)]
pub use payment_processor::MockPaymentProcessorBridge;
pub use payment_processor::{
    FundingSourceRequest, NewCustomer, PaymentProcessorBridge, ProcessorError,
};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{SignedIn, UserAccounts};
