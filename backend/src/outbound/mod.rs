//! Outbound adapters implementing domain ports for external providers.
//!
//! - **appwrite**: identity gateway and document store over the Appwrite REST API
//! - **plaid**: bank-link broker and processor tokens
//! - **dwolla**: payment-processor customers and funding sources
//! - **processor_bridge**: composes Plaid and Dwolla into one bridge
//! - **cache**: in-process listing revision counters
//!
//! Adapters are thin translators between domain types and provider wire
//! formats. They contain no business logic.

pub mod appwrite;
pub mod cache;
pub mod dwolla;
pub(crate) mod http_support;
pub mod plaid;
pub mod processor_bridge;

pub use http_support::InvalidBaseUrl;
