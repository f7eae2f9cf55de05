//! Plaid adapter for the bank-link broker port.

mod client;
mod dto;

pub use client::{PlaidClient, PlaidClientError, PlaidConfig};
