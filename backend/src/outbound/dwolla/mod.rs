//! Dwolla adapter for customers and funding sources.

mod client;
mod dto;

pub use client::{DwollaClient, DwollaClientError, DwollaConfig};
