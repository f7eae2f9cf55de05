//! Appwrite adapters for the identity gateway and document store ports.

mod client;
mod documents;
mod dto;
mod identity;

pub use client::{AppwriteClient, AppwriteClientError, AppwriteConfig};
