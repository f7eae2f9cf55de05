//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod bank_links;
pub mod banks;
pub mod cache_control;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
