//! Port abstraction for the identity backend.
//!
//! Covers email/password sessions and admin-level account creation. A
//! session that the backend no longer recognises is reported as `Ok(None)`
//! from [`IdentityGateway::current_user`]; that is the unauthenticated
//! signal, not a fault.

use async_trait::async_trait;

use crate::domain::{DisplayName, Email, Password, Session, SignInCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity gateway adapters.
    pub enum AuthError {
        /// Email/password pair was not accepted.
        InvalidCredentials => "invalid email or password",
        /// An account with this email already exists.
        AlreadyRegistered => "an account with this email already exists",
        /// The backend refused the request for another reason.
        Rejected { message: String } => "identity backend rejected the request: {message}",
        /// The backend could not be reached.
        Transport { message: String } => "identity backend transport failed: {message}",
        /// The backend did not answer in time.
        Timeout { message: String } => "identity backend timed out: {message}",
        /// The backend answered with an unexpected payload.
        Decode { message: String } => "failed to decode identity backend response: {message}",
    }
}

/// Identity record as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAccount {
    /// Backend user identifier.
    pub id: UserId,
    /// Login email.
    pub email: Email,
    /// Full name stored with the identity.
    pub name: String,
}

/// Request to create a new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentityAccount {
    /// Login email.
    pub email: Email,
    /// Initial password.
    pub password: Password,
    /// Legal name.
    pub name: DisplayName,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Open an email/password session.
    async fn create_session(&self, credentials: &SignInCredentials) -> Result<Session, AuthError>;

    /// Register a new identity with a backend-generated identifier.
    async fn create_account(
        &self,
        account: &NewIdentityAccount,
    ) -> Result<IdentityAccount, AuthError>;

    /// Resolve the identity behind a session, or `None` when the session is
    /// unknown or expired.
    async fn current_user(&self, session: &Session) -> Result<Option<IdentityAccount>, AuthError>;

    /// End the session on the backend.
    async fn delete_session(&self, session: &Session) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_variants_have_snake_case_constructors() {
        assert_eq!(AuthError::invalid_credentials(), AuthError::InvalidCredentials);
        assert_eq!(AuthError::already_registered(), AuthError::AlreadyRegistered);
    }

    #[test]
    fn messages_carry_detail() {
        let err = AuthError::timeout("after 30s");
        assert_eq!(err.to_string(), "identity backend timed out: after 30s");
    }
}
