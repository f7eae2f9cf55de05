//! Driving port for sign-up, sign-in and session lookups.
//!
//! Inbound adapters call this port to manage user accounts without knowing
//! which identity backend or payment processor sits behind it.

use async_trait::async_trait;

use crate::domain::{Error, Session, SignInCredentials, SignUpDetails, User};

/// A user together with a freshly opened session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// Stored profile.
    pub user: User,
    /// Session to hand back to the client.
    pub session: Session,
}

/// Domain use-case port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Register an identity and processor customer, then open a session.
    async fn sign_up(&self, details: &SignUpDetails) -> Result<SignedIn, Error>;

    /// Open a session for existing credentials.
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<SignedIn, Error>;

    /// Resolve the profile behind a session, or `None` when unauthenticated.
    async fn current_user(&self, session: &Session) -> Result<Option<User>, Error>;

    /// End a session.
    async fn logout(&self, session: &Session) -> Result<(), Error>;
}
