//! Identity-backend session handle.

use super::{SessionSecret, UserId};

/// Opaque session secret bound to one user.
///
/// The secret authorizes session-scoped calls against the identity backend.
/// Its lifecycle is bounded by explicit sign-in and logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    secret: SessionSecret,
}

impl Session {
    /// Pair a secret with the user it was issued for.
    pub fn new(user_id: UserId, secret: SessionSecret) -> Self {
        Self { user_id, secret }
    }

    /// User the session belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Session secret.
    pub fn secret(&self) -> &SessionSecret {
        &self.secret
    }
}
