//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries the identity-backend session: the user id and the
//! session secret. The cookie store encrypts its payload, so the secret is
//! never readable client-side.

use actix_session::Session as CookieSession;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Session, SessionSecret, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const SESSION_SECRET_KEY: &str = "session_secret";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(CookieSession);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: CookieSession) -> Self {
        Self(session)
    }

    /// Persist the identity-backend session in the cookie.
    pub fn persist(&self, session: &Session) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, session.user_id().as_str())
            .and_then(|()| {
                self.0
                    .insert(SESSION_SECRET_KEY, session.secret().expose())
            })
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the identity-backend session from the cookie, if present.
    pub fn session(&self) -> Result<Option<Session>, Error> {
        let read = |key: &str| {
            self.0
                .get::<String>(key)
                .map_err(|error| Error::internal(format!("failed to read session: {error}")))
        };
        let (Some(raw_id), Some(raw_secret)) = (read(USER_ID_KEY)?, read(SESSION_SECRET_KEY)?)
        else {
            return Ok(None);
        };
        match (UserId::new(raw_id), SessionSecret::new(raw_secret)) {
            (Ok(user_id), Ok(secret)) => Ok(Some(Session::new(user_id, secret))),
            (Err(error), _) => {
                warn!("invalid user id in session cookie: {error}");
                Ok(None)
            }
            (_, Err(error)) => {
                warn!("invalid session secret in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Require a session or return `401 Unauthorized`.
    pub fn require_session(&self) -> Result<Session, Error> {
        self.session()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = CookieSession::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
