//! Identity gateway over the Appwrite account endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::client::AppwriteClient;
use super::dto::{AccountDto, CreateAccountBody, CreateSessionBody, SessionDto, UNIQUE_ID};
use crate::domain::ports::{AuthError, IdentityAccount, IdentityGateway, NewIdentityAccount};
use crate::domain::{Session, SignInCredentials};
use crate::outbound::http_support::{FailureKind, HttpFailure, execute};

#[async_trait]
impl IdentityGateway for AppwriteClient {
    async fn create_session(&self, credentials: &SignInCredentials) -> Result<Session, AuthError> {
        let request = self
            .admin(Method::POST, &["account", "sessions", "email"])
            .json(&CreateSessionBody {
                email: credentials.email().as_str(),
                password: credentials.password().expose(),
            });
        let response = execute(request).await.map_err(|failure| match failure.kind {
            FailureKind::Unauthorized => AuthError::invalid_credentials(),
            _ => map_failure(failure),
        })?;
        decode::<SessionDto>(&response.body)?
            .into_domain()
            .map_err(AuthError::decode)
    }

    async fn create_account(
        &self,
        account: &NewIdentityAccount,
    ) -> Result<IdentityAccount, AuthError> {
        let request = self.admin(Method::POST, &["account"]).json(&CreateAccountBody {
            user_id: UNIQUE_ID,
            email: account.email.as_str(),
            password: account.password.expose(),
            name: account.name.full_name(),
        });
        let response = execute(request).await.map_err(map_failure)?;
        decode::<AccountDto>(&response.body)?
            .into_domain()
            .map_err(AuthError::decode)
    }

    async fn current_user(&self, session: &Session) -> Result<Option<IdentityAccount>, AuthError> {
        let request = self.as_user(Method::GET, &["account"], session);
        let response = match execute(request).await {
            Ok(response) => response,
            Err(failure) if failure.kind == FailureKind::Unauthorized => {
                debug!(user_id = %session.user_id(), "session no longer recognised");
                return Ok(None);
            }
            Err(failure) => return Err(map_failure(failure)),
        };
        decode::<AccountDto>(&response.body)?
            .into_domain()
            .map(Some)
            .map_err(AuthError::decode)
    }

    async fn delete_session(&self, session: &Session) -> Result<(), AuthError> {
        let request = self.as_user(Method::DELETE, &["account", "sessions", "current"], session);
        match execute(request).await {
            Ok(_) => Ok(()),
            Err(failure) if failure.kind == FailureKind::Unauthorized => {
                debug!(user_id = %session.user_id(), "session already gone");
                Ok(())
            }
            Err(failure) => Err(map_failure(failure)),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AuthError> {
    serde_json::from_slice(body)
        .map_err(|error| AuthError::decode(format!("invalid Appwrite JSON payload: {error}")))
}

fn map_failure(failure: HttpFailure) -> AuthError {
    match failure.kind {
        FailureKind::Conflict => AuthError::already_registered(),
        FailureKind::Timeout => AuthError::timeout(failure.message),
        FailureKind::RateLimited | FailureKind::Transport => AuthError::transport(failure.message),
        FailureKind::Unauthorized | FailureKind::Rejected => AuthError::rejected(failure.message),
    }
}
