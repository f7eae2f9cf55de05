//! User account service: sign-up, sign-in, session lookup and logout.
//!
//! Sign-up spans three systems. The identity is created first, then the
//! payment-processor customer, then the profile document, and finally a
//! session is opened. A failure part way leaves the earlier resources in
//! place; nothing is rolled back.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::port_errors::{map_auth_error, map_persistence_error, map_processor_error};
use crate::domain::ports::{
    AuthError, CollectionId, DocumentStore, EqualityFilter, IdentityGateway, NewCustomer,
    NewIdentityAccount, PaymentProcessorBridge, PersistenceError, ProcessorError, SignedIn,
    UserAccounts,
};
use crate::domain::{
    CustomerRef, Error, ResourceUrlError, Session, SignInCredentials, SignUpDetails, USER_ID_FIELD,
    User, UserId, UserProfile,
};

/// Failure of a user-account operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// The identity backend refused or failed the request.
    #[error(transparent)]
    Identity(#[from] AuthError),
    /// The processor customer could not be created.
    #[error("processor customer creation failed: {0}")]
    Customer(#[source] ProcessorError),
    /// The processor answered without a customer URL.
    #[error("payment processor returned no customer for {email}")]
    MissingCustomer {
        /// Email the customer was requested for.
        email: String,
    },
    /// The customer URL had no identifier segment.
    #[error("payment processor returned an unusable customer url: {0}")]
    InvalidCustomerUrl(#[source] ResourceUrlError),
    /// The profile document could not be written or read.
    #[error("user profile storage failed: {0}")]
    Persistence(#[from] PersistenceError),
    /// The identity exists but no profile document does.
    #[error("no profile stored for user {user_id}")]
    ProfileMissing {
        /// Identity without a profile.
        user_id: UserId,
    },
}

impl From<AccountError> for Error {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::Identity(err) => map_auth_error(err),
            AccountError::Customer(err) => map_processor_error(err),
            err @ AccountError::MissingCustomer { .. } => Error::unprocessable(err.to_string()),
            err @ AccountError::InvalidCustomerUrl(_) => Error::internal(err.to_string()),
            AccountError::Persistence(err) => map_persistence_error(err),
            err @ AccountError::ProfileMissing { .. } => Error::not_found(err.to_string()),
        }
    }
}

/// Account service over the identity backend, processor and profile store.
#[derive(Clone)]
pub struct UserAccountService {
    identity: Arc<dyn IdentityGateway>,
    processor: Arc<dyn PaymentProcessorBridge>,
    store: Arc<dyn DocumentStore>,
    users: CollectionId,
}

impl UserAccountService {
    /// Create the service. Profiles live in the `users` collection.
    pub fn new(
        identity: Arc<dyn IdentityGateway>,
        processor: Arc<dyn PaymentProcessorBridge>,
        store: Arc<dyn DocumentStore>,
        users: CollectionId,
    ) -> Self {
        Self {
            identity,
            processor,
            store,
            users,
        }
    }

    /// Register the identity, processor customer and profile, then sign in.
    pub async fn sign_up(&self, details: &SignUpDetails) -> Result<SignedIn, AccountError> {
        let credentials = details.credentials();
        let identity = self
            .identity
            .create_account(&NewIdentityAccount {
                email: credentials.email().clone(),
                password: credentials.password().clone(),
                name: details.name().clone(),
            })
            .await?;
        info!(user_id = %identity.id, "identity account created");

        let customer_url = self
            .processor
            .create_customer(&NewCustomer {
                name: details.name().clone(),
                email: credentials.email().clone(),
                address: details.address().clone(),
                date_of_birth: details.date_of_birth(),
                ssn: details.ssn().clone(),
            })
            .await
            .map_err(AccountError::Customer)?
            .ok_or_else(|| AccountError::MissingCustomer {
                email: credentials.email().to_string(),
            })?;
        let customer = CustomerRef::from_url(customer_url).map_err(AccountError::InvalidCustomerUrl)?;
        info!(user_id = %identity.id, customer_id = customer.id(), "processor customer created");

        let user = User::new(UserProfile {
            id: identity.id,
            email: credentials.email().clone(),
            name: details.name().clone(),
            address: details.address().clone(),
            date_of_birth: details.date_of_birth(),
            customer,
        });
        self.store
            .persist(&self.users, user.to_document_fields()?)
            .await?;

        let session = self.identity.create_session(credentials).await?;
        Ok(SignedIn { user, session })
    }

    /// Open a session and load the stored profile.
    ///
    /// The session is closed again when no usable profile can be loaded, so a
    /// failed sign-in never leaves a backend session without a cookie.
    pub async fn sign_in(&self, credentials: &SignInCredentials) -> Result<SignedIn, AccountError> {
        let session = self.identity.create_session(credentials).await?;
        let profile = self.load_profile(session.user_id()).await.and_then(|user| {
            user.ok_or_else(|| AccountError::ProfileMissing {
                user_id: session.user_id().clone(),
            })
        });
        match profile {
            Ok(user) => Ok(SignedIn { user, session }),
            Err(err) => {
                self.close_unusable_session(&session, &err).await;
                Err(err)
            }
        }
    }

    async fn close_unusable_session(&self, session: &Session, cause: &AccountError) {
        if let Err(delete_err) = self.identity.delete_session(session).await {
            warn!(
                user_id = %session.user_id(),
                cause = %cause,
                error = %delete_err,
                "failed to close session after sign-in failure"
            );
        }
    }

    /// Resolve the session's identity and its stored profile.
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, AccountError> {
        let Some(identity) = self.identity.current_user(session).await? else {
            return Ok(None);
        };
        match self.load_profile(&identity.id).await? {
            Some(user) => Ok(Some(user)),
            None => Err(AccountError::ProfileMissing {
                user_id: identity.id,
            }),
        }
    }

    /// Delete the backend session.
    pub async fn logout(&self, session: &Session) -> Result<(), AccountError> {
        self.identity.delete_session(session).await?;
        Ok(())
    }

    async fn load_profile(&self, user_id: &UserId) -> Result<Option<User>, AccountError> {
        let documents = self
            .store
            .query(
                &self.users,
                &[EqualityFilter::equal(USER_ID_FIELD, user_id.as_str())],
            )
            .await?;
        let mut profiles = documents
            .iter()
            .map(User::from_document)
            .filter(|profile| profile.as_ref().map_or(true, |user| user.id() == user_id));
        let profile = profiles.next().transpose()?;
        if profiles.next().is_some() {
            warn!(user_id = %user_id, "multiple profile documents found; using the first");
        }
        Ok(profile)
    }
}

#[async_trait]
impl UserAccounts for UserAccountService {
    async fn sign_up(&self, details: &SignUpDetails) -> Result<SignedIn, Error> {
        Self::sign_up(self, details).await.map_err(Error::from)
    }

    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<SignedIn, Error> {
        Self::sign_in(self, credentials).await.map_err(Error::from)
    }

    async fn current_user(&self, session: &Session) -> Result<Option<User>, Error> {
        Self::current_user(self, session).await.map_err(Error::from)
    }

    async fn logout(&self, session: &Session) -> Result<(), Error> {
        Self::logout(self, session).await.map_err(Error::from)
    }
}
