//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed domain entities and the services that
//! orchestrate the identity backend, bank-link provider and payment
//! processor. Keep types immutable and document invariants in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, LinkedBankAccount, Session: aggregates.
//! - BankOnboardingService, BankAccountQueryService, UserAccountService:
//!   domain services implementing the driving ports in [`ports`].

pub mod auth;
pub mod bank_account;
pub mod bank_account_query;
pub mod error;
pub mod identifiers;
pub mod onboarding;
mod port_errors;
pub mod ports;
pub mod resource_url;
pub mod secret;
pub mod session;
pub mod shareable_id;
pub mod trace_id;
pub mod user;
pub mod user_accounts;

pub use self::auth::{AuthValidationError, Email, SignInCredentials, SignUpDetails, SignUpForm};
pub use self::bank_account::{BankAccountRecord, LinkToken, LinkedBankAccount, OWNER_FIELD};
pub use self::bank_account_query::BankAccountQueryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifiers::{
    DocumentId, ExternalAccountId, IdentifierValidationError, ItemId, UserId,
};
pub use self::onboarding::{
    BankOnboardingService, LinkTokenError, OnboardingError, OnboardingOutcome, OnboardingPorts,
};
pub use self::resource_url::{CustomerUrl, FundingSourceUrl, ResourceUrlError};
pub use self::secret::{
    AccessToken, EmptySecretError, Password, ProcessorToken, PublicToken, SessionSecret, Ssn,
};
pub use self::session::Session;
pub use self::shareable_id::{ShareableId, ShareableIdError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CustomerRef, DisplayName, PostalAddress, USER_ID_FIELD, User, UserProfile,
    UserValidationError,
};
pub use self::user_accounts::{AccountError, UserAccountService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bankdash::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
