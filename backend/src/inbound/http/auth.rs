//! Sign-up, sign-in and logout handlers.
//!
//! ```text
//! POST /api/v1/auth/sign-up {"email":"ada@example.com","password":"...",...}
//! POST /api/v1/auth/sign-in {"email":"ada@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::SignedIn;
use crate::domain::{
    AuthValidationError, Error, SignInCredentials, SignUpDetails, SignUpForm,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    /// Two-letter US state code.
    #[schema(example = "NY")]
    pub state: String,
    pub postal_code: String,
    /// ISO-8601 calendar date.
    #[schema(example = "1990-12-10")]
    pub date_of_birth: String,
    /// Last four digits of the SSN, forwarded to the payment processor only.
    #[schema(example = "1234")]
    pub ssn: String,
}

impl TryFrom<&SignUpRequest> for SignUpDetails {
    type Error = AuthValidationError;

    fn try_from(value: &SignUpRequest) -> Result<Self, Self::Error> {
        Self::try_from_form(SignUpForm {
            email: &value.email,
            password: &value.password,
            first_name: &value.first_name,
            last_name: &value.last_name,
            address1: &value.address1,
            city: &value.city,
            state: &value.state,
            postal_code: &value.postal_code,
            date_of_birth: &value.date_of_birth,
            ssn: &value.ssn,
        })
    }
}

/// Sign-in request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

impl TryFrom<&SignInRequest> for SignInCredentials {
    type Error = AuthValidationError;

    fn try_from(value: &SignInRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_validation_error(err: &AuthValidationError) -> Error {
    let (field, code) = match err {
        AuthValidationError::InvalidEmail => ("email", "invalid_email"),
        AuthValidationError::EmptyPassword => ("password", "empty_password"),
        AuthValidationError::EmptySsn => ("ssn", "empty_ssn"),
        AuthValidationError::InvalidDateOfBirth => ("dateOfBirth", "invalid_date_of_birth"),
        AuthValidationError::Profile(UserValidationError::EmptyFirstName) => {
            ("firstName", "empty_first_name")
        }
        AuthValidationError::Profile(UserValidationError::EmptyLastName) => {
            ("lastName", "empty_last_name")
        }
        AuthValidationError::Profile(UserValidationError::EmptyAddressField { field }) => {
            (address_field_name(field), "empty_address_field")
        }
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn address_field_name(field: &str) -> &'static str {
    match field {
        "address1" => "address1",
        "city" => "city",
        "state" => "state",
        _ => "postalCode",
    }
}

fn signed_in_response(
    session: &SessionContext,
    signed_in: &SignedIn,
    mut builder: actix_web::HttpResponseBuilder,
) -> ApiResult<HttpResponse> {
    session.persist(&signed_in.session)?;
    Ok(builder.json(UserResponse::from(&signed_in.user)))
}

/// Register a new user, create their processor customer and sign them in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Signed up", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 422, description = "Payment processor refused the customer", body = ErrorSchema),
        (status = 503, description = "Provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    let details = SignUpDetails::try_from(&payload.into_inner())
        .map_err(|err| map_validation_error(&err))?;
    let signed_in = state.accounts.sign_up(&details).await?;
    info!(user_id = %signed_in.user.id(), "user signed up");
    signed_in_response(&session, &signed_in, HttpResponse::Created())
}

/// Open a session with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Identity backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = SignInCredentials::try_from(&payload.into_inner())
        .map_err(|err| map_validation_error(&err))?;
    let signed_in = state.accounts.sign_in(&credentials).await?;
    signed_in_response(&session, &signed_in, HttpResponse::Ok())
}

/// End the backend session and clear the cookie.
///
/// The cookie is cleared even when the backend call fails.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 503, description = "Identity backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(backend) = session.session()? else {
        session.purge();
        return Ok(HttpResponse::NoContent().finish());
    };
    let result = state.accounts.logout(&backend).await;
    session.purge();
    result?;
    Ok(HttpResponse::NoContent().finish())
}
