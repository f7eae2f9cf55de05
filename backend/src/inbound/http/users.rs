//! Current-user HTTP handler.
//!
//! ```text
//! GET /api/v1/users/me
//! ```

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Public view of a user profile.
///
/// The SSN is never stored, so it never appears here.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "65f1c0de0012ab34cd56")]
    pub id: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO-8601 calendar date.
    #[schema(example = "1990-12-10")]
    pub date_of_birth: String,
    /// Payment-processor customer identifier.
    pub customer_id: String,
    /// Payment-processor customer URL.
    pub customer_url: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            first_name: user.name().first().to_owned(),
            last_name: user.name().last().to_owned(),
            address1: user.address().address1().to_owned(),
            city: user.address().city().to_owned(),
            state: user.address().state().to_owned(),
            postal_code: user.address().postal_code().to_owned(),
            date_of_birth: user.date_of_birth().format("%Y-%m-%d").to_string(),
            customer_id: user.customer().id().to_owned(),
            customer_url: user.customer().url().as_url().to_string(),
        }
    }
}

/// Resolve the signed-in user or fail with `401 Unauthorized`.
///
/// A cookie whose backend session has expired is purged.
pub(crate) async fn require_current_user(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<User> {
    let backend = session.require_session()?;
    match state.accounts.current_user(&backend).await? {
        Some(user) => Ok(user),
        None => {
            session.purge();
            Err(Error::unauthorized("session expired"))
        }
    }
}

/// Fetch the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (
            status = 200,
            description = "Current user",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = UserResponse
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Identity has no stored profile", body = ErrorSchema),
        (status = 503, description = "Identity backend unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = require_current_user(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests;
