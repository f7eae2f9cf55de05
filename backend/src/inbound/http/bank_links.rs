//! Bank-linking handlers.
//!
//! ```text
//! POST /api/v1/bank-links/token
//! POST /api/v1/bank-links/exchange {"publicToken":"public-sandbox-..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, PublicToken};
use crate::inbound::http::ApiResult;
use crate::inbound::http::banks::BankAccountResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::require_current_user;

/// Link token handed to the client-side linking widget.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenResponse {
    #[schema(example = "link-sandbox-af1a0311-da53-4636-b754-dd15cc058176")]
    pub link_token: String,
}

/// Public token produced by the linking widget.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    #[schema(example = "public-sandbox-b0e2c4ee-a763-4df5-bfe9-46a46bce993d")]
    pub public_token: String,
}

/// Issue a link token for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/bank-links/token",
    responses(
        (status = 200, description = "Link token", body = LinkTokenResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "Bank-link provider refused the request", body = ErrorSchema),
        (status = 503, description = "Bank-link provider unavailable", body = ErrorSchema)
    ),
    tags = ["bank-links"],
    operation_id = "createLinkToken"
)]
#[post("/bank-links/token")]
pub async fn create_link_token(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<LinkTokenResponse>> {
    let user = require_current_user(&state, &session).await?;
    let token = state.bank_linking.create_link_token(&user).await?;
    Ok(web::Json(LinkTokenResponse {
        link_token: token.as_str().to_owned(),
    }))
}

/// Exchange a public token and link the first account behind it.
#[utoipa::path(
    post,
    path = "/api/v1/bank-links/exchange",
    request_body = ExchangeRequest,
    responses(
        (status = 201, description = "Bank account linked", body = BankAccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "A provider refused a pipeline step", body = ErrorSchema),
        (status = 503, description = "A provider was unavailable", body = ErrorSchema)
    ),
    tags = ["bank-links"],
    operation_id = "exchangePublicToken"
)]
#[post("/bank-links/exchange")]
pub async fn exchange_public_token(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ExchangeRequest>,
) -> ApiResult<HttpResponse> {
    let user = require_current_user(&state, &session).await?;
    let public_token = PublicToken::new(payload.into_inner().public_token.trim()).map_err(|_| {
        Error::invalid_request("public token must not be empty")
            .with_details(json!({ "field": "publicToken", "code": "empty_public_token" }))
    })?;
    let outcome = state
        .bank_linking
        .complete_link(&user, &public_token)
        .await?;
    Ok(HttpResponse::Created().json(BankAccountResponse::from(&outcome.account)))
}
