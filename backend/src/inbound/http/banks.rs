//! Linked bank-account read handlers.
//!
//! ```text
//! GET /api/v1/banks
//! GET /api/v1/banks/{documentId}
//! ```
//!
//! Listings carry a weak `ETag` built from the owner's listing revision and
//! the number of accounts, and honour `If-None-Match`.

use actix_web::http::header::ETAG;
use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{DocumentId, Error, LinkedBankAccount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::{
    if_none_match, private_no_cache_header, weak_listing_etag,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::require_current_user;

const LISTING_VIEW: &str = "banks";

/// Public view of a linked bank account. The access credential is omitted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountResponse {
    pub id: String,
    pub user_id: String,
    /// Bank-link item identifier.
    pub bank_id: String,
    pub account_id: String,
    pub funding_source_url: String,
    /// URL-safe identifier for sharing the account with other users.
    #[schema(example = "YWNjXzE")]
    pub shareable_id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<&LinkedBankAccount> for BankAccountResponse {
    fn from(account: &LinkedBankAccount) -> Self {
        let record = account.record();
        Self {
            id: account.id().to_string(),
            user_id: record.owner.to_string(),
            bank_id: record.item_id.to_string(),
            account_id: record.account_id.to_string(),
            funding_source_url: record.funding_source.as_url().to_string(),
            shareable_id: record.shareable_id.to_string(),
            created_at: account.created_at().to_rfc3339(),
        }
    }
}

/// List the signed-in user's linked bank accounts.
#[utoipa::path(
    get,
    path = "/api/v1/banks",
    responses(
        (
            status = 200,
            description = "Linked bank accounts",
            headers(
                ("Cache-Control" = String, description = "Cache control header"),
                ("ETag" = String, description = "Listing validator")
            ),
            body = [BankAccountResponse]
        ),
        (status = 304, description = "Listing unchanged"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    params(
        ("If-None-Match" = Option<String>, Header, description = "Validator from a previous listing")
    ),
    tags = ["banks"],
    operation_id = "listBankAccounts"
)]
#[get("/banks")]
pub async fn list_bank_accounts(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let user = require_current_user(&state, &session).await?;
    let revision = state.bank_accounts.listing_revision(user.id()).await?;
    let accounts = state.bank_accounts.list_by_owner(user.id()).await?;
    let etag = weak_listing_etag(LISTING_VIEW, revision, accounts.len());

    if if_none_match(&request, &etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header(private_no_cache_header())
            .insert_header((ETAG, etag))
            .finish());
    }

    let body = accounts
        .iter()
        .map(BankAccountResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .insert_header((ETAG, etag))
        .json(body))
}

/// Fetch one of the signed-in user's linked bank accounts.
///
/// Accounts owned by someone else answer `404` so their existence is not
/// disclosed.
#[utoipa::path(
    get,
    path = "/api/v1/banks/{documentId}",
    params(("documentId" = String, Path, description = "Bank-account document identifier")),
    responses(
        (
            status = 200,
            description = "Linked bank account",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = BankAccountResponse
        ),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Document store unavailable", body = ErrorSchema)
    ),
    tags = ["banks"],
    operation_id = "getBankAccount"
)]
#[get("/banks/{document_id}")]
pub async fn get_bank_account(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let document_id = DocumentId::new(path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "documentId", "code": "invalid_document_id" }))
    })?;
    let user = require_current_user(&state, &session).await?;
    let account = state.bank_accounts.get_by_id(&document_id).await?;
    if account.owner() != user.id() {
        return Err(Error::not_found(format!("bank account {document_id} not found")));
    }
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(BankAccountResponse::from(&account)))
}
