//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! error schemas that stand in for domain types, and the session cookie
//! security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::auth::{SignInRequest, SignUpRequest};
use crate::inbound::http::bank_links::{ExchangeRequest, LinkTokenResponse};
use crate::inbound::http::banks::BankAccountResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::UserResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "bankdash_session",
                "Encrypted session cookie issued by sign-up or sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bankdash backend API",
        description = "Sign-up, session management and bank-account onboarding."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::bank_links::create_link_token,
        crate::inbound::http::bank_links::exchange_public_token,
        crate::inbound::http::banks::list_bank_accounts,
        crate::inbound::http::banks::get_bank_account,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SignUpRequest,
        SignInRequest,
        UserResponse,
        LinkTokenResponse,
        ExchangeRequest,
        BankAccountResponse
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in and logout"),
        (name = "users", description = "Signed-in user profile"),
        (name = "bank-links", description = "Bank-account linking flow"),
        (name = "banks", description = "Linked bank accounts"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
