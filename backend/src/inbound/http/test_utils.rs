//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, get};
use chrono::{TimeZone, Utc};

use crate::domain::{
    AccessToken, BankAccountRecord, CustomerRef, CustomerUrl, DisplayName, DocumentId, Email,
    Error, ExternalAccountId, FundingSourceUrl, ItemId, LinkedBankAccount, PostalAddress, Session,
    SessionSecret, ShareableId, User, UserId, UserProfile,
};
use crate::inbound::http::session::SessionContext;

pub const FIXTURE_USER_ID: &str = "user_1";
pub const FIXTURE_SECRET: &str = "secret-1";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

pub fn fixture_session() -> Session {
    Session::new(
        UserId::new(FIXTURE_USER_ID).expect("fixture user id"),
        SessionSecret::new(FIXTURE_SECRET).expect("fixture secret"),
    )
}

pub fn fixture_user() -> User {
    User::new(UserProfile {
        id: UserId::new(FIXTURE_USER_ID).expect("user id"),
        email: Email::new("ada@example.com").expect("email"),
        name: DisplayName::new("Ada", "Lovelace").expect("name"),
        address: PostalAddress::new("1 Analytical Way", "New York", "NY", "10001")
            .expect("address"),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).expect("date"),
        customer: CustomerRef::from_url(
            CustomerUrl::parse("https://api-sandbox.dwolla.com/customers/cust-42").expect("url"),
        )
        .expect("customer"),
    })
}

pub fn fixture_account(document_id: &str, owner: &str) -> LinkedBankAccount {
    let account_id = ExternalAccountId::new("acc_1").expect("account id");
    LinkedBankAccount::new(
        DocumentId::new(document_id).expect("document id"),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("timestamp"),
        BankAccountRecord {
            owner: UserId::new(owner).expect("owner"),
            item_id: ItemId::new("item_1").expect("item id"),
            shareable_id: ShareableId::encode(&account_id),
            account_id,
            access_token: AccessToken::new("access-sandbox-1").expect("access token"),
            funding_source: FundingSourceUrl::parse(
                "https://api-sandbox.dwolla.com/funding-sources/fs-1",
            )
            .expect("funding source"),
        },
    )
}

/// Route that stores [`fixture_session`] in the cookie.
#[get("/test/login")]
pub async fn fixture_login(session: SessionContext) -> Result<HttpResponse, Error> {
    session.persist(&fixture_session())?;
    Ok(HttpResponse::Ok().finish())
}

/// Extract the `session` cookie set on a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
