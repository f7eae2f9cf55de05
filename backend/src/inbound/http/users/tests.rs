//! Tests for the current-user handler.

use super::*;
use crate::domain::ports::{MockBankAccountQuery, MockBankLinking, MockUserAccounts};
use crate::inbound::http::test_utils::{
    fixture_login, fixture_user, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;
use std::sync::Arc;

fn test_app(
    accounts: MockUserAccounts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(accounts),
        Arc::new(MockBankLinking::new()),
        Arc::new(MockBankAccountQuery::new()),
    );
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(fixture_login)
        .service(web::scope("/api/v1").service(current_user))
}

#[actix_web::test]
async fn returns_profile_for_signed_in_user() {
    let mut accounts = MockUserAccounts::new();
    accounts
        .expect_current_user()
        .withf(|session| session.user_id().as_str() == "user_1")
        .times(1)
        .returning(|_| Ok(Some(fixture_user())));
    let app = actix_test::init_service(test_app(accounts)).await;

    let login =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/test/login").to_request())
            .await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(session_cookie(&login))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("Cache-Control")
            .and_then(|value| value.to_str().ok()),
        Some("private, no-cache, must-revalidate")
    );
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], "user_1");
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["postalCode"], "10001");
    assert_eq!(body["dateOfBirth"], "1990-12-10");
    assert_eq!(body["customerId"], "cust-42");
    assert!(body.get("ssn").is_none());
}

#[actix_web::test]
async fn missing_cookie_is_unauthorised_without_backend_call() {
    let app = actix_test::init_service(test_app(MockUserAccounts::new())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn expired_backend_session_purges_cookie() {
    let mut accounts = MockUserAccounts::new();
    accounts
        .expect_current_user()
        .times(1)
        .returning(|_| Ok(None));
    let app = actix_test::init_service(test_app(accounts)).await;

    let login =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/test/login").to_request())
            .await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(session_cookie(&login))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(session_cookie(&response).value(), "");
}

#[actix_web::test]
async fn backend_outage_maps_to_service_unavailable() {
    let mut accounts = MockUserAccounts::new();
    accounts
        .expect_current_user()
        .returning(|_| Err(Error::service_unavailable("identity backend unavailable")));
    let app = actix_test::init_service(test_app(accounts)).await;

    let login =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/test/login").to_request())
            .await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(session_cookie(&login))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
