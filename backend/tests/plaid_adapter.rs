//! Plaid adapter behaviour against a stubbed API.

use std::time::Duration;

use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

use bankdash::domain::ports::{BankLinkBroker, BankLinkError, LinkTokenRequest};
use bankdash::domain::{AccessToken, ExternalAccountId, PublicToken, UserId};
use bankdash::outbound::plaid::{PlaidClient, PlaidConfig};

fn client(server: &MockServer) -> PlaidClient {
    PlaidClient::new(PlaidConfig {
        base_url: Url::parse(&server.uri()).expect("base url"),
        client_id: "client-1".to_owned(),
        secret: Zeroizing::new("plaid-secret".to_owned()),
        timeout: Duration::from_secs(5),
    })
    .expect("client")
}

fn access_token() -> AccessToken {
    AccessToken::new("access-sandbox-1").expect("token")
}

#[tokio::test]
async fn link_token_request_names_the_user_and_products() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .and(body_partial_json(json!({
            "client_id": "client-1",
            "secret": "plaid-secret",
            "user": {"client_user_id": "user_1"},
            "client_name": "Ada Lovelace",
            "products": ["auth"],
            "language": "en",
            "country_codes": ["US"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"link_token": "link-sandbox-abc"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = client(&server)
        .create_link_token(&LinkTokenRequest {
            client_user_id: UserId::new("user_1").expect("user id"),
            client_name: "Ada Lovelace".to_owned(),
        })
        .await
        .expect("link token");

    assert_eq!(token.as_str(), "link-sandbox-abc");
}

#[tokio::test]
async fn public_token_exchange_returns_item_and_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .and(body_partial_json(json!({
            "client_id": "client-1",
            "public_token": "public-sandbox-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-sandbox-1",
            "item_id": "item_1",
            "request_id": "req"
        })))
        .mount(&server)
        .await;

    let exchange = client(&server)
        .exchange_public_token(&PublicToken::new("public-sandbox-1").expect("token"))
        .await
        .expect("exchange");

    assert_eq!(exchange.access_token.expose(), "access-sandbox-1");
    assert_eq!(exchange.item_id.as_str(), "item_1");
}

#[tokio::test]
async fn accounts_keep_provider_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/get"))
        .and(body_partial_json(json!({"access_token": "access-sandbox-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [
                {"account_id": "acc_1", "name": "Plaid Checking", "mask": "0000", "subtype": "checking"},
                {"account_id": "acc_2", "name": "Plaid Saving", "mask": null, "subtype": "savings"}
            ]
        })))
        .mount(&server)
        .await;

    let accounts = client(&server)
        .list_accounts(&access_token())
        .await
        .expect("accounts");

    let ids = accounts
        .iter()
        .map(|account| account.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["acc_1", "acc_2"]);
    assert_eq!(accounts[1].mask, None);
}

#[tokio::test]
async fn item_without_accounts_yields_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accounts": []})))
        .mount(&server)
        .await;

    let accounts = client(&server)
        .list_accounts(&access_token())
        .await
        .expect("accounts");

    assert!(accounts.is_empty());
}

#[tokio::test]
async fn processor_token_targets_dwolla() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/processor/token/create"))
        .and(body_partial_json(json!({
            "access_token": "access-sandbox-1",
            "account_id": "acc_1",
            "processor": "dwolla"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"processor_token": "processor-sandbox-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = client(&server)
        .create_processor_token(
            &access_token(),
            &ExternalAccountId::new("acc_1").expect("account id"),
        )
        .await
        .expect("processor token");

    assert_eq!(token.expose(), "processor-sandbox-1");
}

#[tokio::test]
async fn error_envelope_becomes_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "INVALID_INPUT",
            "error_code": "INVALID_PUBLIC_TOKEN",
            "error_message": "provided public token is in an invalid format"
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_public_token(&PublicToken::new("public-bad").expect("token"))
        .await
        .expect_err("rejected");

    assert_eq!(
        error,
        BankLinkError::rejected(
            "INVALID_INPUT INVALID_PUBLIC_TOKEN: provided public token is in an invalid format"
        )
    );
}

#[tokio::test]
async fn rate_limit_envelope_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/get"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "RATE_LIMIT_EXCEEDED",
            "error_code": "ACCOUNTS_LIMIT",
            "error_message": "rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .list_accounts(&access_token())
        .await
        .expect_err("rate limited");

    assert!(matches!(error, BankLinkError::RateLimited { .. }));
}

#[tokio::test]
async fn empty_link_token_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"link_token": ""})))
        .mount(&server)
        .await;

    let error = client(&server)
        .create_link_token(&LinkTokenRequest {
            client_user_id: UserId::new("user_1").expect("user id"),
            client_name: "Ada Lovelace".to_owned(),
        })
        .await
        .expect_err("decode");

    assert!(matches!(error, BankLinkError::Decode { .. }));
}
