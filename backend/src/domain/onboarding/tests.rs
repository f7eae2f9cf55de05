//! Tests for the onboarding pipeline's stage ordering and failure handling.

use super::*;
use crate::domain::ports::{
    Document, ExternalAccount, InvalidationError, MockBankLinkBroker, MockDocumentStore,
    MockListingInvalidator, MockPaymentProcessorBridge, TokenExchange,
};
use crate::domain::{
    AccessToken, CustomerRef, CustomerUrl, DisplayName, DocumentId, Email, ErrorCode,
    FundingSourceUrl, PostalAddress, ProcessorToken, UserId, UserProfile,
};
use chrono::{DateTime, NaiveDate, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const FUNDING_SOURCE: &str = "https://api-sandbox.dwolla.com/funding-sources/fs-1";

#[fixture]
fn user() -> User {
    User::new(UserProfile {
        id: UserId::new("user_1").expect("user id"),
        email: Email::new("ada@example.com").expect("email"),
        name: DisplayName::new("Ada", "Lovelace").expect("name"),
        address: PostalAddress::new("1 Analytical Way", "New York", "NY", "10001")
            .expect("address"),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10).expect("date"),
        customer: CustomerRef::from_url(
            CustomerUrl::parse("https://api-sandbox.dwolla.com/customers/cust-42").expect("url"),
        )
        .expect("customer"),
    })
}

fn public_token() -> PublicToken {
    PublicToken::new("public-sandbox-1").expect("public token")
}

fn exchange() -> TokenExchange {
    TokenExchange {
        access_token: AccessToken::new("access-sandbox-1").expect("access token"),
        item_id: ItemId::new("item_1").expect("item id"),
    }
}

fn checking() -> ExternalAccount {
    ExternalAccount {
        id: ExternalAccountId::new("acc_1").expect("account id"),
        name: "Plaid Checking".to_owned(),
        mask: Some("0000".to_owned()),
        subtype: Some("checking".to_owned()),
    }
}

fn bank_collection() -> CollectionId {
    CollectionId::new("banks").expect("collection id")
}

/// Mocks for every driven port, each expecting nothing by default.
struct Mocks {
    broker: MockBankLinkBroker,
    processor: MockPaymentProcessorBridge,
    store: MockDocumentStore,
    invalidator: MockListingInvalidator,
}

impl Mocks {
    fn new() -> Self {
        Self {
            broker: MockBankLinkBroker::new(),
            processor: MockPaymentProcessorBridge::new(),
            store: MockDocumentStore::new(),
            invalidator: MockListingInvalidator::new(),
        }
    }

    /// Expect every step up to and including `last` to succeed.
    fn succeed_through(mut self, last: &str) -> Self {
        let steps = [
            "exchange",
            "accounts",
            "processor_token",
            "funding_source",
            "persist",
            "invalidate",
        ];
        for step in steps {
            match step {
                "exchange" => {
                    self.broker
                        .expect_exchange_public_token()
                        .times(1)
                        .returning(|_| Ok(exchange()));
                }
                "accounts" => {
                    self.broker
                        .expect_list_accounts()
                        .times(1)
                        .returning(|_| Ok(vec![checking()]));
                }
                "processor_token" => {
                    self.processor
                        .expect_create_processor_token()
                        .times(1)
                        .returning(|_, _| Ok(ProcessorToken::new("processor-1").expect("token")));
                }
                "funding_source" => {
                    self.processor
                        .expect_create_funding_source()
                        .times(1)
                        .returning(|_| Ok(Some(FundingSourceUrl::parse(FUNDING_SOURCE).expect("url"))));
                }
                "persist" => {
                    self.store.expect_persist().times(1).returning(|_, fields| {
                        Ok(Document::new(
                            DocumentId::new("doc_1").expect("document id"),
                            DateTime::<Utc>::UNIX_EPOCH,
                            fields,
                        ))
                    });
                }
                _ => {
                    self.invalidator
                        .expect_invalidate()
                        .times(1)
                        .returning(|_, _| Ok(()));
                }
            }
            if step == last {
                break;
            }
        }
        self
    }

    fn service(self) -> BankOnboardingService {
        BankOnboardingService::new(OnboardingPorts {
            broker: Arc::new(self.broker),
            processor: Arc::new(self.processor),
            store: Arc::new(self.store),
            invalidator: Arc::new(self.invalidator),
            bank_accounts: bank_collection(),
        })
    }
}

#[rstest]
#[tokio::test]
async fn successful_run_persists_exactly_one_record(user: User) {
    let mut mocks = Mocks::new().succeed_through("funding_source");
    mocks
        .store
        .expect_persist()
        .times(1)
        .withf(|collection, fields| {
            collection.as_str() == "banks"
                && fields.get("fundingSourceUrl") == Some(&json!(FUNDING_SOURCE))
                && fields.get("userId") == Some(&json!("user_1"))
                && fields.get("bankId") == Some(&json!("item_1"))
                && fields.get("sharableId") == Some(&json!("YWNjXzE"))
        })
        .returning(|_, fields| {
            Ok(Document::new(
                DocumentId::new("doc_1").expect("document id"),
                DateTime::<Utc>::UNIX_EPOCH,
                fields,
            ))
        });
    mocks
        .invalidator
        .expect_invalidate()
        .times(1)
        .withf(|owner, views| owner.as_str() == "user_1" && views == ListingView::AFTER_ONBOARDING)
        .returning(|_, _| Ok(()));

    let outcome = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect("pipeline succeeds");

    assert_eq!(outcome.account.id().as_str(), "doc_1");
    assert_eq!(outcome.account.owner(), user.id());
    assert_eq!(
        outcome.account.record().funding_source.to_string(),
        FUNDING_SOURCE
    );
    assert_eq!(
        outcome.account.record().shareable_id.decode().expect("decode"),
        checking().id
    );
}

#[rstest]
#[tokio::test]
async fn funding_source_uses_customer_id_and_bank_name(user: User) {
    let mut mocks = Mocks::new().succeed_through("processor_token");
    mocks
        .processor
        .expect_create_funding_source()
        .times(1)
        .withf(|request| {
            request.customer_id == "cust-42"
                && request.bank_name == "Plaid Checking"
                && request.processor_token.expose() == "processor-1"
        })
        .returning(|_| Ok(Some(FundingSourceUrl::parse(FUNDING_SOURCE).expect("url"))));
    mocks.store.expect_persist().times(1).returning(|_, fields| {
        Ok(Document::new(
            DocumentId::new("doc_1").expect("document id"),
            DateTime::<Utc>::UNIX_EPOCH,
            fields,
        ))
    });
    mocks
        .invalidator
        .expect_invalidate()
        .returning(|_, _| Ok(()));

    mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect("pipeline succeeds");
}

#[rstest]
#[tokio::test]
async fn exchange_failure_stops_pipeline(user: User) {
    let mut mocks = Mocks::new();
    mocks
        .broker
        .expect_exchange_public_token()
        .times(1)
        .returning(|_| Err(BankLinkError::rejected("INVALID_PUBLIC_TOKEN")));
    mocks.broker.expect_list_accounts().times(0);
    mocks.processor.expect_create_processor_token().times(0);
    mocks.store.expect_persist().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("exchange fails");
    assert!(matches!(err, OnboardingError::Exchange(_)));
}

#[rstest]
#[tokio::test]
async fn account_lookup_failure_is_tagged(user: User) {
    let mut mocks = Mocks::new().succeed_through("exchange");
    mocks
        .broker
        .expect_list_accounts()
        .times(1)
        .returning(|_| Err(BankLinkError::timeout("30s")));
    mocks.processor.expect_create_processor_token().times(0);
    mocks.store.expect_persist().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("lookup fails");
    assert_eq!(err, OnboardingError::AccountLookup(BankLinkError::timeout("30s")));
}

#[rstest]
#[tokio::test]
async fn zero_accounts_fails_explicitly(user: User) {
    let mut mocks = Mocks::new().succeed_through("exchange");
    mocks
        .broker
        .expect_list_accounts()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    mocks.processor.expect_create_processor_token().times(0);
    mocks.processor.expect_create_funding_source().times(0);
    mocks.store.expect_persist().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("no accounts");
    assert_eq!(
        err,
        OnboardingError::NoAccounts {
            item_id: ItemId::new("item_1").expect("item id"),
        }
    );
}

#[rstest]
#[tokio::test]
async fn processor_token_failure_is_tagged(user: User) {
    let mut mocks = Mocks::new().succeed_through("accounts");
    mocks
        .processor
        .expect_create_processor_token()
        .times(1)
        .returning(|_, _| Err(ProcessorError::rejected("INVALID_ACCOUNT_ID")));
    mocks.processor.expect_create_funding_source().times(0);
    mocks.store.expect_persist().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("processor token fails");
    assert!(matches!(err, OnboardingError::ProcessorToken(_)));
}

#[rstest]
#[tokio::test]
async fn funding_source_failure_is_tagged(user: User) {
    let mut mocks = Mocks::new().succeed_through("processor_token");
    mocks
        .processor
        .expect_create_funding_source()
        .times(1)
        .returning(|_| Err(ProcessorError::rejected("unsupported account type")));
    mocks.store.expect_persist().times(0);
    mocks.invalidator.expect_invalidate().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("funding source fails");
    assert!(matches!(err, OnboardingError::FundingSource(_)));
}

#[rstest]
#[tokio::test]
async fn missing_funding_source_skips_persistence(user: User) {
    let mut mocks = Mocks::new().succeed_through("processor_token");
    mocks
        .processor
        .expect_create_funding_source()
        .times(1)
        .returning(|_| Ok(None));
    mocks.store.expect_persist().times(0);
    mocks.invalidator.expect_invalidate().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("missing funding source");
    assert_eq!(
        err,
        OnboardingError::MissingFundingSource {
            account_id: checking().id,
        }
    );
}

#[rstest]
#[tokio::test]
async fn persistence_failure_skips_invalidation(user: User) {
    let mut mocks = Mocks::new().succeed_through("funding_source");
    mocks
        .store
        .expect_persist()
        .times(1)
        .returning(|_, _| Err(PersistenceError::transport("connection refused")));
    mocks.invalidator.expect_invalidate().times(0);

    let err = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect_err("persistence fails");
    assert!(matches!(err, OnboardingError::Persistence(_)));
}

#[rstest]
#[tokio::test]
async fn invalidation_failure_does_not_fail_persisted_run(user: User) {
    let mut mocks = Mocks::new().succeed_through("persist");
    mocks
        .invalidator
        .expect_invalidate()
        .times(1)
        .returning(|_, _| Err(InvalidationError::unavailable("cache offline")));

    let outcome = mocks
        .service()
        .run(&user, &public_token())
        .await
        .expect("persisted run still succeeds");
    assert_eq!(outcome.account.id().as_str(), "doc_1");
}

#[rstest]
#[tokio::test]
async fn link_token_is_scoped_to_user(user: User) {
    let mut mocks = Mocks::new();
    mocks
        .broker
        .expect_create_link_token()
        .times(1)
        .withf(|request| {
            request.client_user_id.as_str() == "user_1" && request.client_name == "Ada Lovelace"
        })
        .returning(|_| Ok(LinkToken::new("link-sandbox-1")));

    let token = mocks
        .service()
        .create_link_token(&user)
        .await
        .expect("link token");
    assert_eq!(token.as_str(), "link-sandbox-1");
}

#[rstest]
#[tokio::test]
async fn link_token_rejection_maps_to_unprocessable(user: User) {
    let mut mocks = Mocks::new();
    mocks
        .broker
        .expect_create_link_token()
        .returning(|_| Err(BankLinkError::rejected("INVALID_FIELD")));

    let err = BankLinking::create_link_token(&mocks.service(), &user)
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unprocessable);
}

#[rstest]
#[case(OnboardingError::Exchange(BankLinkError::rejected("bad")), ErrorCode::Unprocessable, "exchange")]
#[case(OnboardingError::AccountLookup(BankLinkError::rate_limited("slow down")), ErrorCode::ServiceUnavailable, "account_lookup")]
#[case(OnboardingError::NoAccounts { item_id: ItemId::new("item_1").expect("item id") }, ErrorCode::Unprocessable, "no_accounts")]
#[case(OnboardingError::ProcessorToken(ProcessorError::timeout("30s")), ErrorCode::ServiceUnavailable, "processor_token")]
#[case(OnboardingError::FundingSource(ProcessorError::decode("no body")), ErrorCode::InternalError, "funding_source")]
#[case(OnboardingError::MissingFundingSource { account_id: ExternalAccountId::new("acc_1").expect("account id") }, ErrorCode::Unprocessable, "missing_funding_source")]
#[case(OnboardingError::Persistence(PersistenceError::decode("bad")), ErrorCode::InternalError, "persistence")]
fn onboarding_errors_map_to_codes_with_stage(
    #[case] error: OnboardingError,
    #[case] code: ErrorCode,
    #[case] stage: &str,
) {
    let mapped = Error::from(error);
    assert_eq!(mapped.code(), code);
    assert_eq!(mapped.details(), Some(&json!({ "stage": stage })));
}

#[rstest]
#[tokio::test]
async fn complete_link_surfaces_domain_error(user: User) {
    let mut mocks = Mocks::new().succeed_through("exchange");
    mocks
        .broker
        .expect_list_accounts()
        .returning(|_| Ok(Vec::new()));

    let err = mocks
        .service()
        .complete_link(&user, &public_token())
        .await
        .expect_err("no accounts");
    assert_eq!(err.code(), ErrorCode::Unprocessable);
    assert_eq!(
        err.details().and_then(|details| details.get("stage")),
        Some(&Value::from("no_accounts"))
    );
}
