//! In-memory port implementations for tests.
//!
//! Compiled for unit tests and for integration tests through the
//! `test-support` feature. The fakes keep state behind `std::sync::Mutex`
//! and never touch the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    AuthError, BankLinkBroker, BankLinkError, CollectionId, Document, DocumentFields,
    DocumentStore, EqualityFilter, ExternalAccount, FundingSourceRequest, IdentityAccount,
    IdentityGateway, LinkTokenRequest, NewCustomer, NewIdentityAccount, PaymentProcessorBridge,
    PersistenceError, ProcessorError, TokenExchange,
};
use crate::domain::{
    AccessToken, CustomerUrl, DocumentId, ExternalAccountId, FundingSourceUrl, ItemId,
    LinkToken, ProcessorToken, PublicToken, Session, SessionSecret, SignInCredentials, UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StoredIdentity {
    account: IdentityAccount,
    password: String,
}

/// Identity backend keeping accounts and sessions in memory.
#[derive(Default)]
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, StoredIdentity>>,
    sessions: Mutex<HashMap<String, UserId>>,
    next_id: AtomicU64,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open sessions.
    pub fn open_sessions(&self) -> usize {
        lock(&self.sessions).len()
    }

    fn mint(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl IdentityGateway for InMemoryIdentity {
    async fn create_session(&self, credentials: &SignInCredentials) -> Result<Session, AuthError> {
        let user_id = {
            let accounts = lock(&self.accounts);
            let stored = accounts
                .get(credentials.email().as_str())
                .filter(|stored| stored.password == credentials.password().expose())
                .ok_or_else(AuthError::invalid_credentials)?;
            stored.account.id.clone()
        };
        let secret = self.mint("secret");
        lock(&self.sessions).insert(secret.clone(), user_id.clone());
        let secret = SessionSecret::new(secret).map_err(|err| AuthError::decode(err.to_string()))?;
        Ok(Session::new(user_id, secret))
    }

    async fn create_account(
        &self,
        account: &NewIdentityAccount,
    ) -> Result<IdentityAccount, AuthError> {
        let id = UserId::new(self.mint("user")).map_err(|err| AuthError::decode(err.to_string()))?;
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(account.email.as_str()) {
            return Err(AuthError::already_registered());
        }
        let created = IdentityAccount {
            id,
            email: account.email.clone(),
            name: account.name.full_name(),
        };
        accounts.insert(
            account.email.as_str().to_owned(),
            StoredIdentity {
                account: created.clone(),
                password: account.password.expose().to_owned(),
            },
        );
        Ok(created)
    }

    async fn current_user(&self, session: &Session) -> Result<Option<IdentityAccount>, AuthError> {
        let Some(user_id) = lock(&self.sessions)
            .get(session.secret().expose())
            .cloned()
        else {
            return Ok(None);
        };
        Ok(lock(&self.accounts)
            .values()
            .find(|stored| stored.account.id == user_id)
            .map(|stored| stored.account.clone()))
    }

    async fn delete_session(&self, session: &Session) -> Result<(), AuthError> {
        lock(&self.sessions).remove(session.secret().expose());
        Ok(())
    }
}

/// Document store keeping documents in insertion order.
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<(CollectionId, Document)>>,
    next_id: AtomicU64,
    created_at: DateTime<Utc>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents stored in `collection`.
    pub fn documents(&self, collection: &CollectionId) -> Vec<Document> {
        lock(&self.documents)
            .iter()
            .filter(|(stored_in, _)| stored_in == collection)
            .map(|(_, document)| document.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn persist(
        &self,
        collection: &CollectionId,
        fields: DocumentFields,
    ) -> Result<Document, PersistenceError> {
        let id = DocumentId::new(format!(
            "doc_{}",
            self.next_id.fetch_add(1, Ordering::Relaxed) + 1
        ))
        .map_err(|err| PersistenceError::decode(err.to_string()))?;
        let document = Document::new(id, self.created_at, fields);
        lock(&self.documents).push((collection.clone(), document.clone()));
        Ok(document)
    }

    async fn query(
        &self,
        collection: &CollectionId,
        filters: &[EqualityFilter],
    ) -> Result<Vec<Document>, PersistenceError> {
        Ok(lock(&self.documents)
            .iter()
            .filter(|(stored_in, document)| {
                stored_in == collection && filters.iter().all(|filter| filter.matches(document))
            })
            .map(|(_, document)| document.clone())
            .collect())
    }
}

/// Bank-link provider answering every call with a fixed item.
pub struct StubBankLinkBroker {
    accounts: Vec<ExternalAccount>,
}

impl StubBankLinkBroker {
    /// Broker whose item holds a single checking account `acc_1`.
    pub fn with_checking_account() -> Result<Self, BankLinkError> {
        let id = ExternalAccountId::new("acc_1").map_err(|err| BankLinkError::decode(err.to_string()))?;
        Ok(Self::with_accounts(vec![ExternalAccount {
            id,
            name: "Plaid Checking".to_owned(),
            mask: Some("0000".to_owned()),
            subtype: Some("checking".to_owned()),
        }]))
    }

    pub fn with_accounts(accounts: Vec<ExternalAccount>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl BankLinkBroker for StubBankLinkBroker {
    async fn create_link_token(
        &self,
        request: &LinkTokenRequest,
    ) -> Result<LinkToken, BankLinkError> {
        Ok(LinkToken::new(format!("link-sandbox-{}", request.client_user_id)))
    }

    async fn exchange_public_token(
        &self,
        public_token: &PublicToken,
    ) -> Result<TokenExchange, BankLinkError> {
        if public_token.expose() == "public-invalid" {
            return Err(BankLinkError::rejected("INVALID_PUBLIC_TOKEN"));
        }
        let decode = |err: &dyn std::fmt::Display| BankLinkError::decode(err.to_string());
        Ok(TokenExchange {
            access_token: AccessToken::new("access-sandbox-1").map_err(|err| decode(&err))?,
            item_id: ItemId::new("item_1").map_err(|err| decode(&err))?,
        })
    }

    async fn list_accounts(
        &self,
        _access_token: &AccessToken,
    ) -> Result<Vec<ExternalAccount>, BankLinkError> {
        Ok(self.accounts.clone())
    }
}

/// Payment processor returning fixed resource URLs.
pub struct StubPaymentProcessor {
    customer: Option<CustomerUrl>,
    funding_source: Option<FundingSourceUrl>,
    customers_created: AtomicU64,
}

impl StubPaymentProcessor {
    /// Processor that creates customer `cust-42` and funding source `fs-1`.
    pub fn sandbox() -> Result<Self, ProcessorError> {
        let decode = |err: &dyn std::fmt::Display| ProcessorError::decode(err.to_string());
        Ok(Self {
            customer: Some(
                CustomerUrl::parse("https://api-sandbox.dwolla.com/customers/cust-42")
                    .map_err(|err| decode(&err))?,
            ),
            funding_source: Some(
                FundingSourceUrl::parse("https://api-sandbox.dwolla.com/funding-sources/fs-1")
                    .map_err(|err| decode(&err))?,
            ),
            customers_created: AtomicU64::new(0),
        })
    }

    /// Return no `Location` for funding sources.
    #[must_use]
    pub fn without_funding_source(mut self) -> Self {
        self.funding_source = None;
        self
    }

    pub fn customers_created(&self) -> u64 {
        self.customers_created.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PaymentProcessorBridge for StubPaymentProcessor {
    async fn create_customer(
        &self,
        _customer: &NewCustomer,
    ) -> Result<Option<CustomerUrl>, ProcessorError> {
        self.customers_created.fetch_add(1, Ordering::Relaxed);
        Ok(self.customer.clone())
    }

    async fn create_processor_token(
        &self,
        _access_token: &AccessToken,
        account_id: &ExternalAccountId,
    ) -> Result<ProcessorToken, ProcessorError> {
        ProcessorToken::new(format!("processor-sandbox-{account_id}"))
            .map_err(|err| ProcessorError::decode(err.to_string()))
    }

    async fn create_funding_source(
        &self,
        _request: &FundingSourceRequest,
    ) -> Result<Option<FundingSourceUrl>, ProcessorError> {
        Ok(self.funding_source.clone())
    }
}

