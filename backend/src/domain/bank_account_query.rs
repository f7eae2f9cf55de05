//! Read-only lookups of linked bank accounts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::port_errors::map_persistence_error;
use crate::domain::ports::{
    BankAccountQuery, CollectionId, DocumentStore, EqualityFilter, InvalidationError,
    ListingInvalidator, ListingView,
};
use crate::domain::{DocumentId, Error, LinkedBankAccount, OWNER_FIELD, UserId};

/// Query service over the bank-account collection.
#[derive(Clone)]
pub struct BankAccountQueryService {
    store: Arc<dyn DocumentStore>,
    revisions: Arc<dyn ListingInvalidator>,
    collection: CollectionId,
}

impl BankAccountQueryService {
    /// Create a query service reading from `collection`.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        revisions: Arc<dyn ListingInvalidator>,
        collection: CollectionId,
    ) -> Self {
        Self {
            store,
            revisions,
            collection,
        }
    }
}

fn map_revision_error(error: InvalidationError) -> Error {
    Error::service_unavailable(error.to_string())
}

#[async_trait]
impl BankAccountQuery for BankAccountQueryService {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<LinkedBankAccount>, Error> {
        let documents = self
            .store
            .query(
                &self.collection,
                &[EqualityFilter::equal(OWNER_FIELD, owner.as_str())],
            )
            .await
            .map_err(map_persistence_error)?;

        let mut accounts = Vec::with_capacity(documents.len());
        for document in &documents {
            let account = LinkedBankAccount::from_document(document).map_err(map_persistence_error)?;
            if account.owner() == owner {
                accounts.push(account);
            } else {
                warn!(
                    owner = %owner,
                    document_id = %account.id(),
                    "document store returned another owner's bank account; dropping it"
                );
            }
        }
        Ok(accounts)
    }

    async fn get_by_id(&self, id: &DocumentId) -> Result<LinkedBankAccount, Error> {
        let documents = self
            .store
            .query(&self.collection, &[EqualityFilter::document_id(id)])
            .await
            .map_err(map_persistence_error)?;

        let document = documents
            .iter()
            .find(|document| document.id() == id)
            .ok_or_else(|| Error::not_found(format!("bank account {id} not found")))?;
        LinkedBankAccount::from_document(document).map_err(map_persistence_error)
    }

    async fn listing_revision(&self, owner: &UserId) -> Result<u64, Error> {
        self.revisions
            .revision(owner, ListingView::BankAccounts)
            .await
            .map_err(map_revision_error)
    }
}
