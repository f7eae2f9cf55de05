//! Document store over the Appwrite databases endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::client::AppwriteClient;
use super::dto::{CreateDocumentBody, DocumentDto, DocumentListDto, UNIQUE_ID, encode_query};
use crate::domain::ports::{
    CollectionId, Document, DocumentFields, DocumentStore, EqualityFilter, PersistenceError,
};
use crate::outbound::http_support::{FailureKind, HttpFailure, execute};

impl AppwriteClient {
    fn documents_path<'a>(&'a self, collection: &'a CollectionId) -> [&'a str; 5] {
        [
            "databases",
            self.database_id.as_str(),
            "collections",
            collection.as_str(),
            "documents",
        ]
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn persist(
        &self,
        collection: &CollectionId,
        fields: DocumentFields,
    ) -> Result<Document, PersistenceError> {
        let request = self
            .admin(Method::POST, &self.documents_path(collection))
            .json(&CreateDocumentBody {
                document_id: UNIQUE_ID,
                data: &fields,
            });
        let response = execute(request).await.map_err(map_failure)?;
        decode::<DocumentDto>(&response.body)?
            .into_domain()
            .map_err(PersistenceError::decode)
    }

    async fn query(
        &self,
        collection: &CollectionId,
        filters: &[EqualityFilter],
    ) -> Result<Vec<Document>, PersistenceError> {
        let queries = filters
            .iter()
            .map(|filter| {
                encode_query(filter)
                    .map(|query| ("queries[]", query))
                    .map_err(|error| PersistenceError::rejected(error.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let request = self
            .admin(Method::GET, &self.documents_path(collection))
            .query(&queries);
        let response = execute(request).await.map_err(map_failure)?;
        decode::<DocumentListDto>(&response.body)?
            .documents
            .into_iter()
            .map(|document| document.into_domain().map_err(PersistenceError::decode))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PersistenceError> {
    serde_json::from_slice(body).map_err(|error| {
        PersistenceError::decode(format!("invalid Appwrite JSON payload: {error}"))
    })
}

fn map_failure(failure: HttpFailure) -> PersistenceError {
    match failure.kind {
        FailureKind::Timeout => PersistenceError::timeout(failure.message),
        FailureKind::RateLimited | FailureKind::Transport => {
            PersistenceError::transport(failure.message)
        }
        FailureKind::Unauthorized | FailureKind::Conflict | FailureKind::Rejected => {
            PersistenceError::rejected(failure.message)
        }
    }
}
