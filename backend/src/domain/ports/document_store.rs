//! Port abstraction for collection-scoped document storage.
//!
//! The identity backend doubles as a schemaless document database. Records
//! are flat JSON objects grouped by collection and read back with equality
//! filters. Domain types own their field mapping through [`Document::decode`]
//! and [`encode_fields`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::domain::{DocumentId, IdentifierValidationError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum PersistenceError {
        /// The store refused the write or query.
        Rejected { message: String } => "document store rejected the request: {message}",
        /// The store could not be reached.
        Transport { message: String } => "document store transport failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } => "document store timed out: {message}",
        /// A stored document did not have the expected shape.
        Decode { message: String } => "failed to decode document: {message}",
    }
}

/// Flat field map of a stored document.
pub type DocumentFields = Map<String, Value>;

/// Collection identifier inside the configured database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionId(String);

impl CollectionId {
    /// Wrap a collection identifier, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentifierValidationError::Empty {
                kind: "collection id",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Collections used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    /// User profile documents.
    pub users: CollectionId,
    /// Linked bank-account documents.
    pub bank_accounts: CollectionId,
}

/// Attribute name the store uses for its own document identifier.
pub const DOCUMENT_ID_ATTRIBUTE: &str = "$id";

/// Match documents whose `attribute` equals one of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityFilter {
    attribute: String,
    values: Vec<String>,
}

impl EqualityFilter {
    /// Filter on a single attribute value.
    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Filter on the store-assigned document identifier.
    pub fn document_id(id: &DocumentId) -> Self {
        Self::equal(DOCUMENT_ID_ATTRIBUTE, id.as_str())
    }

    /// Attribute being compared.
    pub fn attribute(&self) -> &str {
        self.attribute.as_str()
    }

    /// Accepted values.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `document` satisfies the filter.
    pub fn matches(&self, document: &Document) -> bool {
        let candidate = if self.attribute == DOCUMENT_ID_ATTRIBUTE {
            Some(document.id().as_str())
        } else {
            document.fields().get(&self.attribute).and_then(Value::as_str)
        };
        candidate.is_some_and(|value| self.values.iter().any(|accepted| accepted == value))
    }
}

/// A stored document with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    created_at: DateTime<Utc>,
    fields: DocumentFields,
}

impl Document {
    /// Assemble a document from store output.
    pub fn new(id: DocumentId, created_at: DateTime<Utc>, fields: DocumentFields) -> Self {
        Self {
            id,
            created_at,
            fields,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Store-assigned creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// User-defined fields.
    pub fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    /// Deserialize the user-defined fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PersistenceError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|err| {
            PersistenceError::decode(format!("document {}: {err}", self.id))
        })
    }
}

/// Serialize a typed record into a flat field map.
pub fn encode_fields<T: Serialize>(record: &T) -> Result<DocumentFields, PersistenceError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(PersistenceError::decode(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(err) => Err(PersistenceError::decode(err.to_string())),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-generated identifier.
    async fn persist(
        &self,
        collection: &CollectionId,
        fields: DocumentFields,
    ) -> Result<Document, PersistenceError>;

    /// Return documents matching every filter, in store order.
    async fn query(
        &self,
        collection: &CollectionId,
        filters: &[EqualityFilter],
    ) -> Result<Vec<Document>, PersistenceError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn document() -> Document {
        let fields = match json!({ "userId": "user_1", "bankId": "item_1" }) {
            Value::Object(map) => map,
            _ => unreachable!("literal is an object"),
        };
        Document::new(
            DocumentId::new("doc_1").expect("document id"),
            DateTime::<Utc>::UNIX_EPOCH,
            fields,
        )
    }

    #[rstest]
    #[case(EqualityFilter::equal("userId", "user_1"), true)]
    #[case(EqualityFilter::equal("userId", "user_2"), false)]
    #[case(EqualityFilter::equal("missing", "user_1"), false)]
    #[case(EqualityFilter::equal("$id", "doc_1"), true)]
    fn equality_filter_matches_fields_and_id(
        document: Document,
        #[case] filter: EqualityFilter,
        #[case] expected: bool,
    ) {
        assert_eq!(filter.matches(&document), expected);
    }

    #[rstest]
    fn decode_reports_document_id_on_shape_mismatch(document: Document) {
        #[derive(Debug, serde::Deserialize)]
        #[expect(dead_code, reason = "only the decode failure is asserted")]
        struct Needs {
            absent: String,
        }

        let err = document.decode::<Needs>().expect_err("missing field");
        assert!(matches!(err, PersistenceError::Decode { message } if message.contains("doc_1")));
    }

    #[rstest]
    fn encode_fields_rejects_non_objects() {
        assert!(encode_fields(&"plain").is_err());
    }

    #[rstest]
    fn collection_id_rejects_blank_values() {
        assert!(CollectionId::new("  ").is_err());
    }
}
