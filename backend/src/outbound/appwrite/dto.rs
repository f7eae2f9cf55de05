//! Appwrite request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{Document, DocumentFields, EqualityFilter, IdentityAccount};
use crate::domain::{DocumentId, Email, Session, SessionSecret, UserId};

/// Ask Appwrite to allocate the identifier.
pub(super) const UNIQUE_ID: &str = "unique()";

const CREATED_AT_ATTRIBUTE: &str = "$createdAt";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateAccountBody<'a> {
    pub(super) user_id: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateSessionBody<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateDocumentBody<'a> {
    pub(super) document_id: &'a str,
    pub(super) data: &'a DocumentFields,
}

#[derive(Debug, Serialize)]
struct QueryDto<'a> {
    method: &'static str,
    attribute: &'a str,
    values: &'a [String],
}

/// Render an equality filter in Appwrite's JSON query syntax.
pub(super) fn encode_query(filter: &EqualityFilter) -> Result<String, serde_json::Error> {
    serde_json::to_string(&QueryDto {
        method: "equal",
        attribute: filter.attribute(),
        values: filter.values(),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    #[serde(rename = "$id")]
    id: String,
    email: String,
    #[serde(default)]
    name: String,
}

impl AccountDto {
    pub(super) fn into_domain(self) -> Result<IdentityAccount, String> {
        Ok(IdentityAccount {
            id: UserId::new(self.id).map_err(|err| err.to_string())?,
            email: Email::new(&self.email).map_err(|err| err.to_string())?,
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionDto {
    user_id: String,
    #[serde(default)]
    secret: String,
}

impl SessionDto {
    pub(super) fn into_domain(self) -> Result<Session, String> {
        let user_id = UserId::new(self.user_id).map_err(|err| err.to_string())?;
        let secret = SessionSecret::new(self.secret)
            .map_err(|_| "session secret missing; the API key needs the sessions.write scope")?;
        Ok(Session::new(user_id, secret))
    }
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(super) struct DocumentDto(DocumentFields);

impl DocumentDto {
    /// Split Appwrite `$` metadata from the application fields.
    pub(super) fn into_domain(self) -> Result<Document, String> {
        let mut fields = self.0;
        let id = match fields.remove("$id") {
            Some(Value::String(id)) => DocumentId::new(id).map_err(|err| err.to_string())?,
            _ => return Err("document is missing `$id`".to_owned()),
        };
        let created_at = match fields.remove(CREATED_AT_ATTRIBUTE) {
            Some(Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
                .map_err(|err| format!("document {id} has invalid `$createdAt`: {err}"))?
                .with_timezone(&Utc),
            _ => return Err(format!("document {id} is missing `$createdAt`")),
        };
        fields.retain(|key, _| !key.starts_with('$'));
        Ok(Document::new(id, created_at, fields))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DocumentListDto {
    #[serde(default)]
    pub(super) documents: Vec<DocumentDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_metadata_is_stripped() {
        let dto: DocumentDto = serde_json::from_value(json!({
            "$id": "doc_1",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-01T10:00:00.000+00:00",
            "$collectionId": "banks",
            "$databaseId": "main",
            "$permissions": [],
            "userId": "user_1",
            "bankId": "item_1"
        }))
        .expect("dto");
        let document = dto.into_domain().expect("document");
        assert_eq!(document.id().as_str(), "doc_1");
        assert_eq!(document.created_at().to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(document.fields().len(), 2);
        assert_eq!(document.fields().get("bankId"), Some(&json!("item_1")));
    }

    #[test]
    fn document_without_created_at_is_rejected() {
        let dto: DocumentDto = serde_json::from_value(json!({"$id": "doc_1"})).expect("dto");
        let err = dto.into_domain().expect_err("missing timestamp");
        assert!(err.contains("$createdAt"));
    }

    #[test]
    fn queries_use_equal_method() {
        let query = encode_query(&EqualityFilter::equal("userId", "user_1")).expect("query");
        let value: Value = serde_json::from_str(&query).expect("json");
        assert_eq!(
            value,
            json!({"method": "equal", "attribute": "userId", "values": ["user_1"]})
        );
    }

    #[test]
    fn session_without_secret_is_rejected() {
        let dto: SessionDto = serde_json::from_value(json!({"userId": "user_1", "secret": ""}))
            .expect("dto");
        assert!(dto.into_domain().is_err());
    }
}
