//! Linked bank accounts.
//!
//! A [`LinkedBankAccount`] is created exactly once per successful onboarding
//! run and never mutated afterwards. It always carries a funding-source URL;
//! records without one are never built.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ports::{Document, DocumentFields, PersistenceError, encode_fields};
use super::{
    AccessToken, DocumentId, ExternalAccountId, FundingSourceUrl, ItemId, ShareableId, UserId,
};

/// Field name of the owner reference in bank-account documents.
pub const OWNER_FIELD: &str = "userId";

/// Short-lived token that opens the client-side bank-linking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkToken(String);

impl LinkToken {
    /// Wrap a provider-issued link token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a linked bank account prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccountRecord {
    /// Owner of the account.
    pub owner: UserId,
    /// Bank-link item the account belongs to.
    pub item_id: ItemId,
    /// Provider account identifier.
    pub account_id: ExternalAccountId,
    /// Durable access credential for the item.
    pub access_token: AccessToken,
    /// Processor funding source created for the account.
    pub funding_source: FundingSourceUrl,
    /// Obfuscated account identifier safe to share.
    pub shareable_id: ShareableId,
}

impl BankAccountRecord {
    /// Flatten the record into bank-account document fields.
    pub fn to_document_fields(&self) -> Result<DocumentFields, PersistenceError> {
        encode_fields(&BankAccountDocument::from(self))
    }
}

/// A persisted linked bank account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedBankAccount {
    id: DocumentId,
    created_at: DateTime<Utc>,
    record: BankAccountRecord,
}

impl LinkedBankAccount {
    /// Combine store metadata with the persisted fields.
    pub fn new(id: DocumentId, created_at: DateTime<Utc>, record: BankAccountRecord) -> Self {
        Self {
            id,
            created_at,
            record,
        }
    }

    /// Rebuild an account from a bank-account document.
    pub fn from_document(document: &Document) -> Result<Self, PersistenceError> {
        let record = document
            .decode::<BankAccountDocument>()?
            .try_into_record()
            .map_err(|message| {
                PersistenceError::decode(format!(
                    "bank account document {}: {message}",
                    document.id()
                ))
            })?;
        Ok(Self::new(
            document.id().clone(),
            document.created_at(),
            record,
        ))
    }

    /// Document identifier.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Creation time assigned by the store.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Persisted fields.
    pub fn record(&self) -> &BankAccountRecord {
        &self.record
    }

    /// Owner of the account.
    pub fn owner(&self) -> &UserId {
        &self.record.owner
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankAccountDocument {
    user_id: UserId,
    bank_id: ItemId,
    account_id: ExternalAccountId,
    access_token: String,
    funding_source_url: FundingSourceUrl,
    sharable_id: String,
}

impl From<&BankAccountRecord> for BankAccountDocument {
    fn from(record: &BankAccountRecord) -> Self {
        Self {
            user_id: record.owner.clone(),
            bank_id: record.item_id.clone(),
            account_id: record.account_id.clone(),
            access_token: record.access_token.expose().to_owned(),
            funding_source_url: record.funding_source.clone(),
            sharable_id: record.shareable_id.as_str().to_owned(),
        }
    }
}

impl BankAccountDocument {
    fn try_into_record(self) -> Result<BankAccountRecord, String> {
        let access_token = AccessToken::new(self.access_token).map_err(|err| err.to_string())?;
        Ok(BankAccountRecord {
            owner: self.user_id,
            item_id: self.bank_id,
            account_id: self.account_id,
            access_token,
            funding_source: self.funding_source_url,
            shareable_id: ShareableId::from_encoded(self.sharable_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn record() -> BankAccountRecord {
        let account_id = ExternalAccountId::new("acc_1").expect("account id");
        BankAccountRecord {
            owner: UserId::new("user_1").expect("user id"),
            item_id: ItemId::new("item_1").expect("item id"),
            shareable_id: ShareableId::encode(&account_id),
            account_id,
            access_token: AccessToken::new("access-sandbox-1").expect("token"),
            funding_source: FundingSourceUrl::parse(
                "https://api-sandbox.dwolla.com/funding-sources/fs-1",
            )
            .expect("url"),
        }
    }

    #[rstest]
    fn document_fields_use_collection_schema_names(record: BankAccountRecord) {
        let fields = record.to_document_fields().expect("encode");
        assert_eq!(
            Value::Object(fields),
            json!({
                "userId": "user_1",
                "bankId": "item_1",
                "accountId": "acc_1",
                "accessToken": "access-sandbox-1",
                "fundingSourceUrl": "https://api-sandbox.dwolla.com/funding-sources/fs-1",
                "sharableId": "YWNjXzE",
            })
        );
    }

    #[rstest]
    fn from_document_restores_record_and_metadata(record: BankAccountRecord) {
        let created_at = DateTime::<Utc>::UNIX_EPOCH;
        let document = Document::new(
            DocumentId::new("doc_1").expect("document id"),
            created_at,
            record.to_document_fields().expect("encode"),
        );

        let account = LinkedBankAccount::from_document(&document).expect("decode");
        assert_eq!(account.id().as_str(), "doc_1");
        assert_eq!(account.created_at(), created_at);
        assert_eq!(account.record(), &record);
    }

    #[rstest]
    fn document_without_funding_source_is_rejected(record: BankAccountRecord) {
        let mut fields = record.to_document_fields().expect("encode");
        fields.remove("fundingSourceUrl");
        let document = Document::new(
            DocumentId::new("doc_1").expect("document id"),
            DateTime::<Utc>::UNIX_EPOCH,
            fields,
        );
        assert!(matches!(
            LinkedBankAccount::from_document(&document),
            Err(PersistenceError::Decode { .. })
        ));
    }
}
