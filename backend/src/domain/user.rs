//! User data model.
//!
//! A [`User`] is created once at sign-up and never mutated. Its profile is
//! stored as a flat document in the users collection; the field names of
//! that document are fixed by the existing collection schema.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ports::{Document, DocumentFields, PersistenceError, encode_fields};
use super::{CustomerUrl, Email, ResourceUrlError, UserId};

/// Validation errors returned by the profile constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// First name was blank.
    #[error("first name must not be empty")]
    EmptyFirstName,
    /// Last name was blank.
    #[error("last name must not be empty")]
    EmptyLastName,
    /// A postal address field was blank.
    #[error("{field} must not be empty")]
    EmptyAddressField {
        /// Name of the blank field.
        field: &'static str,
    },
}

/// Legal first and last name.
///
/// # Examples
/// ```
/// use bankdash::domain::DisplayName;
///
/// let name = DisplayName::new(" Ada ", "Lovelace").unwrap();
/// assert_eq!(name.first(), "Ada");
/// assert_eq!(name.full_name(), "Ada Lovelace");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    first: String,
    last: String,
}

impl DisplayName {
    /// Validate and construct a name; both parts are trimmed.
    pub fn new(first: &str, last: &str) -> Result<Self, UserValidationError> {
        let first = first.trim();
        if first.is_empty() {
            return Err(UserValidationError::EmptyFirstName);
        }
        let last = last.trim();
        if last.is_empty() {
            return Err(UserValidationError::EmptyLastName);
        }
        Ok(Self {
            first: first.to_owned(),
            last: last.to_owned(),
        })
    }

    /// First name.
    pub fn first(&self) -> &str {
        self.first.as_str()
    }

    /// Last name.
    pub fn last(&self) -> &str {
        self.last.as_str()
    }

    /// `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// US postal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    address1: String,
    city: String,
    state: String,
    postal_code: String,
}

impl PostalAddress {
    /// Validate and construct an address; every field is trimmed and required.
    pub fn new(
        address1: &str,
        city: &str,
        state: &str,
        postal_code: &str,
    ) -> Result<Self, UserValidationError> {
        fn required(field: &'static str, value: &str) -> Result<String, UserValidationError> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(UserValidationError::EmptyAddressField { field });
            }
            Ok(trimmed.to_owned())
        }

        Ok(Self {
            address1: required("address1", address1)?,
            city: required("city", city)?,
            state: required("state", state)?,
            postal_code: required("postal code", postal_code)?,
        })
    }

    /// Street line.
    pub fn address1(&self) -> &str {
        self.address1.as_str()
    }

    /// City.
    pub fn city(&self) -> &str {
        self.city.as_str()
    }

    /// Two-letter state code.
    pub fn state(&self) -> &str {
        self.state.as_str()
    }

    /// ZIP code.
    pub fn postal_code(&self) -> &str {
        self.postal_code.as_str()
    }
}

/// Processor customer reference: the customer URL and the identifier taken
/// from its final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRef {
    url: CustomerUrl,
    id: String,
}

impl CustomerRef {
    /// Derive the reference from a customer URL.
    pub fn from_url(url: CustomerUrl) -> Result<Self, ResourceUrlError> {
        let id = url.customer_id()?.to_owned();
        Ok(Self { url, id })
    }

    /// Customer URL.
    pub fn url(&self) -> &CustomerUrl {
        &self.url
    }

    /// Customer identifier.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Application user.
///
/// ## Invariants
/// - `customer.id` is the final path segment of `customer.url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    name: DisplayName,
    address: PostalAddress,
    date_of_birth: NaiveDate,
    customer: CustomerRef,
}

/// Components of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Identity-backend user identifier.
    pub id: UserId,
    /// Login email.
    pub email: Email,
    /// Legal name.
    pub name: DisplayName,
    /// Postal address given at sign-up.
    pub address: PostalAddress,
    /// Date of birth given at sign-up.
    pub date_of_birth: NaiveDate,
    /// Processor customer.
    pub customer: CustomerRef,
}

impl User {
    /// Build a user from validated components.
    pub fn new(profile: UserProfile) -> Self {
        let UserProfile {
            id,
            email,
            name,
            address,
            date_of_birth,
            customer,
        } = profile;
        Self {
            id,
            email,
            name,
            address,
            date_of_birth,
            customer,
        }
    }

    /// Identity-backend user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Legal name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Postal address.
    pub fn address(&self) -> &PostalAddress {
        &self.address
    }

    /// Date of birth.
    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    /// Processor customer reference.
    pub fn customer(&self) -> &CustomerRef {
        &self.customer
    }

    /// Flatten the profile into users-collection document fields.
    pub fn to_document_fields(&self) -> Result<DocumentFields, PersistenceError> {
        encode_fields(&UserDocument::from(self))
    }

    /// Rebuild a user from a users-collection document.
    pub fn from_document(document: &Document) -> Result<Self, PersistenceError> {
        document.decode::<UserDocument>()?.try_into_user().map_err(|message| {
            PersistenceError::decode(format!("user document {}: {message}", document.id()))
        })
    }
}

/// Field name of the owner reference in users documents.
pub const USER_ID_FIELD: &str = "userId";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    user_id: UserId,
    email: String,
    first_name: String,
    last_name: String,
    address1: String,
    city: String,
    state: String,
    postal_code: String,
    date_of_birth: NaiveDate,
    dwolla_customer_id: String,
    #[serde(rename = "dwollaCustomerURL")]
    dwolla_customer_url: CustomerUrl,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.as_str().to_owned(),
            first_name: user.name.first().to_owned(),
            last_name: user.name.last().to_owned(),
            address1: user.address.address1().to_owned(),
            city: user.address.city().to_owned(),
            state: user.address.state().to_owned(),
            postal_code: user.address.postal_code().to_owned(),
            date_of_birth: user.date_of_birth,
            dwolla_customer_id: user.customer.id().to_owned(),
            dwolla_customer_url: user.customer.url().clone(),
        }
    }
}

impl UserDocument {
    fn try_into_user(self) -> Result<User, String> {
        let email = Email::new(&self.email).map_err(|err| err.to_string())?;
        let name =
            DisplayName::new(&self.first_name, &self.last_name).map_err(|err| err.to_string())?;
        let address = PostalAddress::new(&self.address1, &self.city, &self.state, &self.postal_code)
            .map_err(|err| err.to_string())?;
        let customer = CustomerRef::from_url(self.dwolla_customer_url).map_err(|err| err.to_string())?;
        if customer.id() != self.dwolla_customer_id {
            return Err(format!(
                "customer id {} does not match customer url",
                self.dwolla_customer_id
            ));
        }
        Ok(User::new(UserProfile {
            id: self.user_id,
            email,
            name,
            address,
            date_of_birth: self.date_of_birth,
            customer,
        }))
    }
}
