//! Dwolla request and response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::ports::NewCustomer;

/// Media type Dwolla requires on requests and responses.
pub(super) const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";

const PERSONAL_CUSTOMER: &str = "personal";

#[derive(Debug, Deserialize)]
pub(super) struct TokenDto {
    pub(super) access_token: String,
    #[serde(default = "default_expires_in")]
    pub(super) expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomerBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    #[serde(rename = "type")]
    customer_type: &'static str,
    address1: &'a str,
    city: &'a str,
    state: &'a str,
    postal_code: &'a str,
    date_of_birth: String,
    ssn: &'a str,
}

impl<'a> CustomerBody<'a> {
    pub(super) fn from_domain(customer: &'a NewCustomer) -> Self {
        Self {
            first_name: customer.name.first(),
            last_name: customer.name.last(),
            email: customer.email.as_str(),
            customer_type: PERSONAL_CUSTOMER,
            address1: customer.address.address1(),
            city: customer.address.city(),
            state: customer.address.state(),
            postal_code: customer.address.postal_code(),
            date_of_birth: customer.date_of_birth.format("%Y-%m-%d").to_string(),
            ssn: customer.ssn.expose(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FundingSourceBody<'a> {
    pub(super) plaid_token: &'a str,
    pub(super) name: &'a str,
}

/// Dwolla's error envelope.
#[derive(Debug, Deserialize)]
pub(super) struct DwollaErrorDto {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "_embedded")]
    embedded: Option<EmbeddedErrorsDto>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedErrorsDto {
    #[serde(default)]
    errors: Vec<FieldErrorDto>,
}

#[derive(Debug, Deserialize)]
struct FieldErrorDto {
    #[serde(default)]
    message: String,
}

impl DwollaErrorDto {
    /// `code: message` followed by any field-level messages.
    pub(super) fn describe(&self) -> String {
        let details = self
            .embedded
            .iter()
            .flat_map(|embedded| embedded.errors.iter())
            .map(|error| error.message.as_str())
            .filter(|message| !message.is_empty())
            .collect::<Vec<_>>();
        if details.is_empty() {
            format!("{}: {}", self.code, self.message)
        } else {
            format!("{}: {} ({})", self.code, self.message, details.join("; "))
        }
    }
}
