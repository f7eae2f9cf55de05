//! Authentication primitives such as sign-in credentials and sign-up details.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::NaiveDate;

use super::secret::{Password, Ssn};
use super::user::{DisplayName, PostalAddress, UserValidationError};

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Email was blank or not of the form `local@domain`.
    #[error("email must be of the form local@domain")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Social security number was blank.
    #[error("ssn must not be empty")]
    EmptySsn,
    /// Date of birth was not an ISO-8601 calendar date.
    #[error("date of birth must be formatted as YYYY-MM-DD")]
    InvalidDateOfBirth,
    /// Name or address fields failed validation.
    #[error(transparent)]
    Profile(#[from] UserValidationError),
}

/// Email address used as the identity-backend login.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace.
/// - Contains exactly one `@` with non-empty local and domain parts.
///
/// # Examples
/// ```
/// use bankdash::domain::Email;
///
/// let email = Email::new("  ada@example.com ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.com");
/// assert!(Email::new("ada.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        let trimmed = raw.trim();
        let mut parts = trimmed.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !valid {
            return Err(AuthValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated sign-in credentials.
///
/// The password is required to be non-empty but retains caller-provided
/// whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    email: Email,
    password: Password,
}

impl SignInCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password).map_err(|_| AuthValidationError::EmptyPassword)?,
        })
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Raw sign-up form values, prior to validation.
#[derive(Debug, Clone, Copy)]
pub struct SignUpForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub address1: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    /// ISO-8601 calendar date, `YYYY-MM-DD`.
    pub date_of_birth: &'a str,
    pub ssn: &'a str,
}

/// Everything needed to register an identity and a processor customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpDetails {
    credentials: SignInCredentials,
    name: DisplayName,
    address: PostalAddress,
    date_of_birth: NaiveDate,
    ssn: Ssn,
}

impl SignUpDetails {
    /// Validate a raw sign-up form.
    ///
    /// # Examples
    /// ```
    /// use bankdash::domain::{SignUpDetails, SignUpForm};
    ///
    /// let details = SignUpDetails::try_from_form(SignUpForm {
    ///     email: "ada@example.com",
    ///     password: "hunter22",
    ///     first_name: "Ada",
    ///     last_name: "Lovelace",
    ///     address1: "1 Analytical Way",
    ///     city: "London",
    ///     state: "NY",
    ///     postal_code: "10001",
    ///     date_of_birth: "1990-12-10",
    ///     ssn: "1234",
    /// })
    /// .unwrap();
    /// assert_eq!(details.name().full_name(), "Ada Lovelace");
    /// ```
    pub fn try_from_form(form: SignUpForm<'_>) -> Result<Self, AuthValidationError> {
        let credentials = SignInCredentials::try_from_parts(form.email, form.password)?;
        let name = DisplayName::new(form.first_name, form.last_name)?;
        let address = PostalAddress::new(form.address1, form.city, form.state, form.postal_code)?;
        let date_of_birth = NaiveDate::parse_from_str(form.date_of_birth.trim(), "%Y-%m-%d")
            .map_err(|_| AuthValidationError::InvalidDateOfBirth)?;
        let ssn = Ssn::new(form.ssn.trim()).map_err(|_| AuthValidationError::EmptySsn)?;
        Ok(Self {
            credentials,
            name,
            address,
            date_of_birth,
            ssn,
        })
    }

    /// Credentials for the new identity.
    pub fn credentials(&self) -> &SignInCredentials {
        &self.credentials
    }

    /// Legal name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Postal address sent to the processor.
    pub fn address(&self) -> &PostalAddress {
        &self.address
    }

    /// Date of birth sent to the processor.
    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    /// Social security number sent to the processor only.
    pub fn ssn(&self) -> &Ssn {
        &self.ssn
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn form() -> SignUpForm<'static> {
        SignUpForm {
            email: "ada@example.com",
            password: "hunter22",
            first_name: "Ada",
            last_name: "Lovelace",
            address1: "1 Analytical Way",
            city: "London",
            state: "NY",
            postal_code: "10001",
            date_of_birth: "1990-12-10",
            ssn: "1234",
        }
    }

    #[rstest]
    #[case("", "pw", AuthValidationError::InvalidEmail)]
    #[case("   ", "pw", AuthValidationError::InvalidEmail)]
    #[case("a@b@c", "pw", AuthValidationError::InvalidEmail)]
    #[case("@example.com", "pw", AuthValidationError::InvalidEmail)]
    #[case("ada@example.com", "", AuthValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = SignInCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_credentials_trim_email_but_not_password() {
        let creds = SignInCredentials::try_from_parts("  ada@example.com  ", " secret ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.email().as_str(), "ada@example.com");
        assert_eq!(creds.password().expose(), " secret ");
    }

    #[rstest]
    fn sign_up_form_parses_date_of_birth() {
        let details = SignUpDetails::try_from_form(form()).expect("valid form");
        assert_eq!(
            details.date_of_birth(),
            NaiveDate::from_ymd_opt(1990, 12, 10).expect("valid date")
        );
        assert_eq!(details.ssn().expose(), "1234");
    }

    #[rstest]
    #[case::bad_date(SignUpForm { date_of_birth: "10/12/1990", ..form() }, AuthValidationError::InvalidDateOfBirth)]
    #[case::blank_ssn(SignUpForm { ssn: "  ", ..form() }, AuthValidationError::EmptySsn)]
    #[case::blank_name(
        SignUpForm { first_name: " ", ..form() },
        AuthValidationError::Profile(UserValidationError::EmptyFirstName)
    )]
    #[case::blank_city(
        SignUpForm { city: "", ..form() },
        AuthValidationError::Profile(UserValidationError::EmptyAddressField { field: "city" })
    )]
    fn sign_up_form_rejects_invalid_fields(
        #[case] form: SignUpForm<'static>,
        #[case] expected: AuthValidationError,
    ) {
        let err = SignUpDetails::try_from_form(form).expect_err("invalid form");
        assert_eq!(err, expected);
    }
}
