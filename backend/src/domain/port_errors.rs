//! Translation of driven-port errors into domain [`Error`] values.
//!
//! Provider refusals become `unprocessable`, reachability problems become
//! `service_unavailable`, and malformed payloads or store faults become
//! `internal_error`.

use crate::domain::Error;
use crate::domain::ports::{AuthError, BankLinkError, PersistenceError, ProcessorError};

pub(crate) fn map_auth_error(error: AuthError) -> Error {
    match error {
        AuthError::InvalidCredentials => Error::unauthorized("invalid email or password"),
        AuthError::AlreadyRegistered => {
            Error::conflict("an account with this email already exists")
        }
        AuthError::Rejected { message } => {
            Error::unprocessable(format!("identity backend rejected the request: {message}"))
        }
        AuthError::Transport { message } | AuthError::Timeout { message } => {
            Error::service_unavailable(format!("identity backend unavailable: {message}"))
        }
        AuthError::Decode { message } => {
            Error::internal(format!("identity backend response invalid: {message}"))
        }
    }
}

pub(crate) fn map_bank_link_error(error: BankLinkError) -> Error {
    match error {
        BankLinkError::Rejected { message } => {
            Error::unprocessable(format!("bank-link provider rejected the request: {message}"))
        }
        BankLinkError::RateLimited { message }
        | BankLinkError::Transport { message }
        | BankLinkError::Timeout { message } => {
            Error::service_unavailable(format!("bank-link provider unavailable: {message}"))
        }
        BankLinkError::Decode { message } => {
            Error::internal(format!("bank-link provider response invalid: {message}"))
        }
    }
}

pub(crate) fn map_processor_error(error: ProcessorError) -> Error {
    match error {
        ProcessorError::Rejected { message } => {
            Error::unprocessable(format!("payment processor rejected the request: {message}"))
        }
        ProcessorError::Transport { message } | ProcessorError::Timeout { message } => {
            Error::service_unavailable(format!("payment processor unavailable: {message}"))
        }
        ProcessorError::Unauthorized { message } => {
            Error::internal(format!("payment processor refused credentials: {message}"))
        }
        ProcessorError::Decode { message } => {
            Error::internal(format!("payment processor response invalid: {message}"))
        }
    }
}

pub(crate) fn map_persistence_error(error: PersistenceError) -> Error {
    match error {
        PersistenceError::Transport { message } | PersistenceError::Timeout { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        PersistenceError::Rejected { message } => {
            Error::internal(format!("document store rejected the request: {message}"))
        }
        PersistenceError::Decode { message } => {
            Error::internal(format!("document store returned invalid data: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::invalid_credentials(), ErrorCode::Unauthorized)]
    #[case(AuthError::already_registered(), ErrorCode::Conflict)]
    #[case(AuthError::rejected("weak password"), ErrorCode::Unprocessable)]
    #[case(AuthError::timeout("30s"), ErrorCode::ServiceUnavailable)]
    #[case(AuthError::decode("missing $id"), ErrorCode::InternalError)]
    fn auth_errors(#[case] error: AuthError, #[case] expected: ErrorCode) {
        assert_eq!(map_auth_error(error).code(), expected);
    }

    #[rstest]
    #[case(BankLinkError::rejected("INVALID_PUBLIC_TOKEN"), ErrorCode::Unprocessable)]
    #[case(BankLinkError::rate_limited("RATE_LIMIT_EXCEEDED"), ErrorCode::ServiceUnavailable)]
    #[case(BankLinkError::transport("connection reset"), ErrorCode::ServiceUnavailable)]
    #[case(BankLinkError::decode("no link_token"), ErrorCode::InternalError)]
    fn bank_link_errors(#[case] error: BankLinkError, #[case] expected: ErrorCode) {
        assert_eq!(map_bank_link_error(error).code(), expected);
    }

    #[rstest]
    #[case(ProcessorError::rejected("ValidationError"), ErrorCode::Unprocessable)]
    #[case(ProcessorError::unauthorized("invalid client"), ErrorCode::InternalError)]
    #[case(ProcessorError::timeout("30s"), ErrorCode::ServiceUnavailable)]
    fn processor_errors(#[case] error: ProcessorError, #[case] expected: ErrorCode) {
        assert_eq!(map_processor_error(error).code(), expected);
    }

    #[rstest]
    #[case(PersistenceError::transport("dns"), ErrorCode::ServiceUnavailable)]
    #[case(PersistenceError::rejected("missing attribute"), ErrorCode::InternalError)]
    #[case(PersistenceError::decode("bad shape"), ErrorCode::InternalError)]
    fn persistence_errors(#[case] error: PersistenceError, #[case] expected: ErrorCode) {
        assert_eq!(map_persistence_error(error).code(), expected);
    }
}
