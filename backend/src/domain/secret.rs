//! Secret-bearing value types.
//!
//! Credentials are kept in zeroizing buffers so they are wiped on drop, and
//! their `Debug` output never reveals the content. None of these types
//! implement `Serialize`; adapters must call `expose` explicitly at the point
//! where a secret leaves the process.

use std::fmt;

use zeroize::Zeroizing;

/// Raised when a secret is constructed from blank input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must not be empty")]
pub struct EmptySecretError {
    kind: &'static str,
}

impl EmptySecretError {
    /// Which kind of secret was blank.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! secret_value {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Wrap a secret, rejecting empty input. Whitespace is preserved.
            pub fn new(value: impl Into<String>) -> Result<Self, EmptySecretError> {
                let value = Zeroizing::new(value.into());
                if value.is_empty() {
                    return Err(EmptySecretError { kind: $kind });
                }
                Ok(Self(value))
            }

            /// Reveal the secret for transmission to an external service.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

secret_value!(
    /// Durable bank-link access credential for one item.
    AccessToken,
    "access token"
);

secret_value!(
    /// Single-use token returned by the bank-link client flow.
    PublicToken,
    "public token"
);

secret_value!(
    /// Processor token binding one external account to the payment processor.
    ProcessorToken,
    "processor token"
);

secret_value!(
    /// Identity-backend session secret.
    SessionSecret,
    "session secret"
);

secret_value!(
    /// Account password supplied at sign-up or sign-in.
    Password,
    "password"
);

secret_value!(
    /// Social security number forwarded to the payment processor at sign-up.
    Ssn,
    "ssn"
);
