//! Opaque credential handles.
//!
//! Tokens entered by the user are wrapped once into a [`Credential`] and then
//! shared by reference with the clients that need them. The secret itself is
//! only revealed at the point where a request header is built.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// A shared handle to an API token.
///
/// Cloning the handle does not copy the secret. `Debug` output is redacted.
#[derive(Clone)]
pub struct Credential(Arc<SecretString>);

impl Credential {
    /// Wraps a token into a credential handle.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(token.into())))
    }

    /// Builds a credential from user input, treating blank input as absent.
    #[must_use]
    pub fn from_input(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self::new(token))
        }
    }

    /// Reveals the raw token for building an authorization header.
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
