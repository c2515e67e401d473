//! Target client error types.

use thiserror::Error;

/// Errors that can occur while creating the issue on the target service.
#[derive(Debug, Error)]
pub enum TargetError {
    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential cannot be sent as a header value.
    #[error("Credential contains characters that are not allowed in a header")]
    InvalidCredential,

    /// The service answered with a non-success status.
    #[error("Request rejected with HTTP {status}{}", message_suffix(.message))]
    Rejected {
        status: u16,
        /// The `message` field of the error payload, when there was one.
        message: Option<String>,
    },
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl TargetError {
    /// Returns the error text supplied by the remote service, if any.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
