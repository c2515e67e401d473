//! Source client error types.

use thiserror::Error;

/// Errors that can occur while talking to the source service.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The service answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// GitHub API error that did not carry a response status.
    #[error("GitHub API error: {0}")]
    GitHubError(octocrab::Error),
}

impl From<octocrab::Error> for SourceError {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => Self::Status {
                status: source.status_code.as_u16(),
                message: source.message.clone(),
            },
            other => Self::GitHubError(other),
        }
    }
}

impl SourceError {
    /// Returns the HTTP status when the service rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::GitHubError(_) => None,
        }
    }
}
