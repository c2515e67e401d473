//! Workflow error types.

use super::phase::{Action, Phase};
use crate::source::SourceError;
use crate::target::TargetError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by controller actions.
///
/// Step failures (`Fetch`, `Create`, `Close`, `CommentFailed`) and validation
/// failures are also recorded in the state snapshot. `InvalidTransition` and
/// `Busy` reject the call without touching state.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A required field is missing or malformed. No remote call was made.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The action is not available in the current phase.
    #[error("Cannot {action} while the migration is {phase}")]
    InvalidTransition { action: Action, phase: Phase },

    /// Another action is still waiting on a remote call.
    #[error("Another operation is already in progress")]
    Busy,

    /// Reading the source issue failed.
    #[error("Failed to fetch {service} issue: {source}")]
    Fetch {
        service: String,
        #[source]
        source: SourceError,
    },

    /// Creating the target issue failed.
    ///
    /// `message` is the remote service's own error text when it sent one.
    #[error("{message}")]
    Create {
        message: String,
        #[source]
        source: TargetError,
    },

    /// Closing the source issue failed. Nothing was changed remotely.
    #[error("Failed to close {service} issue: {source}")]
    Close {
        service: String,
        #[source]
        source: SourceError,
    },

    /// The source issue was closed but the cross-reference comment was not posted.
    #[error("{service} issue was closed, but the migration comment could not be posted: {source}")]
    CommentFailed {
        service: String,
        #[source]
        source: SourceError,
    },
}

/// Category of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input was rejected before any remote call.
    Validation,
    /// A remote call failed; nothing was changed by this step.
    Remote,
    /// The first half of a two-call step succeeded and the second failed.
    Partial,
}

/// The failure of the last action, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastError {
    /// Action that failed.
    pub action: Action,

    /// Failure category.
    pub kind: FailureKind,

    /// User-facing message.
    pub message: String,
}

impl MigrationError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns true if the error reports a partially completed step.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::CommentFailed { .. })
    }

    /// Returns the failure category, or `None` for rejected calls.
    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Validation { .. } => Some(FailureKind::Validation),
            Self::Fetch { .. } | Self::Create { .. } | Self::Close { .. } => {
                Some(FailureKind::Remote)
            }
            Self::CommentFailed { .. } => Some(FailureKind::Partial),
            Self::InvalidTransition { .. } | Self::Busy => None,
        }
    }

    /// Builds the record stored in the state snapshot.
    pub(crate) fn to_last_error(&self, action: Action) -> Option<LastError> {
        self.kind().map(|kind| LastError {
            action,
            kind,
            message: self.to_string(),
        })
    }
}
