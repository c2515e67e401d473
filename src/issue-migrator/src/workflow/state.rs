//! Migration state snapshot.

use super::error::LastError;
use super::input::MigrationInput;
use super::phase::{Action, Phase};
use crate::issue::{SourceIssue, TargetIssue};

/// Everything known about the current migration.
///
/// `source_issue` is present exactly when `phase >= Fetched`, and
/// `target_issue` exactly when `phase >= Created`.
#[derive(Debug, Clone, Default)]
pub struct MigrationState {
    /// Current stage.
    pub phase: Phase,

    /// Identifiers and credentials entered so far.
    pub input: MigrationInput,

    /// Issue read from the source service.
    pub source_issue: Option<SourceIssue>,

    /// Issue created on the target service.
    pub target_issue: Option<TargetIssue>,

    /// Failure of the most recent action, if it failed.
    pub last_error: Option<LastError>,

    /// Success message of the most recent action, if it succeeded.
    pub notice: Option<String>,

    /// Whether the source issue has already been closed. Set when closing
    /// succeeded but the comment did not, so a retry only posts the comment.
    pub source_closed: bool,
}

impl MigrationState {
    /// Returns the phase a failed action can be retried from.
    #[must_use]
    pub fn failed_at(&self) -> Option<Phase> {
        self.last_error.as_ref().map(|_| self.phase)
    }

    /// Returns true once the migration finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Returns the actions the controller will currently accept.
    ///
    /// Empty while a remote call is outstanding.
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        match self.phase {
            Phase::Idle => vec![Action::FetchSource, Action::Reset],
            Phase::Fetched => vec![Action::CreateTarget, Action::Back, Action::Reset],
            Phase::Created => vec![Action::CloseSource, Action::Reset],
            Phase::Closed => vec![Action::Reset],
            Phase::Fetching | Phase::Creating | Phase::Closing => Vec::new(),
        }
    }
}
