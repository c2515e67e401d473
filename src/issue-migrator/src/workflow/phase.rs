//! Migration phases and user actions.

use serde::Serialize;
use std::fmt;

/// Stage of a migration.
///
/// Phases are ordered: a later phase implies every earlier step completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// Source issue is being read.
    Fetching,
    /// Source issue is held by the controller.
    Fetched,
    /// Target issue is being created.
    Creating,
    /// Target issue exists.
    Created,
    /// Source issue is being closed and commented on.
    Closing,
    /// Source issue is closed with a cross-reference.
    Closed,
}

impl Phase {
    /// Returns true once the migration is complete.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }

    /// Returns the phase as a string for display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the presentation layer can ask the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    FetchSource,
    CreateTarget,
    CloseSource,
    Back,
    Reset,
}

impl Action {
    /// Returns the action as a string for display.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchSource => "fetch-source",
            Self::CreateTarget => "create-target",
            Self::CloseSource => "close-source",
            Self::Back => "back",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
