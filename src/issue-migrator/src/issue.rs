//! Issue records carried between migration steps.

use serde::Serialize;
use std::fmt;

/// Identifies a single issue on the source service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLocator {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Issue number within the repository.
    pub number: u64,
}

impl fmt::Display for IssueLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Identifies a repository on the target service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// An issue as read from the source service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceIssue {
    /// Service-wide issue identifier.
    pub id: u64,

    /// Issue number within its repository.
    pub number: u64,

    /// Issue title.
    pub title: String,

    /// Issue body. Empty when the source has no body.
    pub body: String,

    /// Label names, in the order the source returned them.
    pub labels: Vec<String>,

    /// Login of the user who opened the issue.
    pub author_login: String,

    /// Profile page of the user who opened the issue.
    pub author_profile_url: String,
}

/// Request to create an issue on the target service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,

    /// Issue body, including the provenance footer.
    pub body: String,

    /// Label names.
    pub labels: Vec<String>,
}

/// An issue created on the target service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetIssue {
    /// Service-wide issue identifier.
    pub id: u64,

    /// Issue number within its repository.
    pub number: u64,

    /// Web URL of the created issue.
    pub url: String,
}
