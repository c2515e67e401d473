#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod credential;
pub mod issue;
pub mod source;
pub mod target;
pub mod templates;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{ConfigError, MigratorConfig, ServiceConfig};
pub use credential::Credential;
pub use issue::{IssueLocator, NewIssue, RepoLocator, SourceIssue, TargetIssue};
pub use source::{GitHubClient, SourceError, SourceTracker};
pub use target::{ForgejoClient, TargetError, TargetTracker};
pub use templates::{
    build_new_issue, generate_migrated_body, generate_migration_comment,
    generate_provenance_footer,
};
pub use workflow::{
    Action, FailureKind, LastError, MigrationController, MigrationError, MigrationInput,
    MigrationState, Phase, SourceInput, TargetInput,
};
