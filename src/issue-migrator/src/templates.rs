//! Text written to the two services during a migration.
//!
//! The provenance footer and the cross-reference comment have fixed formats so
//! that migrated issues can be recognised on both sides.

use crate::issue::{NewIssue, SourceIssue};

/// Separator between the original body and the provenance footer.
pub const PROVENANCE_SEPARATOR: &str = "---";

/// Generates the body of the migrated issue.
///
/// Format: "{body}\n\n---\n**Migrated from {source}** | Originally created by [@{login}]({profile}) on {source}"
#[must_use]
pub fn generate_migrated_body(issue: &SourceIssue, source_service: &str) -> String {
    format!(
        "{}\n\n{}\n{}",
        issue.body,
        PROVENANCE_SEPARATOR,
        generate_provenance_footer(issue, source_service)
    )
}

/// Generates the provenance footer line on its own.
#[must_use]
pub fn generate_provenance_footer(issue: &SourceIssue, source_service: &str) -> String {
    format!(
        "**Migrated from {source_service}** | Originally created by [@{}]({}) on {source_service}",
        issue.author_login, issue.author_profile_url
    )
}

/// Generates the comment left on the source issue once it is closed.
///
/// Format: "This issue has been migrated to {target}: {url}"
#[must_use]
pub fn generate_migration_comment(target_service: &str, target_url: &str) -> String {
    format!("This issue has been migrated to {target_service}: {target_url}")
}

/// Builds the create request for the target service.
///
/// Labels are carried over by name only, in source order.
#[must_use]
pub fn build_new_issue(issue: &SourceIssue, source_service: &str) -> NewIssue {
    NewIssue {
        title: issue.title.clone(),
        body: generate_migrated_body(issue, source_service),
        labels: issue.labels.clone(),
    }
}
