//! User-supplied identifiers and credentials.

use super::error::MigrationError;
use crate::credential::Credential;
use crate::issue::{IssueLocator, RepoLocator};

/// Identifies the issue to migrate.
#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Issue number as typed by the user.
    pub issue_number: String,

    /// Optional for reading, required for closing.
    pub credential: Option<Credential>,
}

/// Identifies where the migrated issue is created.
#[derive(Debug, Clone, Default)]
pub struct TargetInput {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Required; creating an issue needs write access.
    pub credential: Option<Credential>,
}

/// Everything the user entered for one migration.
#[derive(Debug, Clone, Default)]
pub struct MigrationInput {
    pub source: SourceInput,
    pub target: TargetInput,
}

impl SourceInput {
    /// Validates the identifiers and returns the issue they point at.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] for a blank or malformed field.
    pub fn locator(&self) -> Result<IssueLocator, MigrationError> {
        let owner = validate_segment("source owner", &self.owner)?;
        let repo = validate_segment("source repository", &self.repo)?;

        let raw_number = self.issue_number.trim();
        if raw_number.is_empty() {
            return Err(MigrationError::validation("issue number", "is required"));
        }
        let digits = raw_number.strip_prefix('#').unwrap_or(raw_number);
        let number = match digits.parse::<u64>() {
            Ok(number) if number > 0 && digits.starts_with(|c: char| c.is_ascii_digit()) => {
                number
            }
            _ => {
                return Err(MigrationError::validation(
                    "issue number",
                    "must be a positive whole number",
                ))
            }
        };

        Ok(IssueLocator {
            owner,
            repo,
            number,
        })
    }
}

impl TargetInput {
    /// Validates the identifiers and the mandatory credential.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] for a blank or malformed field,
    /// or a missing credential.
    pub fn locator(&self) -> Result<(RepoLocator, Credential), MigrationError> {
        let owner = validate_segment("target owner", &self.owner)?;
        let repo = validate_segment("target repository", &self.repo)?;
        let credential = self
            .credential
            .clone()
            .ok_or_else(|| MigrationError::validation("target token", "is required"))?;

        Ok((RepoLocator { owner, repo }, credential))
    }
}

/// Checks a single URL path segment such as an owner or repository name.
fn validate_segment(field: &'static str, value: &str) -> Result<String, MigrationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MigrationError::validation(field, "is required"));
    }
    if value == "." || value == ".." {
        return Err(MigrationError::validation(field, "must be a name, not a path"));
    }
    if value.contains(['/', '\\', '?', '#']) || value.chars().any(char::is_whitespace) {
        return Err(MigrationError::validation(
            field,
            "must not contain whitespace, slashes, '?' or '#'",
        ));
    }
    Ok(value.to_string())
}
