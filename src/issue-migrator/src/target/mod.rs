//! Target issue client.
//!
//! Creates the migrated issue on a Forgejo or Gitea instance such as Codeberg.

mod error;

pub use error::TargetError;

use crate::config::ServiceConfig;
use crate::credential::Credential;
use crate::issue::{NewIssue, RepoLocator, TargetIssue};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Operations the workflow needs from the service issues are migrated to.
#[async_trait]
pub trait TargetTracker: Send + Sync {
    /// Display name of the service, used in the cross-reference comment.
    fn service_name(&self) -> &str;

    /// Creates an issue and returns its identifiers.
    async fn create_issue(
        &self,
        repo: &RepoLocator,
        credential: &Credential,
        issue: &NewIssue,
    ) -> Result<TargetIssue, TargetError>;
}

#[derive(Debug, Deserialize)]
struct CreatedIssuePayload {
    id: u64,
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

/// Forgejo/Gitea REST API client for the target side of a migration.
#[derive(Debug, Clone)]
pub struct ForgejoClient {
    name: String,
    api_base: String,
    http: reqwest::Client,
}

impl ForgejoClient {
    /// Creates a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Http`] if the HTTP client cannot be built.
    pub fn new(service: &ServiceConfig, timeout: Duration) -> Result<Self, TargetError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("issue-migrator/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            name: service.name.clone(),
            api_base: service.api_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

fn authorization(credential: &Credential) -> Result<HeaderValue, TargetError> {
    let mut value = HeaderValue::from_str(&format!("token {}", credential.expose()))
        .map_err(|_| TargetError::InvalidCredential)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Extracts the `message` field from an error response body.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.message)
        .filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl TargetTracker for ForgejoClient {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn create_issue(
        &self,
        repo: &RepoLocator,
        credential: &Credential,
        issue: &NewIssue,
    ) -> Result<TargetIssue, TargetError> {
        let url = format!("{}/repos/{}/{}/issues", self.api_base, repo.owner, repo.repo);
        debug!(url = %url, labels = issue.labels.len(), "Creating issue");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization(credential)?)
            .header(ACCEPT, "application/json")
            .json(issue)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TargetError::Rejected {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        let created: CreatedIssuePayload = response.json().await?;
        Ok(TargetIssue {
            id: created.id,
            number: created.number,
            url: created.html_url,
        })
    }
}
