//! Source issue client.
//!
//! Reads the issue being migrated and, once the copy exists, closes it and
//! leaves a cross-reference comment. The GitHub implementation talks to the
//! REST API through octocrab.

mod error;

pub use error::SourceError;

use crate::config::ServiceConfig;
use crate::credential::Credential;
use crate::issue::{IssueLocator, SourceIssue};
use async_trait::async_trait;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Operations the workflow needs from the service issues are migrated away from.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    /// Display name of the service, used in provenance text.
    fn service_name(&self) -> &str;

    /// Reads an issue. Works without a credential for public repositories.
    async fn fetch_issue(
        &self,
        issue: &IssueLocator,
        credential: Option<&Credential>,
    ) -> Result<SourceIssue, SourceError>;

    /// Closes an issue as "not planned".
    async fn close_issue(
        &self,
        issue: &IssueLocator,
        credential: &Credential,
    ) -> Result<(), SourceError>;

    /// Posts a comment on an issue.
    async fn post_comment(
        &self,
        issue: &IssueLocator,
        credential: &Credential,
        body: &str,
    ) -> Result<(), SourceError>;
}

/// State written when closing a migrated issue.
const CLOSED_STATE: &str = "closed";

/// Close reason that separates "moved elsewhere" from "completed" or "duplicate".
const NOT_PLANNED_REASON: &str = "not_planned";

/// Issue fields read from `GET /repos/{owner}/{repo}/issues/{number}`.
///
/// Requests go through octocrab's raw routes with these minimal payloads:
/// `models::issues::Issue` fails to deserialize when a host omits any of its
/// required fields, and only the fields below are needed.
#[derive(Debug, Deserialize)]
struct IssuePayload {
    id: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<LabelPayload>,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct CloseIssueRequest {
    state: &'static str,
    state_reason: &'static str,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// GitHub REST API client for the source side of a migration.
///
/// A fresh octocrab instance is built per call so that each request carries
/// exactly the credential it was given, or none at all.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    name: String,
    base_uri: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a client for the configured service.
    #[must_use]
    pub fn new(service: &ServiceConfig, timeout: Duration) -> Self {
        Self {
            name: service.name.clone(),
            base_uri: service.api_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn octocrab(&self, credential: Option<&Credential>) -> Result<Octocrab, SourceError> {
        let mut builder = Octocrab::builder()
            .base_uri(self.base_uri.as_str())?
            // Retries are user-initiated only
            .add_retry_config(RetryConfig::None)
            .set_connect_timeout(Some(self.timeout))
            .set_read_timeout(Some(self.timeout));

        if let Some(credential) = credential {
            builder = builder.personal_token(credential.expose().to_owned());
        }

        Ok(builder.build()?)
    }
}

fn issue_route(issue: &IssueLocator) -> String {
    format!("/repos/{}/{}/issues/{}", issue.owner, issue.repo, issue.number)
}

#[async_trait]
impl SourceTracker for GitHubClient {
    fn service_name(&self) -> &str {
        &self.name
    }

    async fn fetch_issue(
        &self,
        issue: &IssueLocator,
        credential: Option<&Credential>,
    ) -> Result<SourceIssue, SourceError> {
        let route = issue_route(issue);
        debug!(route = %route, authenticated = credential.is_some(), "Fetching issue");

        let payload: IssuePayload = self.octocrab(credential)?.get(&route, None::<&()>).await?;

        Ok(SourceIssue {
            id: payload.id,
            number: issue.number,
            title: payload.title,
            body: payload.body.unwrap_or_default(),
            labels: payload.labels.into_iter().map(|label| label.name).collect(),
            author_login: payload.user.login,
            author_profile_url: payload.user.html_url,
        })
    }

    async fn close_issue(
        &self,
        issue: &IssueLocator,
        credential: &Credential,
    ) -> Result<(), SourceError> {
        let route = issue_route(issue);
        debug!(route = %route, "Closing issue as not planned");

        let request = CloseIssueRequest {
            state: CLOSED_STATE,
            state_reason: NOT_PLANNED_REASON,
        };
        let _: serde_json::Value = self
            .octocrab(Some(credential))?
            .patch(&route, Some(&request))
            .await?;
        Ok(())
    }

    async fn post_comment(
        &self,
        issue: &IssueLocator,
        credential: &Credential,
        body: &str,
    ) -> Result<(), SourceError> {
        let route = format!("{}/comments", issue_route(issue));
        debug!(route = %route, "Posting comment");

        let _: serde_json::Value = self
            .octocrab(Some(credential))?
            .post(&route, Some(&CommentRequest { body }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::install_crypto_provider;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GitHubClient {
        install_crypto_provider();
        GitHubClient::new(
            &ServiceConfig {
                name: "GitHub".to_string(),
                api_url: server.base_url(),
            },
            Duration::from_secs(5),
        )
    }

    fn locator() -> IssueLocator {
        IssueLocator {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 42,
        }
    }

    #[tokio::test]
    async fn fetch_issue_maps_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/acme/widgets/issues/42");
                then.status(200).json_body(json!({
                    "id": 9001,
                    "number": 42,
                    "title": "Build fails on arm64",
                    "body": "See log.",
                    "labels": [
                        { "name": "bug", "color": "d73a4a", "description": "Something is broken" },
                        { "name": "arm64", "color": "ededed" }
                    ],
                    "user": { "login": "alice", "html_url": "https://github.com/alice" }
                }));
            })
            .await;

        let issue = client_for(&server)
            .fetch_issue(&locator(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(issue.id, 9001);
        assert_eq!(issue.number, 42);
        assert_eq!(issue.title, "Build fails on arm64");
        assert_eq!(issue.body, "See log.");
        assert_eq!(issue.labels, vec!["bug", "arm64"]);
        assert_eq!(issue.author_login, "alice");
        assert_eq!(issue.author_profile_url, "https://github.com/alice");
    }

    #[tokio::test]
    async fn fetch_issue_treats_null_body_as_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/acme/widgets/issues/42");
                then.status(200).json_body(json!({
                    "id": 1,
                    "title": "No description",
                    "body": null,
                    "labels": [],
                    "user": { "login": "bob", "html_url": "https://github.com/bob" }
                }));
            })
            .await;

        let issue = client_for(&server)
            .fetch_issue(&locator(), None)
            .await
            .unwrap();

        assert_eq!(issue.body, "");
        assert!(issue.labels.is_empty());
    }

    #[tokio::test]
    async fn fetch_issue_sends_bearer_credential_when_given() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/acme/widgets/issues/42")
                    .header("authorization", "Bearer ghp_test");
                then.status(200).json_body(json!({
                    "id": 1,
                    "title": "Private",
                    "body": "",
                    "labels": [],
                    "user": { "login": "bob", "html_url": "https://github.com/bob" }
                }));
            })
            .await;

        let credential = Credential::new("ghp_test");
        client_for(&server)
            .fetch_issue(&locator(), Some(&credential))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_issue_reports_status_on_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/acme/widgets/issues/42");
                then.status(404).json_body(json!({
                    "message": "Not Found",
                    "documentation_url": "https://docs.github.com/rest"
                }));
            })
            .await;

        let error = client_for(&server)
            .fetch_issue(&locator(), None)
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(404));
        assert!(error.to_string().contains("Not Found"));
    }

    #[tokio::test]
    async fn close_issue_sends_not_planned_reason() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/repos/acme/widgets/issues/42")
                    .header("authorization", "Bearer ghp_test")
                    .json_body(json!({ "state": "closed", "state_reason": "not_planned" }));
                then.status(200).json_body(json!({ "id": 9001, "state": "closed" }));
            })
            .await;

        client_for(&server)
            .close_issue(&locator(), &Credential::new("ghp_test"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_comment_sends_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/repos/acme/widgets/issues/42/comments")
                    .json_body(json!({ "body": "moved" }));
                then.status(201).json_body(json!({ "id": 77 }));
            })
            .await;

        client_for(&server)
            .post_comment(&locator(), &Credential::new("ghp_test"), "moved")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn close_issue_reports_forbidden() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/repos/acme/widgets/issues/42");
                then.status(403)
                    .json_body(json!({ "message": "Must have admin rights to Repository." }));
            })
            .await;

        let error = client_for(&server)
            .close_issue(&locator(), &Credential::new("ghp_test"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(403));
    }
}
