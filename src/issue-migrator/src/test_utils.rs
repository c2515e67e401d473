//! Shared helpers for unit tests.

use crate::credential::Credential;
use crate::issue::{IssueLocator, NewIssue, RepoLocator, SourceIssue, TargetIssue};
use crate::source::{SourceError, SourceTracker};
use crate::target::{TargetError, TargetTracker};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Installs a process-wide rustls crypto provider for octocrab.
pub(crate) fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// The issue used throughout the workflow tests.
pub(crate) fn sample_source_issue() -> SourceIssue {
    SourceIssue {
        id: 9001,
        number: 42,
        title: "Build fails on arm64".to_string(),
        body: "See log.".to_string(),
        labels: vec!["bug".to_string()],
        author_login: "alice".to_string(),
        author_profile_url: "https://github.com/alice".to_string(),
    }
}

pub(crate) fn sample_target_issue() -> TargetIssue {
    TargetIssue {
        id: 555,
        number: 7,
        url: "https://codeberg.org/acme/widgets/issues/7".to_string(),
    }
}

pub(crate) fn server_error(message: &str) -> SourceError {
    SourceError::Status {
        status: 500,
        message: message.to_string(),
    }
}

/// A call received by [`FakeSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceCall {
    Fetch {
        issue: IssueLocator,
        authenticated: bool,
    },
    Close(IssueLocator),
    Comment {
        issue: IssueLocator,
        body: String,
    },
}

#[derive(Default)]
struct SourceScript {
    fetch_errors: VecDeque<SourceError>,
    close_errors: VecDeque<SourceError>,
    comment_errors: VecDeque<SourceError>,
    calls: Vec<SourceCall>,
}

/// In-memory source tracker with scripted failures.
pub(crate) struct FakeSource {
    issue: SourceIssue,
    script: Mutex<SourceScript>,
    fetch_gate: Option<Arc<Notify>>,
}

impl FakeSource {
    pub(crate) fn new(issue: SourceIssue) -> Self {
        Self {
            issue,
            script: Mutex::new(SourceScript::default()),
            fetch_gate: None,
        }
    }

    /// Makes every fetch wait until the gate is notified.
    pub(crate) fn with_fetch_gate(mut self, gate: Arc<Notify>) -> Self {
        self.fetch_gate = Some(gate);
        self
    }

    pub(crate) fn fail_next_fetch(&self, error: SourceError) {
        self.script.lock().unwrap().fetch_errors.push_back(error);
    }

    pub(crate) fn fail_next_close(&self, error: SourceError) {
        self.script.lock().unwrap().close_errors.push_back(error);
    }

    pub(crate) fn fail_next_comment(&self, error: SourceError) {
        self.script.lock().unwrap().comment_errors.push_back(error);
    }

    pub(crate) fn calls(&self) -> Vec<SourceCall> {
        self.script.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl SourceTracker for FakeSource {
    fn service_name(&self) -> &str {
        "GitHub"
    }

    async fn fetch_issue(
        &self,
        issue: &IssueLocator,
        credential: Option<&Credential>,
    ) -> Result<SourceIssue, SourceError> {
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        let mut script = self.script.lock().unwrap();
        script.calls.push(SourceCall::Fetch {
            issue: issue.clone(),
            authenticated: credential.is_some(),
        });
        match script.fetch_errors.pop_front() {
            Some(error) => Err(error),
            None => Ok(self.issue.clone()),
        }
    }

    async fn close_issue(
        &self,
        issue: &IssueLocator,
        _credential: &Credential,
    ) -> Result<(), SourceError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(SourceCall::Close(issue.clone()));
        script.close_errors.pop_front().map_or(Ok(()), Err)
    }

    async fn post_comment(
        &self,
        issue: &IssueLocator,
        _credential: &Credential,
        body: &str,
    ) -> Result<(), SourceError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(SourceCall::Comment {
            issue: issue.clone(),
            body: body.to_string(),
        });
        script.comment_errors.pop_front().map_or(Ok(()), Err)
    }
}

#[derive(Default)]
struct TargetScript {
    errors: VecDeque<TargetError>,
    requests: Vec<(RepoLocator, NewIssue)>,
}

/// In-memory target tracker with scripted failures.
pub(crate) struct FakeTarget {
    created: TargetIssue,
    script: Mutex<TargetScript>,
    create_gate: Option<Arc<Notify>>,
}

impl FakeTarget {
    pub(crate) fn new(created: TargetIssue) -> Self {
        Self {
            created,
            script: Mutex::new(TargetScript::default()),
            create_gate: None,
        }
    }

    /// Makes every create wait until the gate is notified.
    pub(crate) fn with_create_gate(mut self, gate: Arc<Notify>) -> Self {
        self.create_gate = Some(gate);
        self
    }

    pub(crate) fn fail_next_create(&self, error: TargetError) {
        self.script.lock().unwrap().errors.push_back(error);
    }

    pub(crate) fn requests(&self) -> Vec<(RepoLocator, NewIssue)> {
        self.script.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl TargetTracker for FakeTarget {
    fn service_name(&self) -> &str {
        "Codeberg"
    }

    async fn create_issue(
        &self,
        repo: &RepoLocator,
        _credential: &Credential,
        issue: &NewIssue,
    ) -> Result<TargetIssue, TargetError> {
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        let mut script = self.script.lock().unwrap();
        script.requests.push((repo.clone(), issue.clone()));
        match script.errors.pop_front() {
            Some(error) => Err(error),
            None => Ok(self.created.clone()),
        }
    }
}
