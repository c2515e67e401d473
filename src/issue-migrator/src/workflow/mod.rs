//! Migration workflow controller.
//!
//! The controller owns a [`MigrationState`] and moves it through
//! `Idle → Fetching → Fetched → Creating → Created → Closing → Closed`.
//! Every action is gated on the current phase, at most one remote call is
//! outstanding at a time, and a failed step leaves the phase at the last
//! completed value so the user can retry it.

mod error;
mod input;
mod phase;
mod state;

pub use error::{FailureKind, LastError, MigrationError};
pub use input::{MigrationInput, SourceInput, TargetInput};
pub use phase::{Action, Phase};
pub use state::MigrationState;

use crate::credential::Credential;
use crate::issue::{IssueLocator, SourceIssue, TargetIssue};
use crate::source::SourceTracker;
use crate::target::TargetTracker;
use crate::templates::{build_new_issue, generate_migration_comment};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, info_span, warn, Instrument};

struct Inner {
    state: MigrationState,
    in_flight: bool,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a single issue migration between a source and a target tracker.
///
/// Actions take `&self` so the controller can be shared with a presentation
/// layer; re-entrant calls are rejected with [`MigrationError::Busy`].
pub struct MigrationController<S, T> {
    source: S,
    target: T,
    inner: Mutex<Inner>,
}

/// An action whose remote call is outstanding.
///
/// Dropping it without settling (the caller abandoned the future) rolls the
/// phase back and releases the in-flight flag.
struct Flight<'a> {
    inner: &'a Mutex<Inner>,
    action: Action,
    rollback: Phase,
    settled: bool,
}

impl Flight<'_> {
    /// Applies an intermediate change without ending the flight.
    fn update(&self, f: impl FnOnce(&mut MigrationState)) {
        f(&mut lock(self.inner).state);
    }

    fn succeed(mut self, f: impl FnOnce(&mut MigrationState)) {
        let mut inner = lock(self.inner);
        f(&mut inner.state);
        inner.in_flight = false;
        self.settled = true;
    }

    fn fail(mut self, error: MigrationError) -> MigrationError {
        warn!(action = %self.action, error = %error, "Migration step failed");
        let mut inner = lock(self.inner);
        inner.state.phase = self.rollback;
        inner.state.last_error = error.to_last_error(self.action);
        inner.in_flight = false;
        self.settled = true;
        error
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(action = %self.action, "Migration step abandoned");
            let mut inner = lock(self.inner);
            inner.state.phase = self.rollback;
            inner.in_flight = false;
        }
    }
}

/// Values captured when closing starts.
struct ClosePlan {
    locator: IssueLocator,
    credential: Credential,
    target_url: String,
    already_closed: bool,
}

impl<S: SourceTracker, T: TargetTracker> MigrationController<S, T> {
    /// Creates a controller in the `Idle` phase.
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target,
            inner: Mutex::new(Inner {
                state: MigrationState::default(),
                in_flight: false,
            }),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> MigrationState {
        lock(&self.inner).state.clone()
    }

    /// Returns true while an action is waiting on a remote call.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.inner).in_flight
    }

    /// Returns the source client.
    pub fn source_client(&self) -> &S {
        &self.source
    }

    /// Returns the target client.
    pub fn target_client(&self) -> &T {
        &self.target
    }

    /// Reads the issue to migrate. Valid from `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] for unusable input,
    /// [`MigrationError::Fetch`] if the source service rejects the read, and
    /// [`MigrationError::Busy`] / [`MigrationError::InvalidTransition`] when
    /// the call is not allowed right now.
    pub async fn fetch_source(&self, input: SourceInput) -> Result<SourceIssue, MigrationError> {
        let (flight, (locator, credential)) = self.begin(
            Action::FetchSource,
            Phase::Idle,
            Phase::Fetching,
            |state| {
                state.input.source = input;
                let locator = state.input.source.locator()?;
                Ok((locator, state.input.source.credential.clone()))
            },
        )?;

        let service = self.source.service_name().to_string();
        let span = info_span!("fetch_source", issue = %locator);

        async {
            info!(authenticated = credential.is_some(), "Fetching source issue");

            match self.source.fetch_issue(&locator, credential.as_ref()).await {
                Ok(issue) => {
                    info!(
                        title = %issue.title,
                        labels = issue.labels.len(),
                        author = %issue.author_login,
                        "Source issue fetched"
                    );
                    flight.succeed(|state| {
                        state.source_issue = Some(issue.clone());
                        state.phase = Phase::Fetched;
                        state.notice = Some(format!("{service} issue fetched successfully"));
                    });
                    Ok(issue)
                }
                Err(source) => Err(flight.fail(MigrationError::Fetch { service, source })),
            }
        }
        .instrument(span)
        .await
    }

    /// Creates the migrated issue on the target service. Valid from `Fetched`.
    ///
    /// The body gets the provenance footer appended and labels are carried
    /// over by name.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] for unusable input,
    /// [`MigrationError::Create`] if the target service rejects the request,
    /// and [`MigrationError::Busy`] / [`MigrationError::InvalidTransition`]
    /// when the call is not allowed right now.
    pub async fn create_target(&self, input: TargetInput) -> Result<TargetIssue, MigrationError> {
        let (flight, (repo, credential, source_issue)) = self.begin(
            Action::CreateTarget,
            Phase::Fetched,
            Phase::Creating,
            |state| {
                state.input.target = input;
                let (repo, credential) = state.input.target.locator()?;
                let source_issue =
                    state
                        .source_issue
                        .clone()
                        .ok_or(MigrationError::InvalidTransition {
                            action: Action::CreateTarget,
                            phase: state.phase,
                        })?;
                Ok((repo, credential, source_issue))
            },
        )?;

        let request = build_new_issue(&source_issue, self.source.service_name());
        let service = self.target.service_name().to_string();
        let span = info_span!("create_target", repo = %repo, source_number = source_issue.number);

        async {
            info!(labels = request.labels.len(), "Creating target issue");

            match self.target.create_issue(&repo, &credential, &request).await {
                Ok(created) => {
                    info!(number = created.number, url = %created.url, "Target issue created");
                    flight.succeed(|state| {
                        state.target_issue = Some(created.clone());
                        state.phase = Phase::Created;
                        state.notice = Some(format!("{service} issue created successfully"));
                    });
                    Ok(created)
                }
                Err(source) => {
                    let message = source
                        .remote_message()
                        .map_or_else(|| format!("Failed to create {service} issue"), str::to_owned);
                    Err(flight.fail(MigrationError::Create { message, source }))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Closes the source issue and links it to the migrated copy. Valid from `Created`.
    ///
    /// Closing happens first; the comment is only attempted once the close
    /// succeeded. When the comment fails the issue stays closed, the phase
    /// stays `Created`, and a retry only re-attempts the comment.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] without a source credential,
    /// [`MigrationError::Close`] if closing failed,
    /// [`MigrationError::CommentFailed`] if closing succeeded but commenting
    /// failed, and [`MigrationError::Busy`] /
    /// [`MigrationError::InvalidTransition`] when the call is not allowed.
    pub async fn close_source(&self) -> Result<(), MigrationError> {
        let (flight, plan) = self.begin(
            Action::CloseSource,
            Phase::Created,
            Phase::Closing,
            |state| {
                let locator = state.input.source.locator()?;
                let credential = state.input.source.credential.clone().ok_or_else(|| {
                    MigrationError::validation("source token", "is required to close the issue")
                })?;
                let target_url = state.target_issue.as_ref().map(|t| t.url.clone()).ok_or(
                    MigrationError::InvalidTransition {
                        action: Action::CloseSource,
                        phase: state.phase,
                    },
                )?;
                Ok(ClosePlan {
                    locator,
                    credential,
                    target_url,
                    already_closed: state.source_closed,
                })
            },
        )?;

        let service = self.source.service_name().to_string();
        let comment = generate_migration_comment(self.target.service_name(), &plan.target_url);
        let span = info_span!("close_source", issue = %plan.locator);

        async {
            if plan.already_closed {
                info!("Source issue already closed, retrying comment only");
            } else {
                info!("Closing source issue");
                if let Err(source) = self
                    .source
                    .close_issue(&plan.locator, &plan.credential)
                    .await
                {
                    return Err(flight.fail(MigrationError::Close { service, source }));
                }
                flight.update(|state| state.source_closed = true);
                info!("Source issue closed");
            }

            match self
                .source
                .post_comment(&plan.locator, &plan.credential, &comment)
                .await
            {
                Ok(()) => {
                    info!(target_url = %plan.target_url, "Migration comment posted");
                    flight.succeed(|state| {
                        state.phase = Phase::Closed;
                        state.notice = Some(format!("{service} issue closed and comment added"));
                    });
                    Ok(())
                }
                Err(source) => Err(flight.fail(MigrationError::CommentFailed { service, source })),
            }
        }
        .instrument(span)
        .await
    }

    /// Returns to source selection. Valid from `Fetched` only, before anything
    /// was written remotely.
    ///
    /// The entered input is kept so it can be edited.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Busy`] or [`MigrationError::InvalidTransition`].
    pub fn back(&self) -> Result<(), MigrationError> {
        let mut inner = lock(&self.inner);
        if inner.in_flight {
            return Err(MigrationError::Busy);
        }
        if inner.state.phase != Phase::Fetched {
            return Err(MigrationError::InvalidTransition {
                action: Action::Back,
                phase: inner.state.phase,
            });
        }

        let state = &mut inner.state;
        state.phase = Phase::Idle;
        state.source_issue = None;
        state.last_error = None;
        state.notice = None;
        info!("Returned to source selection");
        Ok(())
    }

    /// Discards the migration and returns to `Idle` with empty input.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Busy`] while a remote call is outstanding.
    pub fn reset(&self) -> Result<(), MigrationError> {
        let mut inner = lock(&self.inner);
        if inner.in_flight {
            return Err(MigrationError::Busy);
        }

        let previous = inner.state.phase;
        inner.state = MigrationState::default();
        info!(from = %previous, "Migration reset");
        Ok(())
    }

    /// Checks that `action` may start, then marks it in flight.
    ///
    /// `prepare` captures what the remote call needs. A validation failure
    /// from it is recorded in the state and the phase is left unchanged.
    fn begin<R>(
        &self,
        action: Action,
        from: Phase,
        running: Phase,
        prepare: impl FnOnce(&mut MigrationState) -> Result<R, MigrationError>,
    ) -> Result<(Flight<'_>, R), MigrationError> {
        let mut inner = lock(&self.inner);
        if inner.in_flight {
            return Err(MigrationError::Busy);
        }
        let phase = inner.state.phase;
        if phase != from {
            return Err(MigrationError::InvalidTransition { action, phase });
        }

        inner.state.last_error = None;
        inner.state.notice = None;

        let prepared = match prepare(&mut inner.state) {
            Ok(prepared) => prepared,
            Err(error) => {
                warn!(action = %action, error = %error, "Migration step rejected");
                inner.state.last_error = error.to_last_error(action);
                return Err(error);
            }
        };

        inner.state.phase = running;
        inner.in_flight = true;

        Ok((
            Flight {
                inner: &self.inner,
                action,
                rollback: from,
                settled: false,
            },
            prepared,
        ))
    }
}
