// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Sequential, resumable batch execution.
//!
//! Each target either goes straight to [`TargetState::Skipped`] (a success is
//! already recorded) or through [`TargetState::Running`] to
//! [`TargetState::Succeeded`] or [`TargetState::Failed`]. The progress store
//! is written after every terminal transition, so an interrupted run loses at
//! most the target that was in flight. Consecutive attempted targets, whether
//! they reached GitHub or failed to parse, are separated by the rate
//! governor's throttle interval.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    content::IssueContent,
    error::Error,
    github::IssueCreator,
    observer::{NullObserver, RunEvent, RunObserver, TargetState},
    progress::{Outcome, ProgressStore},
    rate::RateGovernor,
    retry::RetryingAction,
    target::parse_target,
};

/// Failing target reported in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct FailedTarget
{
    /// Raw target identifier.
    pub target: String,
    /// Last recorded error description.
    pub error:  String,
}

/// Summary produced at the end of a run.
///
/// Success and failure figures cover the whole progress store, so they
/// include outcomes recorded by earlier runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RunSummary
{
    /// Targets in the full repositories list.
    pub total_targets: usize,
    /// Targets handed to this pass, after any sampling.
    pub selected:      usize,
    /// Targets attempted during this pass.
    pub attempted:     usize,
    /// Targets skipped because a success was already recorded.
    pub skipped:       usize,
    /// Success records in the progress store.
    pub succeeded:     usize,
    /// Failure records in the progress store.
    pub failed:        usize,
    /// Failing targets with their error descriptions.
    pub failures:      Vec<FailedTarget,>,
}

impl fmt::Display for RunSummary
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        writeln!(f, "Summary:")?;
        writeln!(f, "Total repositories: {}", self.total_targets)?;
        writeln!(f, "Selected this run: {}", self.selected)?;
        writeln!(f, "Attempted this run: {}", self.attempted)?;
        writeln!(f, "Skipped (already done): {}", self.skipped)?;
        writeln!(f, "Successful: {}", self.succeeded)?;
        write!(f, "Failed: {}", self.failed)?;

        if !self.failures.is_empty() {
            writeln!(f,)?;
            writeln!(f,)?;
            write!(f, "Failed repositories:")?;
            for failure in &self.failures {
                writeln!(f,)?;
                write!(f, "{}: {}", failure.target, failure.error)?;
            }
        }

        Ok((),)
    }
}

/// Drives targets through retrying issue creation, persistence and throttling.
pub struct BatchRunner<C, O = NullObserver,>
{
    action:   RetryingAction<C,>,
    governor: RateGovernor,
    store:    ProgressStore,
    content:  IssueContent,
    observer: O,
}

impl<C: IssueCreator,> BatchRunner<C, NullObserver,>
{
    /// Creates a runner that reports no progress events.
    pub fn new(
        action: RetryingAction<C,>,
        governor: RateGovernor,
        store: ProgressStore,
        content: IssueContent,
    ) -> Self
    {
        Self::with_observer(action, governor, store, content, NullObserver,)
    }
}

impl<C: IssueCreator, O: RunObserver,> BatchRunner<C, O,>
{
    /// Creates a runner that reports progress events to `observer`.
    pub fn with_observer(
        action: RetryingAction<C,>,
        governor: RateGovernor,
        store: ProgressStore,
        content: IssueContent,
        observer: O,
    ) -> Self
    {
        Self {
            action, governor, store, content, observer,
        }
    }

    /// Processes every target of a full list in order.
    ///
    /// # Errors
    ///
    /// See [`BatchRunner::run_selected`].
    pub async fn run(&mut self, targets: &[String],) -> Result<RunSummary, Error,>
    {
        self.run_selected(targets.len(), targets,).await
    }

    /// Processes `targets`, a selection from a list of `listed` targets, in
    /// order and returns the run summary.
    ///
    /// Per-target failures are recorded and never abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Serialize`] when the progress store
    /// cannot be persisted; the run stops because further outcomes could not
    /// be recorded.
    pub async fn run_selected(
        &mut self,
        listed: usize,
        targets: &[String],
    ) -> Result<RunSummary, Error,>
    {
        let already_done = targets.iter().filter(|target| self.store.is_done(target,),).count();
        self.emit(RunEvent::Started {
            total: targets.len(), already_done,
        },);

        let mut attempted = 0;
        let mut skipped = 0;
        let mut throttle_pending = false;

        for target in targets {
            if self.store.is_done(target,) {
                info!("Skipping {}, already processed successfully.", target);
                self.transition(target, TargetState::Skipped,);
                skipped += 1;
                continue;
            }

            if throttle_pending {
                self.emit(RunEvent::Throttled {
                    interval: self.governor.throttle_interval(),
                },);
                self.governor.pause().await;
            }

            self.transition(target, TargetState::Running,);
            let outcome = match parse_target(target,) {
                Ok(reference,) => {
                    self.action.execute(&reference.owner, &reference.repo, &self.content,).await
                }
                Err(error,) => {
                    warn!("Error processing {}: {}", target, error);
                    Outcome::failure(error.to_display_string(),)
                }
            };
            self.complete(target, outcome,)?;
            attempted += 1;

            let count = self.governor.record_completion();
            self.emit(RunEvent::RateWindow {
                count,
                ceiling: self.governor.per_hour(),
            },);
            throttle_pending = true;
        }

        self.emit(RunEvent::Finished,);

        let summary = RunSummary {
            total_targets: listed,
            selected: targets.len(),
            attempted,
            skipped,
            succeeded: self.store.success_count(),
            failed: self.store.failure_count(),
            failures: self
                .store
                .failures()
                .into_iter()
                .map(|(target, error,)| FailedTarget {
                    target, error,
                },)
                .collect(),
        };

        info!(
            "Run complete: {} attempted, {} skipped, {} failures recorded",
            summary.attempted, summary.skipped, summary.failed
        );

        Ok(summary,)
    }

    /// Progress store owned by this runner.
    pub fn store(&self,) -> &ProgressStore
    {
        &self.store
    }

    /// Observer receiving progress events.
    pub fn observer(&self,) -> &O
    {
        &self.observer
    }

    /// Issue creation action used by this runner.
    pub fn action(&self,) -> &RetryingAction<C,>
    {
        &self.action
    }

    fn complete(&mut self, target: &str, outcome: Outcome,) -> Result<(), Error,>
    {
        let state =
            if outcome.is_success() { TargetState::Succeeded } else { TargetState::Failed };

        self.store.record(target, outcome,);
        self.store.save()?;
        self.transition(target, state,);
        Ok((),)
    }

    fn transition(&mut self, target: &str, state: TargetState,)
    {
        self.emit(RunEvent::Transition {
            target: target.to_owned(), state,
        },);
    }

    fn emit(&mut self, event: RunEvent,)
    {
        self.observer.on_event(&event,);
    }
}
