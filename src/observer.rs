// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Progress events emitted by the batch runner and their terminal rendering.
///
/// The runner never draws anything itself. It reports [`RunEvent`]s to a
/// [`RunObserver`]; [`ProgressDisplay`] turns them into indicatif bars.
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Lifecycle state of a single target within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum TargetState
{
    /// Already holds a success record; nothing to do.
    Skipped,
    /// Remote action in flight.
    Running,
    /// Issue created and recorded.
    Succeeded,
    /// Every attempt failed; failure recorded.
    Failed,
}

/// Event reported while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum RunEvent
{
    /// Iteration is about to start.
    Started
    {
        /// Number of targets in this pass.
        total:        usize,
        /// Targets in this pass that already hold a success record.
        already_done: usize,
    },
    /// A target moved to a new state.
    Transition
    {
        /// Raw target identifier.
        target: String,
        /// New state.
        state:  TargetState,
    },
    /// Attempts counted in the current hour window.
    RateWindow
    {
        /// Attempts in the current wall-clock hour.
        count:   u32,
        /// Configured ceiling.
        ceiling: u32,
    },
    /// The runner is waiting before the next attempt.
    Throttled
    {
        /// Length of the pause.
        interval: Duration,
    },
    /// Iteration is complete.
    Finished,
}

/// Receiver of run progress events.
pub trait RunObserver
{
    /// Handles a single event.
    fn on_event(&mut self, event: &RunEvent,);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy,)]
pub struct NullObserver;

impl RunObserver for NullObserver
{
    fn on_event(&mut self, _event: &RunEvent,) {}
}

impl RunObserver for Vec<RunEvent,>
{
    fn on_event(&mut self, event: &RunEvent,)
    {
        self.push(event.clone(),);
    }
}

/// Terminal display with an overall bar and an hourly rate bar.
#[derive(Debug,)]
pub struct ProgressDisplay
{
    multi:       MultiProgress,
    overall:     Option<ProgressBar,>,
    hourly:      Option<ProgressBar,>,
    /// Skips still covered by the initial position.
    pre_counted: usize,
}

impl ProgressDisplay
{
    /// Creates an empty display; bars appear on [`RunEvent::Started`].
    pub fn new() -> Self
    {
        Self {
            multi:       MultiProgress::new(),
            overall:     None,
            hourly:      None,
            pre_counted: 0,
        }
    }

    fn bar(&self, length: u64, task: &'static str,) -> ProgressBar
    {
        let bar = self.multi.add(ProgressBar::new(length,),);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(" {bar:40.cyan/blue} | {percent}% | {pos}/{len} | {prefix} {msg}",)
                .expect("valid template",)
                .progress_chars("█░ ",),
        );
        bar.set_prefix(task,);
        bar
    }
}

impl Default for ProgressDisplay
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl RunObserver for ProgressDisplay
{
    fn on_event(&mut self, event: &RunEvent,)
    {
        match event {
            RunEvent::Started {
                total,
                already_done,
            } => {
                let already_done = (*already_done).min(*total,);
                let overall = self.bar(*total as u64, "Overall Progress",);
                overall.set_position(already_done as u64,);
                self.overall = Some(overall,);
                self.pre_counted = already_done;
                self.hourly = None;
            }
            RunEvent::Transition {
                target,
                state,
            } => {
                if let Some(overall,) = &self.overall {
                    match state {
                        TargetState::Running => overall.set_message(target.clone(),),
                        TargetState::Succeeded | TargetState::Failed => overall.inc(1,),
                        TargetState::Skipped if self.pre_counted > 0 => self.pre_counted -= 1,
                        TargetState::Skipped => overall.inc(1,),
                    }
                }
            }
            RunEvent::RateWindow {
                count,
                ceiling,
            } => {
                if self.hourly.is_none() {
                    self.hourly = Some(self.bar(u64::from(*ceiling,), "Hour Rate Limit",),);
                }
                if let Some(hourly,) = &self.hourly {
                    hourly.set_position(u64::from(*count,),);
                }
            }
            RunEvent::Throttled {
                interval,
            } => {
                if let Some(hourly,) = &self.hourly {
                    hourly.set_message(format!("next in {}s", interval.as_secs()),);
                }
            }
            RunEvent::Finished => {
                for bar in [&self.overall, &self.hourly,].into_iter().flatten() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}
