// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Throttling of remote calls against an hourly ceiling.
//!
//! Enforcement is a fixed pause of `3600s / ceiling` between consecutive
//! attempts, which can never exceed the ceiling within any rolling hour. The
//! per-hour counter is informational only and resets whenever the wall-clock
//! hour changes.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;
use tracing::debug;

use crate::error::Error;

const SECONDS_PER_HOUR: u64 = 3600;

/// Inter-target delay derived from an operations-per-hour ceiling.
#[derive(Debug, Clone,)]
pub struct RateGovernor
{
    per_hour:   u32,
    hour_count: u32,
    last_hour:  Option<u64,>,
}

impl RateGovernor
{
    /// Default ceiling of operations per rolling hour.
    pub const DEFAULT_PER_HOUR: u32 = 10;

    /// Creates a governor for `per_hour` operations per rolling hour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the ceiling is zero.
    pub fn new(per_hour: u32,) -> Result<Self, Error,>
    {
        if per_hour == 0 {
            return Err(Error::validation(
                "rate ceiling must allow at least one operation per hour",
            ),);
        }

        Ok(Self {
            per_hour, hour_count: 0, last_hour: None,
        },)
    }

    /// Configured ceiling.
    pub fn per_hour(&self,) -> u32
    {
        self.per_hour
    }

    /// Pause applied between two consecutive attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use issue_fanout::RateGovernor;
    ///
    /// let governor = RateGovernor::new(10,)?;
    /// assert_eq!(governor.throttle_interval(), Duration::from_secs(360));
    /// # Ok::<(), issue_fanout::Error>(())
    /// ```
    pub fn throttle_interval(&self,) -> Duration
    {
        Duration::from_secs(SECONDS_PER_HOUR,) / self.per_hour
    }

    /// Records a completed attempt against the current wall-clock hour and
    /// returns the number of attempts counted in that hour.
    pub fn record_completion(&mut self,) -> u32
    {
        let epoch_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH,)
            .map(|elapsed| elapsed.as_secs(),)
            .unwrap_or(0,);
        self.record_completion_at(epoch_seconds,)
    }

    /// Records a completed attempt at `epoch_seconds`.
    pub fn record_completion_at(&mut self, epoch_seconds: u64,) -> u32
    {
        let hour = epoch_seconds / SECONDS_PER_HOUR;
        if self.last_hour != Some(hour,) {
            self.hour_count = 0;
            self.last_hour = Some(hour,);
        }

        self.hour_count += 1;
        self.hour_count
    }

    /// Attempts counted in the current hour window.
    pub fn hour_count(&self,) -> u32
    {
        self.hour_count
    }

    /// Suspends the caller for one throttle interval.
    pub async fn pause(&self,)
    {
        let interval = self.throttle_interval();
        debug!("Throttling for {}s before the next target", interval.as_secs());
        sleep(interval,).await;
    }
}

impl Default for RateGovernor
{
    fn default() -> Self
    {
        Self {
            per_hour: Self::DEFAULT_PER_HOUR, hour_count: 0, last_hour: None,
        }
    }
}
