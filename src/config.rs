// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Immutable run configuration.
//!
//! The CLI builds one [`RunConfig`] at startup and hands references to each
//! component. Nothing reads ambient global state after that point.

use std::{fmt, path::PathBuf};

use crate::{error::Error, rate::RateGovernor, retry::RetryPolicy};

/// Operating mode selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum RunMode
{
    /// Create issues for the (optionally sampled) target list.
    Create,
    /// Write a diversity sample of unprocessed targets to `output`.
    Sample
    {
        /// Destination of the sampled target list.
        output: PathBuf,
    },
    /// Print statistics about the target list and progress file.
    Statistics,
}

/// Configuration shared by every component of a run.
#[derive(Clone,)]
pub struct RunConfig
{
    /// GitHub token used to authenticate remote calls.
    pub token:             Option<String,>,
    /// Location of the target list.
    pub repositories_path: PathBuf,
    /// Location of the issue content document.
    pub issue_path:        PathBuf,
    /// Location of the progress file.
    pub progress_path:     PathBuf,
    /// Optional bound on the number of targets selected for this run.
    pub limit:             Option<usize,>,
    /// Ceiling of remote calls per rolling hour.
    pub per_hour:          u32,
    /// Retry policy applied to every target.
    pub retry:             RetryPolicy,
    /// Seed for deterministic sampling.
    pub seed:              Option<u64,>,
    /// Selected operating mode.
    pub mode:              RunMode,
}

impl RunConfig
{
    /// Checks invariants that cannot be expressed through argument parsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the rate ceiling is zero and
    /// [`Error::MissingCredential`] when issue creation is requested without
    /// a token.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.per_hour == 0 {
            return Err(Error::validation("--per-hour must be greater than zero",),);
        }

        if self.mode == RunMode::Create {
            self.require_token()?;
        }

        Ok((),)
    }

    /// Returns the configured token, rejecting missing or blank values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] when no usable token is set.
    pub fn require_token(&self,) -> Result<&str, Error,>
    {
        self.token
            .as_deref()
            .map(str::trim,)
            .filter(|token| !token.is_empty(),)
            .ok_or(Error::MissingCredential,)
    }

    /// Builds the rate governor for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the ceiling is zero.
    pub fn rate_governor(&self,) -> Result<RateGovernor, Error,>
    {
        RateGovernor::new(self.per_hour,)
    }
}

impl Default for RunConfig
{
    fn default() -> Self
    {
        Self {
            token:             None,
            repositories_path: PathBuf::from("repositories.json",),
            issue_path:        PathBuf::from("issue_content.md",),
            progress_path:     PathBuf::from("progress.json",),
            limit:             None,
            per_hour:          RateGovernor::DEFAULT_PER_HOUR,
            retry:             RetryPolicy::default(),
            seed:              None,
            mode:              RunMode::Create,
        }
    }
}

impl fmt::Debug for RunConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("RunConfig",)
            .field("token", &self.token.as_ref().map(|_| "<redacted>",),)
            .field("repositories_path", &self.repositories_path,)
            .field("issue_path", &self.issue_path,)
            .field("progress_path", &self.progress_path,)
            .field("limit", &self.limit,)
            .field("per_hour", &self.per_hour,)
            .field("retry", &self.retry,)
            .field("seed", &self.seed,)
            .field("mode", &self.mode,)
            .finish()
    }
}
