// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Durable record of per-target outcomes.
//!
//! The store maps raw target identifiers to the outcome of the last attempt.
//! A success is permanent; a failure leaves the target eligible for another
//! attempt on a later run. Entries are only ever inserted or overwritten, so
//! the store never shrinks.
//!
//! The on-disk format is a JSON object whose values are either the created
//! issue URL or `{"error": "<description>"}`.

use std::{
    collections::{BTreeMap, HashSet},
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{self, Error},
    target::organization_of,
};

/// Outcome recorded for a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(untagged)]
pub enum Outcome
{
    /// Issue was created; holds the opaque result reference (issue URL).
    Success(String,),
    /// Every attempt failed; holds the last error description.
    Failure
    {
        /// Description of the last error.
        error: String,
    },
}

impl Outcome
{
    /// Builds a failure outcome from a displayable error.
    pub fn failure<E: std::fmt::Display,>(error: E,) -> Self
    {
        Self::Failure {
            error: error.to_string(),
        }
    }

    /// Returns `true` for success outcomes.
    pub fn is_success(&self,) -> bool
    {
        matches!(self, Self::Success(_,))
    }

    /// Returns the error description of a failure outcome.
    pub fn error(&self,) -> Option<&str,>
    {
        match self {
            Self::Success(_,) => None,
            Self::Failure {
                error,
            } => Some(error.as_str(),),
        }
    }
}

/// File-backed progress store.
#[derive(Debug, Clone,)]
pub struct ProgressStore
{
    path:    PathBuf,
    records: BTreeMap<String, Outcome,>,
}

impl ProgressStore
{
    /// Creates an empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf,>,) -> Self
    {
        Self {
            path: path.into(), records: BTreeMap::new(),
        }
    }

    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store, since first runs have no prior
    /// progress.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file exists but cannot be read and
    /// [`Error::Persistence`] when its content is not a valid progress map.
    pub fn load(path: impl Into<PathBuf,>,) -> Result<Self, Error,>
    {
        let path = path.into();
        let contents = match fs::read_to_string(&path,) {
            Ok(contents,) => contents,
            Err(source,) if source.kind() == io::ErrorKind::NotFound => {
                debug!("No progress file at {}, starting fresh", path.display());
                return Ok(Self::empty(path,),);
            }
            Err(source,) => return Err(error::io_error(&path, source,),),
        };

        let records: BTreeMap<String, Outcome,> = serde_json::from_str(&contents,)
            .map_err(|e| error::persistence_error(&path, e,),)?;

        debug!("Loaded {} progress records from {}", records.len(), path.display());
        Ok(Self {
            path, records,
        },)
    }

    /// Serializes the full map and replaces the backing file.
    ///
    /// The content is written to a sibling temporary file first and renamed
    /// over the destination, so an interrupted write leaves the previous
    /// state intact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] or [`Error::Io`] when writing fails.
    pub fn save(&self,) -> Result<(), Error,>
    {
        let mut encoded = serde_json::to_string_pretty(&self.records,)?;
        encoded.push('\n',);

        let staging = staging_path(&self.path,);
        fs::write(&staging, encoded,).map_err(|source| error::io_error(&staging, source,),)?;
        fs::rename(&staging, &self.path,).map_err(|source| error::io_error(&self.path, source,),)
    }

    /// Returns `true` iff the exact target string holds a success record.
    pub fn is_done(&self, target: &str,) -> bool
    {
        self.records.get(target,).is_some_and(Outcome::is_success,)
    }

    /// Inserts or overwrites the outcome for `target`.
    pub fn record(&mut self, target: impl Into<String,>, outcome: Outcome,)
    {
        self.records.insert(target.into(), outcome,);
    }

    /// Returns the recorded outcome for `target`.
    pub fn get(&self, target: &str,) -> Option<&Outcome,>
    {
        self.records.get(target,)
    }

    /// Returns `true` when any outcome is recorded for `target`.
    pub fn contains(&self, target: &str,) -> bool
    {
        self.records.contains_key(target,)
    }

    /// Number of recorded targets.
    pub fn len(&self,) -> usize
    {
        self.records.len()
    }

    /// Returns `true` when nothing has been recorded yet.
    pub fn is_empty(&self,) -> bool
    {
        self.records.is_empty()
    }

    /// Iterates over records in key order.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, &Outcome,),> + '_
    {
        self.records.iter().map(|(target, outcome,)| (target.as_str(), outcome,),)
    }

    /// Number of success records.
    pub fn success_count(&self,) -> usize
    {
        self.records.values().filter(|outcome| outcome.is_success(),).count()
    }

    /// Number of failure records.
    pub fn failure_count(&self,) -> usize
    {
        self.records.len() - self.success_count()
    }

    /// Failing targets with their error descriptions, in key order.
    pub fn failures(&self,) -> Vec<(String, String,),>
    {
        self.iter()
            .filter_map(|(target, outcome,)| {
                outcome.error().map(|error| (target.to_owned(), error.to_owned(),),)
            },)
            .collect()
    }

    /// Organizations owning at least one successfully processed target.
    ///
    /// Keys that do not parse as repository identifiers are ignored.
    pub fn successful_organizations(&self,) -> HashSet<String,>
    {
        self.iter()
            .filter(|(_, outcome,)| outcome.is_success(),)
            .filter_map(|(target, _,)| organization_of(target,).ok(),)
            .collect()
    }

    /// Location of the backing file.
    pub fn path(&self,) -> &Path
    {
        &self.path
    }
}

fn staging_path(path: &Path,) -> PathBuf
{
    let mut name = path.file_name().map(OsString::from,).unwrap_or_else(|| "progress".into(),);
    name.push(".tmp",);
    path.with_file_name(name,)
}
