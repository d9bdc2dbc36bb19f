// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Read-only statistics over the target list and the progress store.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{progress::ProgressStore, target::organization_of};

/// Counts of processed and outstanding repositories and organizations.
///
/// Repository figures use set semantics on the raw identifier strings.
/// Identifiers that do not parse contribute to repository counts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize,)]
pub struct Statistics
{
    /// Distinct identifiers in the target list.
    pub total_repos:     usize,
    /// Identifiers with a progress record.
    pub processed_repos: usize,
    /// Listed identifiers without a progress record.
    pub unique_repos:    usize,
    /// Distinct organizations in the target list.
    pub total_orgs:      usize,
    /// Distinct organizations among progress records.
    pub processed_orgs:  usize,
    /// Listed organizations with no progress record at all.
    pub unique_orgs:     usize,
}

impl Statistics
{
    /// Computes statistics without touching the filesystem or the network.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_fanout::{Outcome, ProgressStore, Statistics};
    ///
    /// let targets: Vec<String,> =
    ///     ["acme/a", "acme/b", "globex/c",].iter().map(|t| t.to_string(),).collect();
    /// let mut progress = ProgressStore::empty("progress.json",);
    /// progress.record("acme/a", Outcome::Success("url".to_owned(),),);
    ///
    /// let stats = Statistics::collect(&targets, &progress,);
    /// assert_eq!(stats.processed_repos, 1);
    /// assert_eq!(stats.unique_repos, 2);
    /// assert_eq!(stats.unique_orgs, 1);
    /// ```
    pub fn collect(targets: &[String], progress: &ProgressStore,) -> Self
    {
        let listed: BTreeSet<&str,> = targets.iter().map(String::as_str,).collect();
        let unique_repos = listed.iter().filter(|target| !progress.contains(target,),).count();

        let listed_orgs: BTreeSet<String,> =
            listed.iter().filter_map(|target| organization_of(target,).ok(),).collect();
        let processed_orgs: BTreeSet<String,> =
            progress.iter().filter_map(|(target, _,)| organization_of(target,).ok(),).collect();
        let unique_orgs = listed_orgs.difference(&processed_orgs,).count();

        Self {
            total_repos: listed.len(),
            processed_repos: progress.len(),
            unique_repos,
            total_orgs: listed_orgs.len(),
            processed_orgs: processed_orgs.len(),
            unique_orgs,
        }
    }
}
