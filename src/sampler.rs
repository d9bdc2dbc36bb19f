// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Organization-balanced selection of unprocessed targets.
//!
//! Limited runs should spread issues across distinct organizations instead
//! of favouring owners that list many repositories. The sampler keeps only
//! targets that still need work and whose organization has no success yet,
//! picks one random representative per organization and finally draws a
//! random subset of the representatives.

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{progress::ProgressStore, target::organization_of};

/// Result of a sampling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct Sample
{
    /// Selected targets, at most one per organization.
    pub selected:      Vec<String,>,
    /// Number of organizations that still had eligible targets.
    pub organizations: usize,
}

/// Diversity sampler driven by an injected random source.
#[derive(Debug, Clone,)]
pub struct DiversitySampler<R = StdRng,>
{
    rng: R,
}

impl DiversitySampler<StdRng,>
{
    /// Creates a deterministic sampler seeded with `seed`.
    pub fn seeded(seed: u64,) -> Self
    {
        Self::new(StdRng::seed_from_u64(seed,),)
    }

    /// Creates a sampler seeded from operating system entropy.
    pub fn from_entropy() -> Self
    {
        Self::new(StdRng::from_os_rng(),)
    }
}

impl<R: Rng,> DiversitySampler<R,>
{
    /// Wraps the provided random source.
    pub fn new(rng: R,) -> Self
    {
        Self {
            rng,
        }
    }

    /// Selects an organization-balanced subset of `targets`.
    ///
    /// Eligible targets have no record or a failure record in `progress`, and
    /// belong to an organization without any success. Identifiers that do
    /// not parse are left out. A `limit` of `None` or zero returns one
    /// representative for every eligible organization.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_fanout::{DiversitySampler, ProgressStore};
    ///
    /// let targets: Vec<String,> =
    ///     ["acme/a", "acme/b", "globex/c",].iter().map(|t| t.to_string(),).collect();
    /// let progress = ProgressStore::empty("progress.json",);
    /// let sample = DiversitySampler::seeded(7,).sample(&targets, &progress, Some(1,),);
    /// assert_eq!(sample.selected.len(), 1);
    /// assert_eq!(sample.organizations, 2);
    /// ```
    pub fn sample(
        &mut self,
        targets: &[String],
        progress: &ProgressStore,
        limit: Option<usize,>,
    ) -> Sample
    {
        let done_organizations = progress.successful_organizations();

        let mut order: Vec<String,> = Vec::new();
        let mut groups: HashMap<String, Vec<&String,>,> = HashMap::new();

        for target in targets {
            if progress.is_done(target,) {
                continue;
            }

            let organization = match organization_of(target,) {
                Ok(organization,) => organization,
                Err(error,) => {
                    warn!("Leaving {} out of the sample: {}", target, error);
                    continue;
                }
            };

            if done_organizations.contains(&organization,) {
                continue;
            }

            groups
                .entry(organization.clone(),)
                .or_insert_with(|| {
                    order.push(organization,);
                    Vec::new()
                },)
                .push(target,);
        }

        let mut representatives = Vec::with_capacity(order.len(),);
        for organization in &order {
            if let Some(candidates,) = groups.get(organization,)
                && let Some(choice,) = candidates.choose(&mut self.rng,)
            {
                representatives.push((*choice).clone(),);
            }
        }

        let selected = match limit {
            Some(limit,) if limit > 0 && limit < representatives.len() => representatives
                .choose_multiple(&mut self.rng, limit,)
                .cloned()
                .collect(),
            _ => representatives,
        };

        debug!("Sampled {} targets from {} eligible organizations", selected.len(), order.len());

        Sample {
            selected,
            organizations: order.len(),
        }
    }
}
