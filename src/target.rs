// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Parsing of repository identifiers into owner/repository pairs.
//!
//! Identifiers arrive either as bare `owner/repo` strings or as GitHub URLs.
//! Parsing is pure and deterministic. The raw identifier remains the key used
//! by the progress store, so `https://github.com/acme/widget` and
//! `acme/widget` parse to the same pair while being tracked separately.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Matches the optional GitHub host prefix, with or without scheme and `www.`.
static HOST_PREFIX: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"^(?i:(?:https?://)?(?:www\.)?github\.com/)",)
        .expect("host prefix pattern is valid",)
},);

/// Repository reference resolved from a target identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,)]
pub struct RepositoryRef
{
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo:  String,
}

impl fmt::Display for RepositoryRef
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parses a repository identifier into its owner and repository components.
///
/// Leading and trailing whitespace, the GitHub host prefix, one trailing `/`
/// and a trailing `.git` suffix are removed before the remainder is split on
/// `/`. Exactly two non-empty components must remain.
///
/// # Errors
///
/// Returns [`Error::InvalidTargetFormat`] when the separator is missing, either
/// component is empty, or the remainder contains additional path segments.
///
/// # Examples
///
/// ```
/// use issue_fanout::parse_target;
///
/// let bare = parse_target("acme/widget",)?;
/// let url = parse_target("https://github.com/acme/widget",)?;
/// assert_eq!(bare, url);
/// assert_eq!(bare.to_string(), "acme/widget");
/// assert!(parse_target("acme",).is_err());
/// # Ok::<(), issue_fanout::Error>(())
/// ```
pub fn parse_target(identifier: &str,) -> Result<RepositoryRef, Error,>
{
    let trimmed = identifier.trim();
    let without_host = HOST_PREFIX.replace(trimmed, "",);
    let without_host = without_host.as_ref();
    let path = without_host.strip_suffix('/',).unwrap_or(without_host,);
    let path = path.strip_suffix(".git",).unwrap_or(path,);

    let mut components = path.split('/',);
    match (components.next(), components.next(), components.next(),) {
        (Some(owner,), Some(repo,), None,) if !owner.is_empty() && !repo.is_empty() => {
            Ok(RepositoryRef {
                owner: owner.to_owned(), repo: repo.to_owned(),
            },)
        }
        _ => Err(Error::invalid_target(identifier,),),
    }
}

/// Returns the organization (owner) portion of a repository identifier.
///
/// # Errors
///
/// Propagates [`Error::InvalidTargetFormat`] from [`parse_target`].
pub fn organization_of(identifier: &str,) -> Result<String, Error,>
{
    parse_target(identifier,).map(|reference| reference.owner,)
}
