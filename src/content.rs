// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Issue content loaded from a Markdown document.

use std::{fs, path::Path};

use serde::Serialize;

use crate::error::{self, Error};

/// Title and body of the issue created in every target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct IssueContent
{
    /// Issue title taken from the first line of the document.
    pub title: String,
    /// Issue body made of the remaining lines.
    pub body:  String,
}

impl IssueContent
{
    /// Parses issue content from a Markdown document.
    ///
    /// The first line becomes the title after one leading `#` marker and the
    /// surrounding whitespace are removed. The remaining lines, trimmed as a
    /// block, become the body.
    ///
    /// Returns `None` when the title is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_fanout::IssueContent;
    ///
    /// let content = IssueContent::parse("# Upgrade notice\n\nPlease bump the SDK.\n",)
    ///     .expect("title present",);
    /// assert_eq!(content.title, "Upgrade notice");
    /// assert_eq!(content.body, "Please bump the SDK.");
    /// ```
    pub fn parse(document: &str,) -> Option<Self,>
    {
        let (first_line, rest,) = document.split_once('\n',).unwrap_or((document, "",),);
        let first_line = first_line.trim_start();
        let title = first_line.strip_prefix('#',).unwrap_or(first_line,).trim();

        if title.is_empty() {
            return None;
        }

        Some(Self {
            title: title.to_owned(), body: rest.trim().to_owned(),
        },)
    }

    /// Loads issue content from the Markdown file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Persistence`] when the document has no title.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let document =
            fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&document,).ok_or_else(|| {
            error::persistence_error(path, "issue content has an empty title line",)
        },)
    }
}
