// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Loading and writing of target list files.
//!
//! Target lists are ordered sequences of repository identifiers. JSON arrays
//! are the canonical format; files with a `.yaml` or `.yml` extension are
//! decoded as YAML sequences. Order is preserved exactly as written.

use std::{fs, path::Path};

use tracing::debug;

use crate::error::{self, Error};

/// Loads the ordered target list from `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Persistence`] when it is not a sequence of strings.
pub fn load_target_list(path: &Path,) -> Result<Vec<String,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    let targets = parse_target_list(&contents, is_yaml(path,),)
        .map_err(|message| error::persistence_error(path, message,),)?;

    debug!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets,)
}

/// Decodes a target list document.
///
/// Returns the decoder's message on failure so callers can attach the path.
fn parse_target_list(contents: &str, yaml: bool,) -> Result<Vec<String,>, String,>
{
    if yaml {
        serde_yaml::from_str(contents,).map_err(|e| e.to_string(),)
    } else {
        serde_json::from_str(contents,).map_err(|e| e.to_string(),)
    }
}

/// Writes `targets` to `path` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when encoding fails and [`Error::Io`] when the
/// file cannot be written.
pub fn write_target_list(path: &Path, targets: &[String],) -> Result<(), Error,>
{
    let mut encoded = serde_json::to_string_pretty(targets,)?;
    encoded.push('\n',);
    fs::write(path, encoded,).map_err(|source| error::io_error(path, source,),)
}

fn is_yaml(path: &Path,) -> bool
{
    path.extension()
        .and_then(|extension| extension.to_str(),)
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("yaml",) || extension.eq_ignore_ascii_case("yml",)
        },)
}
