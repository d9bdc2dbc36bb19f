#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the issue-fanout crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Errors fall in two groups. Per-target failures ([`Error::InvalidTargetFormat`]
//! and [`Error::Action`]) are captured as failure outcomes in the progress
//! store and never abort a run. Everything else is fatal and is reported
//! before the first target is touched, or when progress can no longer be
//! persisted.

use std::path::{Path, PathBuf};

use masterror::AppError;

/// Unified error type returned by the loaders, the batch runner and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading or writing run files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Existing target list, issue content or progress data is malformed.
    #[error("malformed data in {path:?}: {message}")]
    Persistence {
        /// Location of the offending file.
        path:    PathBuf,
        /// Decoder message describing the problem.
        message: String
    },
    /// Repository identifier that does not resolve to `owner/repo`.
    #[error("invalid repository format: {identifier}")]
    InvalidTargetFormat {
        /// Identifier exactly as supplied by the caller.
        identifier: String
    },
    /// Failure reported by the remote issue-creation action.
    #[error("{message}")]
    Action {
        /// Remote error text, or the error kind when the remote sent none.
        message: String
    },
    /// No authentication token was configured for a run that needs one.
    #[error(
        "GitHub token is required. Set it using the --token option or GITHUB_TOKEN environment variable."
    )]
    MissingCredential,
    /// Returned when configuration values violate invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing JSON output.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs an invalid target error for the given identifier.
    pub fn invalid_target<I>(identifier: I) -> Self
    where
        I: Into<String>
    {
        Self::InvalidTargetFormat {
            identifier: identifier.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// Used by the CLI when reporting fatal errors and by the batch runner
    /// when turning per-target errors into recorded failure descriptions.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<AppError> for Error {
    fn from(source: AppError) -> Self {
        Self::Action {
            message: describe_remote(&source)
        }
    }
}

/// Returns the message carried by a remote error, falling back to its kind.
///
/// `AppError`'s `Display` names only the kind.
pub fn describe_remote(error: &AppError) -> String {
    match error.message.as_deref() {
        Some(message) if !message.trim().is_empty() => message.to_owned(),
        _ => error.kind.to_string()
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Persistence`] variant for malformed file content.
pub fn persistence_error<M>(path: &Path, message: M) -> Error
where
    M: std::fmt::Display
{
    Error::Persistence {
        path:    path.to_path_buf(),
        message: message.to_string()
    }
}
