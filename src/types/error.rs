//! Error types for the response engine.
//!
//! Two layers exist: [`AchError`](crate::ach::AchError) covers codec and
//! record-validation failures, and [`ResponderError`] covers everything the
//! engine itself can fail on — configuration loading, rule validation,
//! transforms, and I/O. Configuration errors are fatal at startup; transform
//! and I/O errors abort the current file and are reported to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::ach::AchError;

/// Main error type for the response engine.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// The configuration file could not be read.
    #[error("reading config {path}: {source}")]
    ConfigRead {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("parsing config {path}: {source}")]
    ConfigParse {
        /// Path that failed to parse
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// A configured rule is structurally invalid.
    ///
    /// Raised at load time; fatal to startup.
    #[error("response[{index}]: {message}")]
    InvalidResponse {
        /// Position of the rule in the configured list
        index: usize,
        /// What was wrong
        message: String,
    },

    /// An Action violates the mutual-exclusion rules.
    #[error("invalid action: {message}")]
    InvalidAction {
        /// What was wrong
        message: String,
    },

    /// A configured Return carries a code outside the NACHA table.
    #[error("unknown return code '{code}'")]
    UnknownReturnCode {
        /// The offending code
        code: String,
    },

    /// A configured Correction carries a code outside the NACHA table.
    #[error("unknown change code '{code}'")]
    UnknownChangeCode {
        /// The offending code
        code: String,
    },

    /// An entry could not be morphed into its response form.
    #[error("batch[{batch}] morph entry[{entry}]: {source}")]
    MorphEntry {
        /// Batch index within the inbound file
        batch: usize,
        /// Entry index within the batch
        entry: usize,
        /// Underlying codec error
        source: AchError,
    },

    /// An output batch could not be finalized.
    #[error("batch[{batch}] create: {source}")]
    BatchCreate {
        /// Batch index within the inbound file
        batch: usize,
        /// Underlying codec error
        source: AchError,
    },

    /// A codec failure outside the per-entry/per-batch paths.
    #[error(transparent)]
    Ach(#[from] AchError),

    /// Writing an output file failed.
    #[error("writing {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResponderError {
    /// Create an InvalidAction error.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        ResponderError::InvalidAction {
            message: message.into(),
        }
    }

    /// Create a Write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResponderError::Write {
            path: path.into(),
            source,
        }
    }
}
