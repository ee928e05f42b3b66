// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by test-harness.

use crate::backend::BackendKind;
use camino::Utf8PathBuf;
use itertools::Itertools;
use std::{error::Error, fmt};
use thiserror::Error;

/// A line of a results file could not be parsed as JSON.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// The line is not well-formed JSON (this includes lines truncated mid-write).
    #[error("line is not well-formed JSON")]
    Json(#[source] serde_json::Error),
}

/// A line of a results file is well-formed JSON, but doesn't describe a valid record.
///
/// This is produced for missing required fields, values of the wrong type,
/// unknown outcomes, and unparseable timestamps or durations.
#[derive(Debug, Error)]
#[error("line does not match the result record schema")]
pub struct SchemaError {
    #[source]
    error: serde_json::Error,
}

impl SchemaError {
    pub(crate) fn new(error: serde_json::Error) -> Self {
        Self { error }
    }
}

/// An error that occurred while parsing a single serialized record.
#[derive(Debug, Error)]
pub enum RecordParseError {
    /// The line could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The line was decoded, but isn't a valid record.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// An error that occurred while writing records to a results file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultWriteError {
    /// The results file could not be created.
    #[error("error creating results file `{path}`")]
    Create {
        /// The path that was being created.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("error serializing record for `{identifier}`")]
    Serialize {
        /// The identifier of the test whose record failed to serialize.
        identifier: String,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// A record could not be appended to the results file.
    #[error("error writing to results file `{path}`")]
    Write {
        /// The path of the results file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The results file could not be flushed or synced to disk.
    #[error("error flushing results file `{path}`")]
    Flush {
        /// The path of the results file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A write was attempted after the writer was closed.
    #[error("results file `{path}` was already closed")]
    Closed {
        /// The path of the results file.
        path: Utf8PathBuf,
    },
}

/// An error that occurred while reading a results file.
///
/// A missing file is not an error, and neither are malformed lines: those are
/// skipped. This is only returned if the file exists but can't be read.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The results file could not be opened.
    #[error("error opening results file `{path}`")]
    Open {
        /// The path of the results file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// Reading from the results file failed partway through.
    #[error("error reading results file `{path}` at line {line_number}")]
    Read {
        /// The path of the results file.
        path: Utf8PathBuf,

        /// The 1-based line number being read.
        line_number: usize,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// An error returned by a [`Backend`](crate::backend::Backend) while uploading records.
#[derive(Debug, Error)]
#[error("backend `{backend}` failed to upload {record_count} record(s)")]
pub struct UploadError {
    backend: String,
    record_count: usize,
    #[source]
    error: Box<dyn Error + Send + Sync>,
}

impl UploadError {
    /// Creates a new `UploadError`.
    pub fn new(
        backend: impl Into<String>,
        record_count: usize,
        error: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            backend: backend.into(),
            record_count,
            error: error.into(),
        }
    }

    /// Returns the name of the backend that failed.
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

/// A backend name was not recognized.
#[derive(Clone, Debug, Error)]
#[error(
    "unknown backend `{name}` (available backends: {})",
    BackendKind::ALL.iter().map(|kind| kind.name()).join(", "),
)]
pub struct UnknownBackend {
    name: String,
}

impl UnknownBackend {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Displays an error along with all of its sources, one per line.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, "\n  caused by: {error}")?;
            source = error.source();
        }

        Ok(())
    }
}
