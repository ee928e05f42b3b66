// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backends that captured records are uploaded to.

mod stub;

pub use stub::StubBackend;

use crate::{
    errors::{UnknownBackend, UploadError},
    record::Record,
};
use std::{fmt, str::FromStr};

/// A destination for captured records.
pub trait Backend {
    /// A human-readable name for this backend, used in diagnostics.
    fn name(&self) -> &str;

    /// Uploads the given records.
    ///
    /// Backends receive the records by shared reference and never modify them,
    /// so the results file stays intact whether or not the upload succeeds.
    fn upload(&mut self, records: &[Record]) -> Result<(), UploadError>;
}

/// The backends known to test-harness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Reports a count of records to stderr instead of uploading.
    #[default]
    Stub,
}

impl BackendKind {
    /// All known backends.
    pub const ALL: &'static [BackendKind] = &[BackendKind::Stub];

    /// Returns the name this backend is selected by.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Stub => "stub",
        }
    }

    /// Creates an instance of this backend. `colorize` controls whether the
    /// backend's own terminal output is styled.
    pub fn create(self, colorize: bool) -> Box<dyn Backend> {
        match self {
            BackendKind::Stub => {
                let mut backend = StubBackend::stderr();
                if colorize {
                    backend.colorize();
                }
                Box::new(backend)
            }
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownBackend::new(s))
    }
}

/// Looks up a backend by name and creates an uncolorized instance of it.
pub fn backend_by_name(name: &str) -> Result<Box<dyn Backend>, UnknownBackend> {
    Ok(name.parse::<BackendKind>()?.create(false))
}
