// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capturing results from a running test runner.
//!
//! A test runner hosts a [`ResultCapture`] for the duration of a run and feeds
//! it a [`PhaseReport`] for every setup, call and teardown phase. Capture is
//! opt-in: [`ResultCapture::from_env`] returns `None` unless
//! [`RESULTS_FILE_ENV`] is set, in which case no file is ever created.

mod events;
mod mapper;

pub use events::{Phase, PhaseReport, PhaseStatus};
pub use mapper::EventMapper;

use crate::{
    errors::ResultWriteError,
    record::{Durability, Record, ResultWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the results file. Capture is enabled iff this
/// is set to a non-empty value.
pub const RESULTS_FILE_ENV: &str = "TEST_HARNESS_RESULTS_FILE";

/// Environment variable naming the parallel worker this process runs as.
pub const WORKER_ENV: &str = "TEST_HARNESS_WORKER";

/// Environment variable that, if set to `1` or `true`, syncs every record to
/// the storage device.
pub const RESULTS_SYNC_ENV: &str = "TEST_HARNESS_RESULTS_SYNC";

/// Configuration for capturing results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Where to write the JSON Lines results.
    pub results_path: Utf8PathBuf,

    /// The parallel worker that records are tagged with.
    pub worker: Option<String>,

    /// How durable each record is made before the next test runs.
    pub durability: Durability,
}

impl CaptureConfig {
    /// Creates a new configuration for a single-worker run.
    pub fn new(results_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            worker: None,
            durability: Durability::default(),
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// Returns `None` if [`RESULTS_FILE_ENV`] is unset, empty or not valid
    /// UTF-8.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through a lookup function, such as a map of
    /// environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let results_path = lookup(RESULTS_FILE_ENV).filter(|path| !path.is_empty())?;
        let worker = lookup(WORKER_ENV).filter(|worker| !worker.is_empty());
        let durability = match lookup(RESULTS_SYNC_ENV).as_deref() {
            Some("1" | "true") => Durability::Sync,
            Some("" | "0" | "false") | None => Durability::Flush,
            Some(other) => {
                warn!(
                    "ignoring unrecognized value for {RESULTS_SYNC_ENV}: `{other}` \
                     (expected `1`, `true`, `0` or `false`)"
                );
                Durability::Flush
            }
        };

        Some(Self {
            results_path: results_path.into(),
            worker,
            durability,
        })
    }
}

/// Captures the results of one run: an [`EventMapper`] paired with a
/// [`ResultWriter`].
#[derive(Debug)]
pub struct ResultCapture {
    mapper: EventMapper,
    writer: ResultWriter,
}

impl ResultCapture {
    /// Starts capturing to the configured results file, truncating it.
    ///
    /// Fails immediately if the results file can't be created.
    pub fn new(config: CaptureConfig) -> Result<Self, ResultWriteError> {
        let CaptureConfig {
            results_path,
            worker,
            durability,
        } = config;
        let writer = ResultWriter::create(results_path, durability)?;
        Ok(Self {
            mapper: EventMapper::new(worker),
            writer,
        })
    }

    /// Starts capturing if the environment enables it.
    ///
    /// Returns `Ok(None)` if capture isn't configured.
    pub fn from_env() -> Result<Option<Self>, ResultWriteError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Starts capturing if the configuration read through `lookup` enables it.
    ///
    /// See [`CaptureConfig::from_lookup`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ResultWriteError> {
        match CaptureConfig::from_lookup(lookup) {
            Some(config) => Self::new(config).map(Some),
            None => {
                debug!("{RESULTS_FILE_ENV} not set, result capture disabled");
                Ok(None)
            }
        }
    }

    /// Returns the path to the results file.
    pub fn results_path(&self) -> &Utf8Path {
        self.writer.path()
    }

    /// Observes a phase report, writing a record if it decides a test's outcome.
    ///
    /// Returns the record that was written, if any.
    pub fn report(&mut self, report: &PhaseReport) -> Result<Option<Record>, ResultWriteError> {
        let Some(record) = self.mapper.observe(report) else {
            return Ok(None);
        };
        self.writer.write(&record)?;
        Ok(Some(record))
    }

    /// Finishes capturing and closes the results file.
    ///
    /// Returns the number of records written.
    pub fn finish(mut self) -> usize {
        for identifier in self.mapper.pending() {
            warn!("`{identifier}` finished setup but never reported a result");
        }
        self.writer.close();
        self.writer.records_written()
    }
}
