// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    exit_codes::HarnessExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use camino::Utf8PathBuf;
use harness_runner::errors::{ReadError, ResultWriteError, UploadError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are meant to be printed with
// display_to_stderr, which colorizes them and prints the chain of causes.

/// An error that test-harness knows how to report to the user.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to create temporary directory")]
    TempDirCreateFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("failed to remove stale results file")]
    StaleResultsRemoveFailed {
        path: Utf8PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("results file not found")]
    ResultsFileNotFound { path: Utf8PathBuf },
    #[error("failed to read results")]
    ReadResultsFailed {
        #[from]
        error: ReadError,
    },
    #[error("failed to spawn test command")]
    CommandSpawnFailed {
        command: String,
        #[source]
        error: std::io::Error,
    },
    #[error("failed to capture results")]
    CaptureFailed {
        #[from]
        error: ResultWriteError,
    },
    #[error("failed to read phase reports")]
    ReadReportsFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("upload failed")]
    UploadFailed {
        #[from]
        error: UploadError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::TempDirCreateFailed { .. } | Self::ReadReportsFailed { .. } => {
                HarnessExitCode::SETUP_ERROR
            }
            Self::StaleResultsRemoveFailed { .. }
            | Self::CaptureFailed { .. }
            | Self::ResultsFileNotFound { .. }
            | Self::ReadResultsFailed { .. } => HarnessExitCode::RESULTS_FILE_FAILED,
            Self::CommandSpawnFailed { .. } => HarnessExitCode::COMMAND_SPAWN_FAILED,
            Self::UploadFailed { .. } => HarnessExitCode::UPLOAD_FAILED,
        }
    }

    /// Displays this error to stderr, followed by its chain of causes.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::TempDirCreateFailed { error } => {
                error!("failed to create temporary directory for results");
                Some(error as &dyn Error)
            }
            Self::StaleResultsRemoveFailed { path, error } => {
                error!(
                    "failed to remove stale results file `{}`",
                    path.style(styles.bold)
                );
                Some(error as &dyn Error)
            }
            Self::ResultsFileNotFound { path } => {
                error!("results file `{}` not found", path.style(styles.bold));
                None
            }
            Self::ReadResultsFailed { error } => {
                error!("{error}");
                error.source()
            }
            Self::CaptureFailed { error } => {
                error!("{error}");
                error.source()
            }
            Self::ReadReportsFailed { error } => {
                error!("failed to read phase reports from standard input");
                Some(error as &dyn Error)
            }
            Self::CommandSpawnFailed { command, error } => {
                error!("failed to execute `{}`", command.style(styles.bold));
                Some(error as &dyn Error)
            }
            Self::UploadFailed { error } => {
                error!(
                    "failed to upload results to `{}`",
                    error.backend().style(styles.bold)
                );
                Some(error as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
