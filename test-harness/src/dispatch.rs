// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts, StderrStyles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use harness_runner::{
    backend::BackendKind,
    capture::{PhaseReport, RESULTS_FILE_ENV, ResultCapture, WORKER_ENV},
    errors::DisplayErrorChain,
    record::{Outcome, ReadResults, Record, read_results},
};
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::{
    io::{self, BufRead},
    process::ExitStatus,
};
use tracing::{debug, info, warn};

/// Run tests with result capture enabled, and upload the captured results.
#[derive(Debug, Parser)]
#[command(version)]
pub struct HarnessApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(subcommand)]
    command: Command,
}

impl HarnessApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        match self.command {
            Command::Run(opts) => opts.exec(output),
            Command::Upload(opts) => opts.exec(output),
            Command::Capture => exec_capture(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a test command with result capture enabled, then upload its results
    ///
    /// The command is run with TEST_HARNESS_RESULTS_FILE set. Once it exits,
    /// the results it captured are read back and uploaded to the backend, and
    /// test-harness exits with the command's exit code.
    Run(RunOpts),

    /// Upload an existing results file without running any tests
    Upload(UploadOpts),

    /// Capture results from phase reports read from standard input
    ///
    /// Each line of input is a JSON phase report for one setup, call or
    /// teardown phase of a test. One result per test is written to the file
    /// named by TEST_HARNESS_RESULTS_FILE. If that is unset or empty, input is
    /// read and discarded, and no file is created.
    ///
    /// Test runners that can't host capture themselves pipe their reports
    /// here, under `test-harness run`.
    Capture,
}

#[derive(Debug, Args)]
struct BackendOpts {
    /// Backend to upload results to
    #[arg(long, default_value_t, env = "TEST_HARNESS_BACKEND", value_name = "NAME")]
    backend: BackendKind,
}

impl BackendOpts {
    fn upload(&self, results: &ReadResults, output: OutputContext) -> Result<()> {
        let mut backend = self.backend.create(output.should_colorize_stderr());
        debug!(
            "uploading {} record(s) to `{}`",
            results.records.len(),
            backend.name()
        );
        backend.upload(&results.records)?;
        Ok(())
    }
}

#[derive(Debug, Args)]
struct RunOpts {
    #[command(flatten)]
    backend: BackendOpts,

    /// Path to write results to [default: a temporary file]
    #[arg(long, value_name = "PATH", env = "TEST_HARNESS_RESULTS_FILE")]
    results_file: Option<Utf8PathBuf>,

    /// Worker identifier to tag results with
    #[arg(long, value_name = "ID", env = "TEST_HARNESS_WORKER")]
    worker: Option<String>,

    /// The test command to run, and its arguments
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl RunOpts {
    fn exec(self, output: OutputContext) -> Result<i32> {
        // The temporary directory, if any, must outlive the upload.
        let (results_path, _temp_dir) = match &self.results_file {
            Some(path) => {
                remove_stale_results(path)?;
                (path.clone(), None)
            }
            None => {
                let temp_dir = camino_tempfile::Builder::new()
                    .prefix("test-harness-")
                    .tempdir()
                    .map_err(|error| ExpectedError::TempDirCreateFailed { error })?;
                (temp_dir.path().join("results.jsonl"), Some(temp_dir))
            }
        };

        let status = self.run_command(&results_path)?;
        let exit_code = exit_code_of(status);
        debug!("test command exited with code {exit_code}");

        let results = read_results(&results_path)?;
        log_results(&results, &results_path, &output.stderr_styles());
        self.backend.upload(&results, output)?;

        Ok(exit_code)
    }

    fn run_command(&self, results_path: &Utf8Path) -> Result<ExitStatus> {
        let command_str = self.command.iter().join(" ");
        let Some((program, args)) = self.command.split_first() else {
            // clap requires at least one value.
            unreachable!("test command is empty");
        };

        let mut expression = duct::cmd(program, args)
            .env(RESULTS_FILE_ENV, results_path.as_str())
            .unchecked();
        if let Some(worker) = &self.worker {
            expression = expression.env(WORKER_ENV, worker);
        }

        debug!("running `{command_str}`, capturing results to `{results_path}`");
        let output = expression
            .run()
            .map_err(|error| ExpectedError::CommandSpawnFailed {
                command: command_str,
                error,
            })?;
        Ok(output.status)
    }
}

#[derive(Debug, Args)]
struct UploadOpts {
    #[command(flatten)]
    backend: BackendOpts,

    /// Results file to upload
    #[arg(value_name = "PATH")]
    path: Utf8PathBuf,
}

impl UploadOpts {
    fn exec(self, output: OutputContext) -> Result<i32> {
        if !self.path.exists() {
            return Err(ExpectedError::ResultsFileNotFound { path: self.path });
        }

        let results = read_results(&self.path)?;
        log_results(&results, &self.path, &output.stderr_styles());
        self.backend.upload(&results, output)?;

        Ok(crate::HarnessExitCode::OK)
    }
}

fn exec_capture() -> Result<i32> {
    let capture = ResultCapture::from_env()?;
    capture_reports(capture, io::stdin().lock())?;
    Ok(crate::HarnessExitCode::OK)
}

/// Feeds phase reports, one JSON object per line, to `capture`.
///
/// Malformed lines are skipped with a warning. Returns the number of records
/// written.
fn capture_reports(capture: Option<ResultCapture>, mut input: impl BufRead) -> Result<usize> {
    let Some(mut capture) = capture else {
        // Keep reading so that whatever writes to us doesn't fail on a closed
        // pipe.
        io::copy(&mut input, &mut io::sink())
            .map_err(|error| ExpectedError::ReadReportsFailed { error })?;
        return Ok(0);
    };

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|error| ExpectedError::ReadReportsFailed { error })?;
        if line.trim().is_empty() {
            continue;
        }
        match PhaseReport::from_json_line(&line) {
            Ok(report) => {
                capture.report(&report)?;
            }
            Err(error) => warn!(
                "skipping malformed phase report on line {}: {}",
                index + 1,
                DisplayErrorChain::new(&error),
            ),
        }
    }

    let results_path = capture.results_path().to_owned();
    let written = capture.finish();
    debug!("captured {written} result(s) to `{results_path}`");
    Ok(written)
}

fn remove_stale_results(path: &Utf8Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("removed stale results file `{path}`");
            Ok(())
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(ExpectedError::StaleResultsRemoveFailed {
            path: path.to_owned(),
            error,
        }),
    }
}

/// Maps the test command's exit status to the code test-harness exits with.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            warn!("test command was terminated by signal {signal}");
            return 128 + signal;
        }
    }

    1
}

fn log_results(results: &ReadResults, path: &Utf8Path, styles: &StderrStyles) {
    if !results.skipped.is_empty() {
        warn!(
            "skipped {} malformed line(s) in `{}`",
            results.skipped.len().style(styles.count),
            path
        );
    }

    let summary = outcome_summary(&results.records, styles);
    if summary.is_empty() {
        info!("no results captured in `{path}`");
    } else {
        info!(
            "captured {} result(s): {summary}",
            results.records.len().style(styles.count)
        );
    }
}

/// Returns a comma-separated count of records per outcome, leaving out
/// outcomes that didn't occur.
fn outcome_summary(records: &[Record], styles: &StderrStyles) -> String {
    let counts = records.iter().map(Record::outcome).counts();
    Outcome::ALL
        .iter()
        .filter_map(|outcome| {
            counts
                .get(outcome)
                .map(|count| format!("{} {outcome}", count.style(styles.count)))
        })
        .join(", ")
}
