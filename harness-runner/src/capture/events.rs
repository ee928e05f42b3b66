// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::RecordParseError,
    record::codec::{classify_json_error, duration_secs},
};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// A phase of a single test's execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Fixtures and preconditions are being prepared.
    Setup,
    /// The test body is running.
    Call,
    /// Fixtures are being torn down.
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Call => f.write_str("call"),
            Phase::Teardown => f.write_str("teardown"),
        }
    }
}

/// How a single phase of a test ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// The phase completed successfully.
    Passed,
    /// The phase raised an error or an assertion failed.
    Failed,
    /// The phase was skipped, or it requested that the test be skipped.
    Skipped,
}

/// A report for one phase of one test, as produced by the host test runner.
///
/// Runners that can't link against this crate send reports as JSON lines
/// instead, for example:
///
/// ```text
/// {"identifier":"t::a","phase":"call","status":"failed","duration":0.123,"long_representation":"assert 1 == 2"}
/// ```
///
/// `duration` is in seconds. `long_representation` and `expected_failure` may
/// be omitted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PhaseReport {
    /// The identifier of the test.
    pub identifier: String,

    /// The phase this report is for.
    pub phase: Phase,

    /// How the phase ended.
    pub status: PhaseStatus,

    /// How long the phase took.
    #[serde(with = "duration_secs")]
    pub duration: Duration,

    /// Diagnostic text produced by the phase, if any.
    #[serde(default)]
    pub long_representation: Option<String>,

    /// The expected-failure marker: set if the test is expected to fail, with
    /// the reason given (possibly empty).
    #[serde(default)]
    pub expected_failure: Option<String>,
}

impl PhaseReport {
    /// Creates a new report without diagnostic text or an expected-failure marker.
    pub fn new(
        identifier: impl Into<String>,
        phase: Phase,
        status: PhaseStatus,
        duration: Duration,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            phase,
            status,
            duration,
            long_representation: None,
            expected_failure: None,
        }
    }

    /// Attaches diagnostic text to this report.
    pub fn with_long_representation(mut self, long_representation: impl Into<String>) -> Self {
        self.long_representation = Some(long_representation.into());
        self
    }

    /// Marks this report's test as expected to fail, for the given reason.
    pub fn with_expected_failure(mut self, reason: impl Into<String>) -> Self {
        self.expected_failure = Some(reason.into());
        self
    }

    /// Returns true if the test carries the expected-failure marker.
    pub fn is_expected_failure(&self) -> bool {
        self.expected_failure.is_some()
    }

    /// Parses a report from a single line of JSON.
    pub fn from_json_line(line: &str) -> Result<Self, RecordParseError> {
        serde_json::from_str(line.trim()).map_err(classify_json_error)
    }

    /// Serializes this report to a single line of JSON, without a trailing
    /// newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
