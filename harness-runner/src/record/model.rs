// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::codec::{duration_secs, timestamp_micros};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// The outcome of a single test invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    /// The test passed.
    Passed,
    /// The test failed in its call phase.
    Failed,
    /// The test was skipped.
    Skipped,
    /// The test errored during setup or teardown.
    Error,
    /// The test was expected to fail, and did.
    Xfailed,
    /// The test was expected to fail, but passed.
    Xpassed,
}

impl Outcome {
    /// All outcomes, in declaration order.
    pub const ALL: [Outcome; 6] = [
        Outcome::Passed,
        Outcome::Failed,
        Outcome::Skipped,
        Outcome::Error,
        Outcome::Xfailed,
        Outcome::Xpassed,
    ];

    /// Returns the on-disk name of this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
            Outcome::Error => "error",
            Outcome::Xfailed => "xfailed",
            Outcome::Xpassed => "xpassed",
        }
    }

    /// Returns true if records with this outcome carry a long representation
    /// (diagnostic text).
    pub fn carries_long_representation(self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Error)
    }

    /// Returns true if this outcome should make a run be considered failing.
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Error)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed test outcome.
///
/// Records are immutable once built: the fields are only readable through
/// accessors. Construction normalizes `duration` and `timestamp` to whole
/// microseconds, which is the precision of the serialized form. This makes
/// serialization lossless for every record.
///
/// Only [`Outcome::Failed`] and [`Outcome::Error`] records are expected to
/// carry a long representation. This isn't enforced here: a record carrying
/// one for another outcome still serializes and round-trips unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Record {
    identifier: String,
    outcome: Outcome,
    #[serde(with = "duration_secs")]
    #[cfg_attr(test, strategy(crate::test_helpers::arb_duration_micros()))]
    duration: Duration,
    #[serde(with = "timestamp_micros")]
    #[cfg_attr(test, strategy(crate::test_helpers::arb_timestamp_micros()))]
    timestamp: DateTime<Utc>,
    long_representation: Option<String>,
    worker: Option<String>,
}

impl Record {
    /// The longest duration a record can hold, 2^48 - 1 microseconds (a little
    /// under 9 years).
    ///
    /// Every duration up to this bound is written and read back exactly as an
    /// `f64` number of seconds. Longer durations are clamped to it.
    pub const MAX_DURATION: Duration = Duration::from_micros(MAX_DURATION_MICROS);

    /// Creates a new record without a long representation or worker.
    ///
    /// The duration is rounded to the nearest microsecond and clamped to
    /// [`Self::MAX_DURATION`]. The timestamp is truncated to microseconds.
    pub fn new(
        identifier: impl Into<String>,
        outcome: Outcome,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            outcome,
            duration: round_to_micros(duration),
            timestamp: timestamp.trunc_subsecs(6),
            long_representation: None,
            worker: None,
        }
    }

    /// Sets the long representation (diagnostic text) for this record.
    pub fn with_long_representation(mut self, long_representation: Option<String>) -> Self {
        self.long_representation = long_representation;
        self
    }

    /// Sets the identifier of the worker that produced this record.
    pub fn with_worker(mut self, worker: Option<String>) -> Self {
        self.worker = worker;
        self
    }

    /// The identifier of the test, unique within a run.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The outcome of the test.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// How long the deciding phase of the test took.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// When this record was produced.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Diagnostic text, for failed and errored tests.
    pub fn long_representation(&self) -> Option<&str> {
        self.long_representation.as_deref()
    }

    /// The worker that produced this record, if execution was parallel.
    pub fn worker(&self) -> Option<&str> {
        self.worker.as_deref()
    }
}

pub(super) const MAX_DURATION_MICROS: u64 = (1 << 48) - 1;

/// Rounds a duration to the nearest microsecond, clamping to
/// [`Record::MAX_DURATION`].
fn round_to_micros(duration: Duration) -> Duration {
    let micros = (duration.as_nanos().saturating_add(500) / 1000)
        .min(u128::from(MAX_DURATION_MICROS));
    Duration::from_micros(micros as u64)
}
