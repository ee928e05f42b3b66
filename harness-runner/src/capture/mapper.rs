// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::events::{Phase, PhaseReport, PhaseStatus};
use crate::record::{Outcome, Record};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Turns per-phase reports into exactly one [`Record`] per test.
///
/// The mapper tracks, for every test it has seen, whether a record has been
/// produced yet. A test's record is produced by whichever phase first decides
/// its outcome:
///
/// * a skipped or failed setup phase;
/// * otherwise, the call phase;
/// * otherwise, a failed teardown phase.
///
/// Every later report for the same test is ignored.
#[derive(Debug, Default)]
pub struct EventMapper {
    worker: Option<String>,
    tests: HashMap<String, TestState>,
    emitted: usize,
}

impl EventMapper {
    /// Creates a new mapper. Records are tagged with `worker`, if provided.
    pub fn new(worker: Option<String>) -> Self {
        Self {
            worker,
            tests: HashMap::new(),
            emitted: 0,
        }
    }

    /// Observes a phase report, returning a record timestamped now if this
    /// report decides the test's outcome.
    pub fn observe(&mut self, report: &PhaseReport) -> Option<Record> {
        self.observe_at(report, Utc::now())
    }

    /// Observes a phase report, returning a record with the given timestamp if
    /// this report decides the test's outcome.
    pub fn observe_at(&mut self, report: &PhaseReport, timestamp: DateTime<Utc>) -> Option<Record> {
        if let Some(TestState::Done) = self.tests.get(&report.identifier) {
            if report.phase == Phase::Teardown && report.status == PhaseStatus::Failed {
                debug!(
                    "teardown of `{}` failed after its outcome was recorded, not recording again",
                    report.identifier,
                );
            } else if report.phase != Phase::Teardown {
                debug!(
                    "ignoring {} report for `{}`: its outcome was already recorded",
                    report.phase, report.identifier,
                );
            }
            return None;
        }

        match decide_transition(report.phase, report.status, report.is_expected_failure()) {
            Transition::AwaitCall => {
                self.tests
                    .insert(report.identifier.clone(), TestState::AwaitingCall);
                None
            }
            Transition::Ignore => None,
            Transition::Emit(outcome) => {
                self.tests.insert(report.identifier.clone(), TestState::Done);
                self.emitted += 1;

                let long_representation = if outcome.carries_long_representation() {
                    report.long_representation.clone()
                } else {
                    None
                };
                Some(
                    Record::new(report.identifier.clone(), outcome, report.duration, timestamp)
                        .with_long_representation(long_representation)
                        .with_worker(self.worker.clone()),
                )
            }
        }
    }

    /// Returns the number of records produced so far.
    pub fn emitted_count(&self) -> usize {
        self.emitted
    }

    /// Returns the tests whose setup passed but which haven't produced a
    /// record yet, in arbitrary order.
    pub fn pending(&self) -> impl Iterator<Item = &str> + '_ {
        self.tests.iter().filter_map(|(identifier, state)| {
            (*state == TestState::AwaitingCall).then_some(identifier.as_str())
        })
    }
}

/// Per-test state. Tests without an entry haven't completed setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TestState {
    AwaitingCall,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    /// Setup passed: wait for the call phase.
    AwaitCall,
    /// This report decides the test's outcome.
    Emit(Outcome),
    /// This report doesn't affect the test's outcome.
    Ignore,
}

/// The decision table for a report on a test that has no record yet.
fn decide_transition(phase: Phase, status: PhaseStatus, expected_failure: bool) -> Transition {
    use PhaseStatus::*;

    match (phase, status) {
        (Phase::Setup, Passed) => Transition::AwaitCall,
        // Expected failures whose condition isn't met at setup are reported as
        // skips carrying the marker.
        (Phase::Setup, Skipped) if expected_failure => Transition::Emit(Outcome::Xfailed),
        (Phase::Setup, Skipped) => Transition::Emit(Outcome::Skipped),
        // Setup failures are errors, never failures.
        (Phase::Setup, Failed) => Transition::Emit(Outcome::Error),

        (Phase::Call, Passed) if expected_failure => Transition::Emit(Outcome::Xpassed),
        (Phase::Call, Failed | Skipped) if expected_failure => Transition::Emit(Outcome::Xfailed),
        (Phase::Call, Passed) => Transition::Emit(Outcome::Passed),
        (Phase::Call, Failed) => Transition::Emit(Outcome::Failed),
        (Phase::Call, Skipped) => Transition::Emit(Outcome::Skipped),

        (Phase::Teardown, Failed) => Transition::Emit(Outcome::Error),
        (Phase::Teardown, Passed | Skipped) => Transition::Ignore,
    }
}
