// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, TimeZone, Utc};
use harness_runner::{
    capture::{Phase, PhaseReport, PhaseStatus},
    record::{Outcome, Record},
};
use std::time::Duration;

pub(crate) fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// One passing, one failing and one skipped test.
pub(crate) fn sample_records() -> Vec<Record> {
    vec![
        Record::new(
            "tests/test_a.py::test_ok",
            Outcome::Passed,
            Duration::from_millis(5),
            fixed_timestamp(),
        ),
        Record::new(
            "tests/test_a.py::test_fail",
            Outcome::Failed,
            Duration::from_millis(123),
            fixed_timestamp(),
        )
        .with_long_representation(Some("assert 1 == 2".to_owned())),
        Record::new(
            "tests/test_a.py::test_skip",
            Outcome::Skipped,
            Duration::ZERO,
            fixed_timestamp(),
        ),
    ]
}

/// The phase reports a test runner would produce for [`sample_records`].
pub(crate) fn sample_reports() -> Vec<PhaseReport> {
    let ok = "tests/test_a.py::test_ok";
    let fail = "tests/test_a.py::test_fail";
    let skip = "tests/test_a.py::test_skip";
    let quick = Duration::from_micros(150);

    vec![
        PhaseReport::new(ok, Phase::Setup, PhaseStatus::Passed, quick),
        PhaseReport::new(ok, Phase::Call, PhaseStatus::Passed, Duration::from_millis(5)),
        PhaseReport::new(ok, Phase::Teardown, PhaseStatus::Passed, quick),
        PhaseReport::new(fail, Phase::Setup, PhaseStatus::Passed, quick),
        PhaseReport::new(fail, Phase::Call, PhaseStatus::Failed, Duration::from_millis(123))
            .with_long_representation("assert 1 == 2"),
        PhaseReport::new(fail, Phase::Teardown, PhaseStatus::Passed, quick),
        PhaseReport::new(skip, Phase::Setup, PhaseStatus::Skipped, Duration::ZERO)
            .with_long_representation("Skipped: unconditional skip"),
        PhaseReport::new(skip, Phase::Teardown, PhaseStatus::Passed, quick),
    ]
}
