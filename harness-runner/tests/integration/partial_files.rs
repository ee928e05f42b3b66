// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results files left behind by runs that didn't finish cleanly.

use crate::fixtures::sample_records;
use camino_tempfile::Utf8TempDir;
use color_eyre::eyre::Result;
use harness_runner::{
    capture::{CaptureConfig, Phase, PhaseReport, PhaseStatus, ResultCapture},
    errors::RecordParseError,
    record::{Durability, ResultLine, ResultReader, ResultWriter, read_results},
};
use pretty_assertions::assert_eq;
use std::{io::Write, time::Duration};

#[test]
fn crash_mid_write_keeps_earlier_records() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("results.jsonl");
    let records = sample_records();

    let mut writer = ResultWriter::create(&path, Durability::Flush)?;
    writer.write(&records[0])?;
    writer.write(&records[1])?;
    // Simulate the process dying partway through the third line.
    std::mem::forget(writer);
    let third = records[2].to_json_line()?;
    let mut file = std::fs::OpenOptions::new().append(true).open(&path)?;
    file.write_all(&third.as_bytes()[..third.len() / 2])?;
    drop(file);

    let results = read_results(&path)?;
    assert_eq!(results.records, &records[..2]);
    assert_eq!(results.skipped.len(), 1);
    assert_eq!(results.skipped[0].line_number, 3);
    assert!(
        matches!(results.skipped[0].error, RecordParseError::Decode(_)),
        "truncated line is a decode error: {:?}",
        results.skipped[0].error
    );
    Ok(())
}

#[test]
fn records_survive_abandoned_capture() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("results.jsonl");
    let mut capture = ResultCapture::new(CaptureConfig::new(&path))?;

    let id = "tests/test_b.py::test_done";
    for phase in [Phase::Setup, Phase::Call] {
        capture.report(&PhaseReport::new(id, phase, PhaseStatus::Passed, Duration::ZERO))?;
    }
    capture.report(&PhaseReport::new(
        "tests/test_b.py::test_hangs",
        Phase::Setup,
        PhaseStatus::Passed,
        Duration::ZERO,
    ))?;

    // The record for the first test is on disk before the run ends.
    let results = read_results(&path)?;
    assert_eq!(results.records.len(), 1);
    assert_eq!(results.records[0].identifier(), id);

    // A test that never got past setup produces nothing.
    assert_eq!(capture.finish(), 1);
    assert_eq!(read_results(&path)?.records.len(), 1);
    Ok(())
}

#[test]
fn streaming_reader_reports_each_line() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("results.jsonl");
    let records = sample_records();

    let mut contents = String::new();
    contents.push_str(&records[0].to_json_line()?);
    contents.push_str("\n\nNOT JSON\n");
    contents.push_str(&records[1].to_json_line()?);
    contents.push('\n');
    std::fs::write(&path, contents)?;

    let reader = ResultReader::open(&path)?.expect("file exists");
    let lines = reader.collect::<Result<Vec<_>, _>>()?;
    let summary: Vec<_> = lines
        .iter()
        .map(|line| match line {
            ResultLine::Record(record) => format!("record {}", record.identifier()),
            ResultLine::Malformed(skipped) => format!("malformed line {}", skipped.line_number),
        })
        .collect();
    assert_eq!(
        summary,
        [
            "record tests/test_a.py::test_ok",
            "malformed line 3",
            "record tests/test_a.py::test_fail",
        ]
    );
    Ok(())
}
