// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use chrono::{TimeZone, Utc};
use color_eyre::eyre::Result;
use harness_runner::record::{Durability, Outcome, Record, ResultWriter, read_results};
use std::{process::Output, time::Duration};
use test_harness::HarnessExitCode;

const TEST_HARNESS_BIN: &str = env!("CARGO_BIN_EXE_test-harness");

/// Phase reports for one failing and one skipped test.
const PHASE_REPORTS: &str = r#"{"identifier":"t::a","phase":"setup","status":"passed","duration":0}
{"identifier":"t::a","phase":"call","status":"failed","duration":0.25,"long_representation":"boom"}
{"identifier":"t::a","phase":"teardown","status":"passed","duration":0}
{"identifier":"t::b","phase":"setup","status":"skipped","duration":0}
{"identifier":"t::b","phase":"teardown","status":"passed","duration":0}
"#;

fn test_harness_cmd(args: &[&str]) -> duct::Expression {
    test_harness_cmd_with_env(args, &[])
}

/// Like `test_harness_cmd`, but sets `env` on the child.
///
/// duct gives inner environment settings precedence over outer ones, so these
/// must be applied inside the `env_remove` calls below.
fn test_harness_cmd_with_env(args: &[&str], env: &[(&str, &str)]) -> duct::Expression {
    let mut cmd = duct::cmd(TEST_HARNESS_BIN, args);
    for (name, value) in env {
        cmd = cmd.env(name, value);
    }
    cmd.env_remove("TEST_HARNESS_RESULTS_FILE")
        .env_remove("TEST_HARNESS_WORKER")
        .env_remove("TEST_HARNESS_BACKEND")
        .env_remove("TEST_HARNESS_LOG")
        .stdout_capture()
        .stderr_capture()
        .unchecked()
}

fn test_harness(args: &[&str]) -> Result<Output> {
    Ok(test_harness_cmd(args).run()?)
}

fn write_sample_results(dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = dir.join("sample.jsonl");
    let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut writer = ResultWriter::create(&path, Durability::Flush)?;
    for (identifier, outcome) in [
        ("tests/test_a.py::test_ok", Outcome::Passed),
        ("tests/test_a.py::test_fail", Outcome::Failed),
        ("tests/test_a.py::test_skip", Outcome::Skipped),
    ] {
        writer.write(&Record::new(identifier, outcome, Duration::ZERO, timestamp))?;
    }
    Ok(path)
}

#[test]
fn upload_existing_file() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = write_sample_results(dir.path())?;

    let output = test_harness(&["--color", "never", "upload", path.as_str()])?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(HarnessExitCode::OK), "{stderr}");
    assert!(
        stderr.contains("info: captured 3 result(s): 1 passed, 1 failed, 1 skipped"),
        "{stderr}"
    );
    assert!(
        stderr.contains("StubBackend: would upload 3 result(s)"),
        "{stderr}"
    );
    Ok(())
}

#[test]
fn upload_missing_file() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("missing.jsonl");

    let output = test_harness(&["--color", "never", "upload", path.as_str()])?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(
        output.status.code(),
        Some(HarnessExitCode::RESULTS_FILE_FAILED),
        "{stderr}"
    );
    assert!(stderr.contains("error: results file"), "{stderr}");
    Ok(())
}

#[test]
fn run_spawn_failure() -> Result<()> {
    let output = test_harness(&["run", "--", "test-harness-no-such-command"])?;
    assert_eq!(
        output.status.code(),
        Some(HarnessExitCode::COMMAND_SPAWN_FAILED)
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_uploads_and_forwards_exit_code() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let sample = write_sample_results(dir.path())?;
    let results = dir.path().join("results.jsonl");
    // Stands in for a test runner: copy captured results to wherever
    // test-harness asked for them, then fail.
    let script = format!("cp '{sample}' \"$TEST_HARNESS_RESULTS_FILE\" && exit 3");

    let output = test_harness(&[
        "--color",
        "never",
        "run",
        "--results-file",
        results.as_str(),
        "--",
        "sh",
        "-c",
        &script,
    ])?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(3), "{stderr}");
    assert!(
        stderr.contains("StubBackend: would upload 3 result(s)"),
        "{stderr}"
    );
    assert_eq!(std::fs::read(&results)?, std::fs::read(&sample)?);
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_without_captured_results() -> Result<()> {
    let output = test_harness(&["--color", "never", "run", "--", "true"])?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(0), "{stderr}");
    assert!(stderr.contains("info: no results captured"), "{stderr}");
    assert!(
        stderr.contains("StubBackend: would upload 0 result(s)"),
        "{stderr}"
    );
    Ok(())
}

#[test]
fn capture_without_results_file_creates_nothing() -> Result<()> {
    let dir = Utf8TempDir::new()?;

    let output = test_harness_cmd(&["capture"])
        .dir(dir.path())
        .stdin_bytes(PHASE_REPORTS)
        .run()?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(HarnessExitCode::OK), "{stderr}");
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0, "no file created");
    Ok(())
}

#[test]
fn capture_writes_one_result_per_test() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("results.jsonl");

    let output = test_harness_cmd_with_env(
        &["capture"],
        &[
            ("TEST_HARNESS_RESULTS_FILE", path.as_str()),
            ("TEST_HARNESS_WORKER", "gw0"),
        ],
    )
        .stdin_bytes(PHASE_REPORTS)
        .run()?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(HarnessExitCode::OK), "{stderr}");

    let results = read_results(&path)?;
    let summary: Vec<_> = results
        .records
        .iter()
        .map(|record| (record.identifier(), record.outcome(), record.worker()))
        .collect();
    assert_eq!(
        summary,
        [
            ("t::a", Outcome::Failed, Some("gw0")),
            ("t::b", Outcome::Skipped, Some("gw0")),
        ]
    );
    assert_eq!(results.records[0].long_representation(), Some("boom"));
    Ok(())
}

#[test]
fn capture_to_unwritable_path_fails() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("missing").join("results.jsonl");

    let output = test_harness_cmd_with_env(
        &["--color", "never", "capture"],
        &[("TEST_HARNESS_RESULTS_FILE", path.as_str())],
    )
        .stdin_bytes(PHASE_REPORTS)
        .run()?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(
        output.status.code(),
        Some(HarnessExitCode::RESULTS_FILE_FAILED),
        "{stderr}"
    );
    assert!(stderr.contains("error creating results file"), "{stderr}");
    Ok(())
}

#[test]
fn run_hosts_capture() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let path = dir.path().join("results.jsonl");

    // The nested capture inherits stdin, and the results file, from run.
    let output = test_harness_cmd(&[
        "--color",
        "never",
        "run",
        "--results-file",
        path.as_str(),
        "--",
        TEST_HARNESS_BIN,
        "capture",
    ])
    .stdin_bytes(PHASE_REPORTS)
    .run()?;
    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(output.status.code(), Some(HarnessExitCode::OK), "{stderr}");
    assert!(
        stderr.contains("info: captured 2 result(s): 1 failed, 1 skipped"),
        "{stderr}"
    );
    assert!(
        stderr.contains("StubBackend: would upload 2 result(s)"),
        "{stderr}"
    );
    assert_eq!(read_results(&path)?.records.len(), 2);
    Ok(())
}
