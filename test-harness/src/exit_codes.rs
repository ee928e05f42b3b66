// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `test-harness` failures.
///
/// If the test command ran and its results were uploaded, `test-harness run`
/// exits with the test command's own exit code. The codes here are used when
/// test-harness itself fails.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum HarnessExitCode {}

impl HarnessExitCode {
    /// No errors occurred and test-harness exited normally.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a test-harness invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// The results file could not be prepared, written or read back.
    pub const RESULTS_FILE_FAILED: i32 = 97;

    /// Uploading results to the backend failed.
    pub const UPLOAD_FAILED: i32 = 98;

    /// The test command could not be started.
    pub const COMMAND_SPAWN_FAILED: i32 = 99;
}
