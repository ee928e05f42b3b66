// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs a test command with result capture enabled, then uploads the captured
//! results to a backend.
//!
//! This crate implements the `test-harness` binary. The capture, storage and
//! upload logic lives in [`harness_runner`].

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::HarnessApp;
#[doc(hidden)]
pub use errors::ExpectedError;
pub use exit_codes::HarnessExitCode;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
