// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `test-harness`.
//!
//! The basic flow is:
//!
//! 1. A test runner hosts a [`capture::ResultCapture`], built from a
//!    [`capture::CaptureConfig`]. Capture is opt-in: without a configured
//!    results path, nothing is recorded.
//! 2. For every setup, call and teardown phase the runner reports a
//!    [`capture::PhaseReport`]. The [`capture::EventMapper`] collapses the
//!    phases of each test into exactly one [`record::Record`], which is
//!    appended to a JSON Lines file by the [`record::ResultWriter`].
//! 3. Once the run is over, [`record::read_results`] reads the file back,
//!    skipping any malformed lines, and a [`backend::Backend`] uploads the
//!    records.

pub mod backend;
pub mod capture;
pub mod errors;
pub mod record;
#[cfg(test)]
mod test_helpers;
