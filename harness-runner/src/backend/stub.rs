// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Backend;
use crate::{errors::UploadError, record::Record};
use debug_ignore::DebugIgnore;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

/// A backend that reports how many records it would upload, and nothing else.
///
/// Used for local runs.
#[derive(Debug)]
pub struct StubBackend {
    output: DebugIgnore<Box<dyn Write + Send>>,
    style: Style,
}

impl StubBackend {
    /// Creates a stub backend that writes to stderr.
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Creates a stub backend that writes to the given output.
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output: DebugIgnore(output),
            style: Style::new(),
        }
    }

    /// Dims the output, for terminals that support color.
    pub fn colorize(&mut self) {
        self.style = Style::new().dimmed();
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn upload(&mut self, records: &[Record]) -> Result<(), UploadError> {
        let message = format!("StubBackend: would upload {} result(s)", records.len());
        writeln!(self.output, "{}", message.style(self.style))
            .map_err(|error| UploadError::new(self.name(), records.len(), error))
    }
}
