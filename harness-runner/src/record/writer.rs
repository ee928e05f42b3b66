// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Record;
use crate::errors::ResultWriteError;
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fs::File,
    io::{self, Write},
};
use tracing::{debug, warn};

/// How hard [`ResultWriter::write`] works to make each record durable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Durability {
    /// Each record is handed to the operating system before `write` returns.
    ///
    /// Records survive the process crashing or being killed.
    #[default]
    Flush,

    /// Each record is additionally synced to the storage device.
    ///
    /// Records survive the machine losing power, at a cost per record.
    Sync,
}

/// Appends records to a JSON Lines results file.
///
/// There's no buffering across calls to [`write`](Self::write): every record
/// is a separate durability point, so a crash leaves all previously written
/// records intact.
///
/// The file is closed by [`close`](Self::close) or, failing that, on drop.
#[derive(Debug)]
pub struct ResultWriter {
    path: Utf8PathBuf,
    // None once closed.
    file: Option<File>,
    durability: Durability,
    records_written: usize,
}

impl ResultWriter {
    /// Creates the results file at `path`, truncating any existing file.
    pub fn create(
        path: impl Into<Utf8PathBuf>,
        durability: Durability,
    ) -> Result<Self, ResultWriteError> {
        let path = path.into();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .map_err(|error| ResultWriteError::Create {
                path: path.clone(),
                error,
            })?;
        debug!(%path, ?durability, "opened results file");

        Ok(Self {
            path,
            file: Some(file),
            durability,
            records_written: 0,
        })
    }

    /// Returns the path to the results file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Returns true if [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Appends a record as a single line, then flushes it.
    ///
    /// If writing or flushing fails, the writer is closed and every later
    /// call returns [`ResultWriteError::Closed`].
    pub fn write(&mut self, record: &Record) -> Result<(), ResultWriteError> {
        let mut line = record
            .to_json_line()
            .map_err(|error| ResultWriteError::Serialize {
                identifier: record.identifier().to_owned(),
                error,
            })?;
        line.push('\n');

        let Some(file) = self.file.as_mut() else {
            return Err(ResultWriteError::Closed {
                path: self.path.clone(),
            });
        };

        // A single write_all keeps the line contiguous, so a crash can at worst
        // truncate the final line.
        let result = file
            .write_all(line.as_bytes())
            .map_err(|error| ResultWriteError::Write {
                path: self.path.clone(),
                error,
            })
            .and_then(|()| {
                flush_file(file, self.durability).map_err(|error| ResultWriteError::Flush {
                    path: self.path.clone(),
                    error,
                })
            });
        if let Err(error) = result {
            // A failed write may leave part of a line behind. Anything appended
            // after it would be unreadable, so stop writing.
            warn!(path = %self.path, "closing results file after failed write");
            self.close();
            return Err(error);
        }

        self.records_written += 1;
        Ok(())
    }

    /// Closes the results file.
    ///
    /// Calling this more than once has no further effect.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            debug!(
                path = %self.path,
                records_written = self.records_written,
                "closed results file",
            );
            // Every write was already flushed, so there's nothing left to lose here.
            std::mem::drop(file);
        }
    }
}

impl Drop for ResultWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn flush_file(file: &mut File, durability: Durability) -> io::Result<()> {
    file.flush()?;
    match durability {
        Durability::Flush => Ok(()),
        Durability::Sync => file.sync_data(),
    }
}
