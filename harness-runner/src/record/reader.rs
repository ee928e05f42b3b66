// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Record;
use crate::errors::{DisplayErrorChain, ReadError, RecordParseError};
use camino::{Utf8Path, Utf8PathBuf};
use debug_ignore::DebugIgnore;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
};
use tracing::{debug, warn};

/// Reads every record in a results file, skipping lines that can't be parsed.
///
/// A missing file produces an empty result: a run that never started has no
/// results, which isn't an error. Each skipped line is logged as a warning and
/// listed in [`ReadResults::skipped`].
pub fn read_results(path: &Utf8Path) -> Result<ReadResults, ReadError> {
    let mut results = ReadResults::default();
    let Some(reader) = ResultReader::open(path)? else {
        debug!(%path, "results file does not exist, treating as empty");
        return Ok(results);
    };

    for line in reader {
        match line? {
            ResultLine::Record(record) => results.records.push(record),
            ResultLine::Malformed(skipped) => {
                warn!(
                    "skipping malformed line {} in `{}`: {}",
                    skipped.line_number,
                    path,
                    DisplayErrorChain::new(&skipped.error),
                );
                results.skipped.push(skipped);
            }
        }
    }

    debug!(
        %path,
        records = results.records.len(),
        skipped = results.skipped.len(),
        "read results file",
    );
    Ok(results)
}

/// The outcome of [`read_results`].
#[derive(Debug, Default)]
pub struct ReadResults {
    /// The records that were read, in file order.
    pub records: Vec<Record>,

    /// Lines that were skipped because they couldn't be parsed.
    pub skipped: Vec<SkippedLine>,
}

/// A line of a results file that couldn't be parsed.
#[derive(Debug)]
pub struct SkippedLine {
    /// The 1-based line number.
    pub line_number: usize,

    /// Why the line couldn't be parsed.
    pub error: RecordParseError,
}

/// A single non-blank line read by a [`ResultReader`].
#[derive(Debug)]
pub enum ResultLine {
    /// The line held a valid record.
    Record(Record),

    /// The line couldn't be parsed.
    Malformed(SkippedLine),
}

/// Iterates over the lines of a results file.
///
/// Each line is parsed independently, so one bad line (for example, the final
/// line of a file cut off by a crash) doesn't affect any other. Blank lines
/// are skipped.
#[derive(Debug)]
pub struct ResultReader {
    path: Utf8PathBuf,
    reader: DebugIgnore<BufReader<File>>,
    line_buf: Vec<u8>,
    line_number: usize,
}

impl ResultReader {
    /// Opens a results file for reading.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn open(path: &Utf8Path) -> Result<Option<Self>, ReadError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(ReadError::Open {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        Ok(Some(Self {
            path: path.to_owned(),
            reader: DebugIgnore(BufReader::new(file)),
            line_buf: Vec::new(),
            line_number: 0,
        }))
    }
}

impl Iterator for ResultReader {
    type Item = Result<ResultLine, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            self.line_number += 1;

            match self.reader.read_until(b'\n', &mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.line_buf.trim_ascii();
                    if line.is_empty() {
                        continue;
                    }
                    let line = match Record::from_json_bytes(line) {
                        Ok(record) => ResultLine::Record(record),
                        Err(error) => ResultLine::Malformed(SkippedLine {
                            line_number: self.line_number,
                            error,
                        }),
                    };
                    return Some(Ok(line));
                }
                Err(error) => {
                    return Some(Err(ReadError::Read {
                        path: self.path.clone(),
                        line_number: self.line_number,
                        error,
                    }));
                }
            }
        }
    }
}
