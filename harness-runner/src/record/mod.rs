// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result records and the results file.
//!
//! A results file is a UTF-8 [JSON Lines](https://jsonlines.org/) file with one
//! [`Record`] per line, in the format produced by [`Record::to_json_line`].
//!
//! - [`ResultWriter`] appends records to the file as they're produced,
//!   flushing after every record.
//! - [`read_results`] reads the file back, skipping lines that are malformed
//!   (for example, a final line cut short by a crash).

pub(crate) mod codec;
mod model;
mod reader;
mod writer;

pub use model::{Outcome, Record};
pub use reader::{ReadResults, ResultLine, ResultReader, SkippedLine, read_results};
pub use writer::{Durability, ResultWriter};
