// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test helpers and proptest strategies.

use crate::record::Record;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
    time::Duration,
};

/// The timestamp used by deterministic tests: 2026-01-01T00:00:00Z.
pub(crate) fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Strategy for durations with microsecond precision, up to and including
/// [`Record::MAX_DURATION`].
pub(crate) fn arb_duration_micros() -> impl Strategy<Value = Duration> {
    let max_micros = Record::MAX_DURATION.as_micros() as u64;
    prop_oneof![
        1 => Just(Record::MAX_DURATION),
        9 => (0..=max_micros).prop_map(Duration::from_micros),
    ]
}

/// Strategy for UTC timestamps with microsecond precision.
///
/// Covers years from about -100 to 12000, so that signed and 5-digit years
/// are exercised.
pub(crate) fn arb_timestamp_micros() -> impl Strategy<Value = DateTime<Utc>> {
    (-65_000_000_000i64..320_000_000_000i64, 0u32..1_000_000).prop_map(|(secs, micros)| {
        Utc.timestamp_opt(secs, micros * 1000)
            .single()
            .expect("valid timestamp")
    })
}

/// An in-memory writer whose clones all share the same buffer.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    /// Returns everything written so far, as a string.
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("output is valid UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with `tracing` events at `WARN` and above formatted into the
/// returned buffer.
pub(crate) fn with_captured_warnings<T>(f: impl FnOnce() -> T) -> (T, SharedBuf) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .without_time()
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buf)
}
