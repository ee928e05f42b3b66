// Copyright (c) The test-harness Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The JSON Lines schema for result records.
//!
//! Each record is one JSON object on a single line, with keys in this order:
//!
//! ```text
//! {"identifier":"t::a","outcome":"passed","duration":0.005,"timestamp":"2026-01-01T00:00:00.000000+00:00","long_representation":null,"worker":null}
//! ```
//!
//! * `duration` is a number of seconds with at most 6 fractional digits, no
//!   larger than [`Record::MAX_DURATION`].
//! * `timestamp` is an RFC 3339 timestamp in UTC with exactly 6 fractional
//!   digits. Years outside 0000-9999 are written with a sign, as in
//!   `+10000-01-01T00:00:00.000000+00:00`.
//! * `long_representation` and `worker` are `null` when absent. Readers also
//!   accept them being missing entirely.
//!
//! Unknown keys are ignored.

use super::Record;
use crate::errors::{DecodeError, RecordParseError, SchemaError};
use serde_json::error::Category;

impl Record {
    /// Serializes this record to a single line of JSON, without a trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a record from a single line of JSON.
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn from_json_line(line: &str) -> Result<Self, RecordParseError> {
        serde_json::from_str(line.trim()).map_err(classify_json_error)
    }

    /// Parses a record from a single line of raw bytes, which must be UTF-8.
    pub fn from_json_bytes(line: &[u8]) -> Result<Self, RecordParseError> {
        let line = std::str::from_utf8(line).map_err(DecodeError::InvalidUtf8)?;
        Self::from_json_line(line)
    }
}

/// Splits serde_json errors into syntax problems and schema problems.
pub(crate) fn classify_json_error(error: serde_json::Error) -> RecordParseError {
    match error.classify() {
        Category::Data => SchemaError::new(error).into(),
        Category::Syntax | Category::Eof | Category::Io => DecodeError::Json(error).into(),
    }
}

pub(crate) mod duration_secs {
    use crate::record::model::MAX_DURATION_MICROS;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    const MICROS_PER_SEC: f64 = 1_000_000.0;

    pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Durations are normalized to whole microseconds, so this is exact to 6
        // decimal places.
        serializer.serialize_f64(duration.as_micros() as f64 / MICROS_PER_SEC)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(D::Error::custom(format_args!(
                "invalid duration {secs}: expected a non-negative number of seconds"
            )));
        }

        let micros = (secs * MICROS_PER_SEC).round();
        if micros > MAX_DURATION_MICROS as f64 {
            return Err(D::Error::custom(format_args!(
                "invalid duration {secs}: longer than {} seconds",
                MAX_DURATION_MICROS as f64 / MICROS_PER_SEC,
            )));
        }
        Ok(Duration::from_micros(micros as u64))
    }
}

pub(super) mod timestamp_micros {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::borrow::Cow;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

    pub(crate) fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(FORMAT))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        // RFC 3339 has no room for signed or 5-digit years, which are written
        // in FORMAT's extended form.
        let timestamp = DateTime::parse_from_rfc3339(&s)
            .or_else(|error| DateTime::parse_from_str(&s, FORMAT).map_err(|_| error))
            .map_err(|error| D::Error::custom(format_args!("invalid timestamp `{s}`: {error}")))?;
        Ok(timestamp.with_timezone(&Utc).trunc_subsecs(6))
    }
}
