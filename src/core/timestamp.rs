// TimeTrail - core/timestamp.rs
//
// Normalisation of the calendar timestamps embedded in operations.
// Core layer: pure string-to-string conversion, no I/O.
//
// Raw form:       2020-OCTOBER-5 12:1:30.2715742 UTC
// Canonical form: 2020-10-05T12:01:30.2715742 +0000
//
// The analyser prints 100 ns ticks (7 fractional digits). The calendar
// value is resolved to microseconds and the seventh digit is carried over
// verbatim from the raw fraction so no precision is lost.

use crate::core::grammar::{self, OperationMatch};
use crate::util::error::ParseError;
use chrono::{FixedOffset, NaiveDateTime, Timelike};

/// chrono format of the calendar portion. `%B` accepts upper-case month names.
const RAW_CALENDAR_FORMAT: &str = "%Y-%B-%d %H:%M:%S%.f";

fn malformed(raw: &str, reason: impl Into<String>) -> ParseError {
    ParseError::MalformedTimestamp {
        line_number: None,
        raw_timestamp: raw.to_string(),
        reason: reason.into(),
    }
}

/// Resolve a time-zone label to a fixed offset.
///
/// The analyser emits UTC. Other labels are ambiguous without a zone
/// database, so no offset is guessed for them.
fn zone_offset(label: &str) -> Option<FixedOffset> {
    match label {
        "UTC" | "UT" | "GMT" | "Z" => FixedOffset::east_opt(0),
        _ => None,
    }
}

/// Convert one raw timestamp token to its canonical representation.
///
/// Only the calendar portion can make this fail. An unrecognised zone
/// label leaves the offset empty (`2020-10-05T12:01:30.2715742 `); the
/// calendar value is kept as written.
pub fn normalize_timestamp(raw: &str) -> Result<String, ParseError> {
    let (calendar, zone) = raw
        .trim()
        .rsplit_once(' ')
        .ok_or_else(|| malformed(raw, "missing time zone label"))?;

    let naive = NaiveDateTime::parse_from_str(calendar, RAW_CALENDAR_FORMAT)
        .map_err(|e| malformed(raw, e.to_string()))?;

    if naive.nanosecond() >= 1_000_000_000 {
        return Err(malformed(raw, "leap seconds are not supported"));
    }

    let last_digit = calendar
        .rsplit_once('.')
        .and_then(|(_, fraction)| fraction.chars().last())
        .filter(char::is_ascii_digit)
        .ok_or_else(|| malformed(raw, "missing fractional seconds"))?;

    let offset_label = match zone_offset(zone) {
        Some(offset) => naive
            .and_local_timezone(offset)
            .single()
            .map(|local| local.format("%z").to_string())
            .ok_or_else(|| malformed(raw, "ambiguous local time"))?,
        None => {
            tracing::debug!(zone, raw, "Unrecognised time zone label; offset left empty");
            String::new()
        }
    };

    Ok(format!(
        "{}.{:06}{} {}",
        naive.format("%Y-%m-%dT%H:%M:%S"),
        naive.nanosecond() / 1_000,
        last_digit,
        offset_label
    ))
}

/// Build the `<TIMESTAMP ...>` label for a matched operation.
///
/// One timestamp: `<TIMESTAMP ts (Kind)>`.
/// Two timestamps: `<TIMESTAMP ts1 - ts2 (Kind)>`.
pub fn format_operation_timestamp(op: &OperationMatch<'_>) -> Result<String, ParseError> {
    let first = normalize_timestamp(op.first_timestamp)?;
    match op.second_timestamp {
        Some(raw) => {
            let second = normalize_timestamp(raw)?;
            Ok(format!("<TIMESTAMP {first} - {second} ({})>", op.kind))
        }
        None => Ok(format!("<TIMESTAMP {first} ({})>", op.kind)),
    }
}

/// Build the `<TIMESTAMP ...>` label for a bare operation string.
pub fn operation_timestamp(operation: &str) -> Result<String, ParseError> {
    let op = grammar::parse_operation(operation)
        .ok_or_else(|| malformed(operation, "operation does not match the grammar"))?;
    format_operation_timestamp(&op)
}
