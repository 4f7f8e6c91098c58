//! ISO-8601 and decimal-seconds helpers shared by the setters and the
//! version bridge.
//!
//! Timestamps are carried on the wire as text. Parsing accepts
//! offset-carrying RFC 3339 values as well as naive date-time and date-only
//! forms; naive values are interpreted as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use mockable::Clock;
use serde_json::Value;

use crate::message::error::{TiipError, json_type_name};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Renders the clock's current local time as ISO-8601 text, offset included.
pub(crate) fn now(clock: &impl Clock) -> String {
    format(&clock.local().fixed_offset())
}

/// Renders a date-time as ISO-8601 text, keeping its UTC offset.
pub(crate) fn format(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parses ISO-8601 text into a date-time.
///
/// Naive (offsetless) values are interpreted as UTC.
pub(crate) fn parse(text: &str) -> Result<DateTime<FixedOffset>, TiipError> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Ok(value);
    }
    if let Ok(naive) = text.parse::<NaiveDateTime>() {
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = text.parse::<NaiveDate>() {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(TiipError::UnparseableTimestamp(text.to_owned()))
}

/// Renders an epoch-seconds value as ISO-8601 UTC text.
pub(crate) fn from_epoch(seconds: f64) -> Result<String, TiipError> {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "epoch microseconds of any representable date fit in i64"
    )]
    let micros = (seconds * MICROS_PER_SECOND).round() as i64;
    DateTime::from_timestamp_micros(micros)
        .map(|value| format(&value.fixed_offset()))
        .ok_or_else(|| TiipError::UnparseableTimestamp(render_seconds(seconds)))
}

/// Parses ISO-8601 text and returns its epoch-seconds value.
pub(crate) fn to_epoch(text: &str) -> Result<f64, TiipError> {
    let value = parse(text)?;
    #[expect(
        clippy::cast_precision_loss,
        reason = "sub-microsecond precision is beyond the wire format"
    )]
    let seconds = value.timestamp_micros() as f64 / MICROS_PER_SECOND;
    Ok(seconds)
}

/// Reads a decimal epoch-seconds value from legacy wire data, held under
/// `key`.
///
/// The legacy generation carried epoch timestamps as decimal strings, but
/// plain JSON numbers are tolerated as well.
pub(crate) fn parse_epoch_value(key: &'static str, value: &Value) -> Result<f64, TiipError> {
    match value {
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| TiipError::UnparseableTimestamp(text.clone())),
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| TiipError::UnparseableTimestamp(number.to_string())),
        other => Err(TiipError::InvalidLegacyType {
            key,
            expected: "a decimal-seconds string or number",
            actual: json_type_name(other),
        }),
    }
}

/// Shortest round-trippable decimal rendering of a seconds value.
pub(crate) fn render_seconds(seconds: f64) -> String {
    format!("{seconds}")
}

/// Rounds a latency to 6 decimal places and renders it as decimal text.
pub(crate) fn render_latency(seconds: f64) -> String {
    render_seconds((seconds * MICROS_PER_SECOND).round() / MICROS_PER_SECOND)
}
