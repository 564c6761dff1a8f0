//! Claim timestamps.
//!
//! Claims carry RFC3339 strings with at most millisecond precision. Trailing
//! zeros of the fraction are dropped, and so is the dot when nothing is left,
//! so a whole second renders as `2024-12-11T15:11:11Z`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{NaspipError, Result};

/// Current time truncated to whole milliseconds.
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

/// Drop any sub-millisecond precision from `instant`.
pub fn truncate_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// Render `instant` as an RFC3339 claim timestamp in UTC.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use naspip_lib::timestamp::format_rfc3339_millis;
///
/// let at = Utc.with_ymd_and_hms(2024, 12, 11, 15, 11, 11).unwrap();
/// assert_eq!(format_rfc3339_millis(at), "2024-12-11T15:11:11Z");
/// ```
pub fn format_rfc3339_millis(instant: DateTime<Utc>) -> String {
    let rendered = instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    let Some(body) = rendered.strip_suffix('Z') else {
        return rendered;
    };
    match body.split_once('.') {
        Some((seconds, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{seconds}Z")
            } else {
                format!("{seconds}.{fraction}Z")
            }
        }
        None => format!("{body}Z"),
    }
}

/// Parse an RFC3339 timestamp with any offset, normalised to UTC.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| NaspipError::InvalidTimestamp(value.to_string()))
}
