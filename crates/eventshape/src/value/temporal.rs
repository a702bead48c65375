//! Timestamp parsing shared by the analyzer and the timestamp validator.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::as_number;
use crate::schema::TimestampFormat;

static ISO_8601: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]{1,9})?(?:Z|[+-][0-9]{2}:[0-9]{2})?$",
    )
    .expect("ISO 8601 pattern is valid")
});

// Epochs beyond this magnitude are not plausible timestamps in any unit.
const MAX_EPOCH_MAGNITUDE: f64 = 1e17;

/// Strictly parse an ISO 8601 date-time. Values without an offset are UTC.
pub fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    if !ISO_8601.is_match(text) {
        return None;
    }

    // The date part is fixed-width ASCII, so anything after it is the fraction or offset.
    let has_offset = text.ends_with('Z')
        || text.get(19..).is_some_and(|rest| rest.contains(['+', '-']));
    if has_offset {
        return DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }

    let format = if text.contains('.') {
        "%Y-%m-%dT%H:%M:%S%.f"
    } else {
        "%Y-%m-%dT%H:%M:%S"
    };
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Epoch seconds of a raw value interpreted in the given format.
///
/// Millisecond values keep their fractional part until the final floor.
pub fn epoch_seconds(value: &Value, format: TimestampFormat) -> Option<i64> {
    match format {
        TimestampFormat::Iso8601 => match value {
            Value::String(s) => parse_iso8601(s.trim()).map(|dt| dt.timestamp()),
            _ => None,
        },
        TimestampFormat::UnixSeconds => number_to_epoch(as_number(value)?),
        TimestampFormat::UnixMillis => number_to_epoch(as_number(value)? / 1000.0),
    }
}

fn number_to_epoch(seconds: f64) -> Option<i64> {
    if seconds.abs() > MAX_EPOCH_MAGNITUDE {
        return None;
    }
    Some(seconds.floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_iso_variants() {
        assert!(parse_iso8601("2024-01-15T10:00:00Z").is_some());
        assert!(parse_iso8601("2024-01-16T11:30:00+00:00").is_some());
        assert!(parse_iso8601("2024-01-16T11:30:00.123456-05:00").is_some());
        assert!(parse_iso8601("2024-01-16T11:30:00").is_some());
        assert!(parse_iso8601("2024-01-16T11:30:00.5").is_some());
    }

    #[test]
    fn test_parse_iso_rejects() {
        assert!(parse_iso8601("not-a-date").is_none());
        assert!(parse_iso8601("2024-01-16").is_none());
        assert!(parse_iso8601("2024-01-16 11:30:00").is_none());
        assert!(parse_iso8601("2024-13-01T00:00:00Z").is_none());
        assert!(parse_iso8601("2024-02-30T00:00:00Z").is_none());
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits are two bytes each in UTF-8.
        assert!(parse_iso8601("2024-01-15T10:0\u{0660}:\u{0660}\u{0660}+00:00").is_none());
        assert!(parse_iso8601("2024-01-15T10:0\u{0660}:\u{0660}\u{0660}Z").is_none());
        assert!(parse_iso8601("\u{0662}\u{0660}\u{0662}\u{0664}-01-15T10:00:00").is_none());
        assert_eq!(
            epoch_seconds(
                &json!("2024-01-15T10:00:00.\u{0661}\u{0662}-05:00"),
                TimestampFormat::Iso8601
            ),
            None
        );
    }

    #[test]
    fn test_offset_is_applied() {
        let utc = parse_iso8601("2024-01-15T10:00:00Z").unwrap();
        let shifted = parse_iso8601("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(utc, shifted);
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(
            epoch_seconds(&json!(1_705_312_800), TimestampFormat::UnixSeconds),
            Some(1_705_312_800)
        );
        assert_eq!(
            epoch_seconds(&json!("1705312800123.5"), TimestampFormat::UnixMillis),
            Some(1_705_312_800)
        );
        assert_eq!(
            epoch_seconds(&json!("2024-01-15T10:00:00Z"), TimestampFormat::Iso8601),
            Some(1_705_312_800)
        );
        assert_eq!(epoch_seconds(&json!("abc"), TimestampFormat::UnixSeconds), None);
        assert_eq!(epoch_seconds(&json!(1e300), TimestampFormat::UnixSeconds), None);
    }
}
