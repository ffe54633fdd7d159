//! crates/travel_planner_core/src/codec.rs
//!
//! Text formats shared by the HTTP layer and the storage adapter: the fixed
//! date/instant formats of the public API, and the JSON-as-text encoding used
//! for structured columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::ports::PortError;

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const INSTANT_FORMAT_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid timestamp '{0}', expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidInstant(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid JSON column: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CodecError> for PortError {
    fn from(err: CodecError) -> Self {
        PortError::Unexpected(err.to_string())
    }
}

/// Parses a UTC instant, with or without fractional seconds.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, CodecError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT_FRACTIONAL))
        .map(|naive| naive.and_utc())
        .map_err(|_| CodecError::InvalidInstant(raw.to_string()))
}

/// Formats an instant without fractional seconds.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CodecError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| CodecError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serializes a structured field into the text stored in its column.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Inverse of [`encode_json`].
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, TimeZone};
    use serde_json::{json, Map, Value};

    #[test]
    fn parses_instant_without_fraction() {
        let parsed = parse_instant("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_instant_with_microseconds() {
        let parsed = parse_instant("2024-03-10T12:30:45.123456Z").unwrap();
        assert_eq!(parsed.second(), 45);
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn formats_instant_without_fraction() {
        let parsed = parse_instant("2024-03-10T12:30:45.999999Z").unwrap();
        assert_eq!(format_instant(&parsed), "2024-03-10T12:30:45Z");
    }

    #[test]
    fn rejects_instant_without_zone_marker() {
        assert!(matches!(
            parse_instant("2024-01-01 00:00:00"),
            Err(CodecError::InvalidInstant(_))
        ));
        assert!(parse_instant("2024-01-01").is_err());
    }

    #[test]
    fn date_round_trips() {
        let date = parse_date("2024-01-05").unwrap();
        assert_eq!(format_date(&date), "2024-01-05");
        assert!(matches!(parse_date("05/01/2024"), Err(CodecError::InvalidDate(_))));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn structured_columns_decode_to_what_was_encoded() {
        let days = json!([
            {"day": 1, "places": [{"name": "Gyeongbokgung", "time": "10:00"}]},
            {"day": 2, "places": []}
        ]);
        let text = encode_json(&days).unwrap();
        let decoded: Value = decode_json(&text).unwrap();
        assert_eq!(decoded, days);

        let mut extra = Map::new();
        extra.insert("weather".into(), json!({"forecast": "sunny"}));
        let decoded: Map<String, Value> = decode_json(&encode_json(&extra).unwrap()).unwrap();
        assert_eq!(decoded, extra);
    }

    #[test]
    fn tag_order_is_preserved() {
        let tags = vec!["jazz".to_string(), "ballad".to_string(), "indie".to_string()];
        let decoded: Vec<String> = decode_json(&encode_json(&tags).unwrap()).unwrap();
        assert_eq!(decoded, tags);
    }

    #[test]
    fn corrupt_column_is_an_error() {
        assert!(matches!(decode_json::<Vec<String>>("[\"a\","), Err(CodecError::Json(_))));
    }
}
