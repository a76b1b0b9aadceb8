//! Extended JSON value recognition
//!
//! Documents may carry ObjectIds and dates in two encodings:
//! - plain: a 24-hex-digit string / an RFC 3339 string
//! - extended: `{"$oid": "..."}` / `{"$date": ...}`
//!
//! The canonical stored form is the plain one, with dates rendered in UTC at
//! millisecond precision so that string order equals time order.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Length of an ObjectId in hex digits
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Returns true if `s` is a 24-digit hex string
pub fn is_object_id_hex(s: &str) -> bool {
    s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Extracts the hex digits of an ObjectId in either encoding
pub fn object_id_hex(value: &Value) -> Option<&str> {
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) if map.len() == 1 => map.get("$oid")?.as_str()?,
        _ => return None,
    };
    is_object_id_hex(s).then_some(s)
}

/// Years that render as a four-digit RFC 3339 year
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parses a date in either encoding.
///
/// Dates outside years 0000-9999 are rejected: their canonical form would not
/// parse back or sort as a string.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    parse_any_date(value).filter(|date| YEAR_RANGE.contains(&date.year()))
}

fn parse_any_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_rfc3339(s),
        Value::Object(map) if map.len() == 1 => match map.get("$date")? {
            Value::String(s) => parse_rfc3339(s),
            Value::Number(n) => from_millis(n.as_i64()?),
            Value::Object(inner) => {
                let millis = inner.get("$numberLong")?.as_str()?.parse().ok()?;
                from_millis(millis)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Renders a date in canonical stored form
pub fn canonical_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
