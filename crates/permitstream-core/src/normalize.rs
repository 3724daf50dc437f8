//! Tolerant field normalization for upstream payloads.
//!
//! Every helper here returns `Option` rather than an error: a record with
//! an unparsable value or date is still a usable lead, so malformed fields
//! degrade to `None` instead of dropping the record or failing the batch.

use serde_json::Value;
use time::{Date, OffsetDateTime};

use permitstream_store::parse_day;

/// How a source encodes its issue date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateEncoding {
    /// Milliseconds since the Unix epoch, as a JSON number.
    EpochMillis,
    /// ISO-8601 string; anything after the calendar day is ignored.
    Iso8601,
}

/// Parses an upstream issue date value using the source's encoding.
pub fn parse_issue_date(value: &Value, encoding: DateEncoding) -> Option<Date> {
    match encoding {
        DateEncoding::EpochMillis => {
            let millis = value.as_i64().or_else(|| {
                value.as_str().and_then(|s| s.trim().parse::<i64>().ok())
            })?;
            OffsetDateTime::from_unix_timestamp(millis / 1000)
                .ok()
                .map(OffsetDateTime::date)
        }
        DateEncoding::Iso8601 => {
            let text = value.as_str()?.trim();
            let day_part = text.get(..10).unwrap_or(text);
            parse_day(day_part).ok()
        }
    }
}

/// Parses a currency amount that may arrive as a JSON number or a string
/// with `$`, commas, or surrounding whitespace.
pub fn parse_currency(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|ch| *ch != '$' && *ch != ',')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Extracts a trimmed, non-empty string field.
pub fn parse_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
