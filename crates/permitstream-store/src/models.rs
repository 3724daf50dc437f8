use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::StoreError;

/// Fixed column set of the persisted snapshot format.
pub const SNAPSHOT_COLUMNS: [&str; 6] = [
    "permit_number",
    "address",
    "permit_type",
    "value",
    "issued_date",
    "status",
];

const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Formats a calendar day as `YYYY-MM-DD`.
pub fn format_day(day: Date) -> String {
    day.format(&DAY_FORMAT)
        .unwrap_or_else(|_| day.to_string())
}

/// Parses a `YYYY-MM-DD` day string.
pub fn parse_day(value: &str) -> Result<Date, StoreError> {
    Date::parse(value, &DAY_FORMAT).map_err(|_| StoreError::InvalidDay(value.to_owned()))
}

/// Serde helpers for `Option<Date>` in the `YYYY-MM-DD` snapshot format.
mod serde_opt_day {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(day) => serializer.serialize_some(&super::format_day(*day)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(text) => super::parse_day(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// One observed government permit.
///
/// `permit_number` may be empty when the upstream source has no stable
/// identifier; the dedup filter synthesizes one in that case. Records are
/// immutable once produced and are persisted as dated snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermitRecord {
    pub source_id: String,
    pub permit_number: String,
    pub address: String,
    pub permit_type: String,
    pub estimated_value: Option<f64>,
    /// Issue day as reported upstream; carried-forward snapshots keep the
    /// original value even under a fresh day label.
    #[serde(with = "serde_opt_day")]
    pub issue_date: Option<Date>,
    pub status: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub scraped_at: OffsetDateTime,
}

/// Persistence row matching [`SNAPSHOT_COLUMNS`]; `source_id` and
/// `scraped_at` live in the snapshot key, not the row.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotRow {
    permit_number: String,
    address: String,
    permit_type: String,
    value: Option<f64>,
    #[serde(with = "serde_opt_day")]
    issued_date: Option<Date>,
    status: Option<String>,
}

impl SnapshotRow {
    pub(crate) fn from_record(record: &PermitRecord) -> Self {
        Self {
            permit_number: record.permit_number.clone(),
            address: record.address.clone(),
            permit_type: record.permit_type.clone(),
            value: record.estimated_value,
            issued_date: record.issue_date,
            status: record.status.clone(),
        }
    }

    pub(crate) fn into_record(self, source_id: &str, day: Date) -> PermitRecord {
        PermitRecord {
            source_id: source_id.to_owned(),
            permit_number: self.permit_number,
            address: self.address,
            permit_type: self.permit_type,
            estimated_value: self.value,
            issue_date: self.issued_date,
            status: self.status,
            scraped_at: day.midnight().assume_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn day_round_trips_through_format_and_parse() {
        let day = date!(2026 - 08 - 24);
        let formatted = format_day(day);
        assert_eq!(formatted, "2026-08-24");
        assert_eq!(parse_day(&formatted).expect("valid day"), day);
    }

    #[test]
    fn parse_day_rejects_non_dates() {
        assert!(parse_day("not-a-day").is_err());
        assert!(parse_day("2026-13-01").is_err());
    }

    #[test]
    fn row_conversion_preserves_fields() {
        let day = date!(2026 - 01 - 15);
        let record = PermitRecord {
            source_id: String::from("nashville"),
            permit_number: String::from("CASE-1"),
            address: String::from("123 Main St, Nashville, TN"),
            permit_type: String::from("NEW CONSTRUCTION"),
            estimated_value: Some(125_000.0),
            issue_date: Some(date!(2026 - 01 - 10)),
            status: Some(String::from("ISSUED")),
            scraped_at: day.midnight().assume_utc(),
        };

        let row = SnapshotRow::from_record(&record);
        let restored = row.into_record("nashville", day);
        assert_eq!(restored, record);
    }
}
