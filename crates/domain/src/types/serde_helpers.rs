//! Serde adapters for backend date formats
//!
//! The backend sends period bounds either as plain dates or as full
//! ISO-8601 timestamps (`2024-04-01T00:00:00.000Z`). Both decode to the UTC
//! calendar date; output is always `YYYY-MM-DD`.

/// `NaiveDate` that also accepts RFC 3339 timestamps
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveDate, String> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc().date())
            .map_err(|err| format!("invalid date '{raw}': {err}"))
    }
}
