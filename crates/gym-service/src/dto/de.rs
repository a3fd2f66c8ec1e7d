//! Lenient field deserializers for request bodies
//!
//! Front-desk forms send dates either as full RFC 3339 instants or as plain
//! `YYYY-MM-DD` (read as midnight UTC), and indexes either as numbers or as
//! numeric strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Parse an RFC 3339 instant or a `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

pub fn date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Number(u64),
    Text(String),
}

pub fn index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match IndexRepr::deserialize(deserializer)? {
        IndexRepr::Number(n) => n,
        IndexRepr::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("invalid index: {s}")))?,
    };
    usize::try_from(value).map_err(|_| de::Error::custom("index out of range"))
}
