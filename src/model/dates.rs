//! Timestamp normalization
//!
//! Health exports mix two timestamp encodings:
//! - `2025-11-12 09:00:00 -0500` (space separated, numeric offset)
//! - RFC 3339 (`2025-11-12T09:00:00Z`)
//!
//! Both parse into a `DateTime<FixedOffset>`. The offset carried by the
//! source string is kept as-is; nothing is converted to UTC.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use thiserror::Error;

/// Space-separated layout with a numeric timezone offset
pub const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A timestamp string matched none of the accepted layouts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized timestamp {input:?} (expected \"YYYY-MM-DD HH:MM:SS ±ZZZZ\" or RFC 3339)")]
pub struct DateParseError {
    pub input: String,
}

impl DateParseError {
    /// Leading text of every rendered `DateParseError`
    pub const PREFIX: &'static str = "unrecognized timestamp";
}

/// Parse a timestamp, trying the export layout first and RFC 3339 second.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    if let Ok(dt) = DateTime::parse_from_str(input, EXPORT_FORMAT) {
        return Ok(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    Err(DateParseError {
        input: input.to_string(),
    })
}

/// Render a timestamp as RFC 3339, using `Z` for a zero offset
pub fn format_rfc3339(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde adapter for timestamp fields: lenient on input, RFC 3339 on output
pub mod flexible {
    use super::{format_rfc3339, parse_timestamp};
    use chrono::{DateTime, FixedOffset};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_rfc3339(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
