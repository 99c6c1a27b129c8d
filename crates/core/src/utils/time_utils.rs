use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::errors::{Error, Result};

/// Parses a timestamp as it may arrive from either delivery channel.
///
/// Accepts RFC 3339 text, naive ISO-8601 text (assumed UTC) and integer
/// epoch milliseconds written as text. The result is always UTC so that two
/// timestamps can be compared regardless of how they were transported.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidTimestamp("empty timestamp".to_string()));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    if let Ok(millis) = trimmed.parse::<i64>() {
        return from_epoch_millis(millis);
    }

    Err(Error::InvalidTimestamp(trimmed.to_string()))
}

/// Converts epoch milliseconds into a UTC timestamp.
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidTimestamp(format!("epoch millis out of range: {millis}")))
}

/// Formats a timestamp the way it is sent on the wire.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for timestamps that may arrive as text or epoch millis.
pub mod flexible_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
        Float(f64),
    }

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => super::parse_timestamp(&text).map_err(de::Error::custom),
            RawTimestamp::Millis(millis) => {
                super::from_epoch_millis(millis).map_err(de::Error::custom)
            }
            RawTimestamp::Float(millis) if millis.is_finite() => {
                super::from_epoch_millis(millis.trunc() as i64).map_err(de::Error::custom)
            }
            RawTimestamp::Float(_) => Err(de::Error::custom("timestamp is not a finite number")),
        }
    }
}
