//! Comparison operands and literal parsing for textual filters.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Result, WebhdfsError};

use super::keys::{SearchKey, ValueKind, SEARCH_KEYS};

/// Right-hand side of a search expression as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Number(i64),
    Text(String),
}

impl Operand {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Parses a raw literal for `key`: numbers for numeric keys, text otherwise.
    ///
    /// Size keys accept unit suffixes (`512k`, `1.5g`), `mtime` accepts epoch
    /// milliseconds or a `YYYY-MM-DD[THH:MM:SS]` / RFC 3339 timestamp (UTC).
    pub fn parse_for(key: SearchKey, raw: &str) -> Result<Self> {
        let field = SEARCH_KEYS.get(&key)?;
        match field.kind {
            ValueKind::Text => Ok(Self::Text(raw.to_string())),
            ValueKind::Number => match key {
                SearchKey::Size | SearchKey::RawSize | SearchKey::SpaceQuota => {
                    parse_size_literal(raw).map(Self::Number)
                }
                SearchKey::Mtime => parse_time_literal(raw).map(Self::Number),
                _ => parse_integer_literal(raw).map(Self::Number),
            },
        }
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u32> for Operand {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

fn parse_integer_literal(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| WebhdfsError::InvalidInput(format!("expected an integer, got {raw:?}")))
}

/// Parses a byte count with an optional binary unit suffix.
pub fn parse_size_literal(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WebhdfsError::InvalidInput(
            "size: expected a number".to_string(),
        ));
    }

    let split = trimmed
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == '.' || *ch == '-'))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    let (number_part, unit_part) = trimmed.split_at(split);
    if number_part.is_empty() {
        return Err(WebhdfsError::InvalidInput(format!(
            "size: expected a numeric value in {raw:?}"
        )));
    }

    let multiplier = size_unit_multiplier(unit_part)?;
    if let Ok(whole) = number_part.parse::<i64>() {
        return whole.checked_mul(multiplier).ok_or_else(|| {
            WebhdfsError::InvalidInput(format!("size: value {raw:?} is out of range"))
        });
    }

    let value: f64 = number_part.parse().map_err(|_| {
        WebhdfsError::InvalidInput(format!("size: failed to parse number in {raw:?}"))
    })?;
    let bytes = (value * multiplier as f64).round();
    if !bytes.is_finite() || bytes.abs() > i64::MAX as f64 {
        return Err(WebhdfsError::InvalidInput(format!(
            "size: value {raw:?} is out of range"
        )));
    }
    Ok(bytes as i64)
}

fn size_unit_multiplier(unit: &str) -> Result<i64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => Ok(1),
        "k" | "kb" | "kib" => Ok(1024),
        "m" | "mb" | "mib" => Ok(1024 * 1024),
        "g" | "gb" | "gib" => Ok(1024 * 1024 * 1024),
        "t" | "tb" | "tib" => Ok(1024_i64.pow(4)),
        "p" | "pb" | "pib" => Ok(1024_i64.pow(5)),
        _ => Err(WebhdfsError::InvalidInput(format!(
            "unknown size unit: {unit}"
        ))),
    }
}

/// Parses a modification-time literal into epoch milliseconds.
pub fn parse_time_literal(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if let Ok(millis) = trimmed.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.timestamp_millis());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(timestamp.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp_millis());
        }
    }
    Err(WebhdfsError::InvalidInput(format!(
        "mtime: expected epoch millis or a date, got {raw:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_literals_accept_units() {
        assert_eq!(parse_size_literal("100").unwrap(), 100);
        assert_eq!(parse_size_literal("4k").unwrap(), 4096);
        assert_eq!(parse_size_literal("1G").unwrap(), 1_073_741_824);
        assert_eq!(parse_size_literal("1.5m").unwrap(), 1_572_864);
        assert!(parse_size_literal("12 parsecs").is_err());
        assert!(parse_size_literal("").is_err());
    }

    #[test]
    fn time_literals_accept_dates() {
        assert_eq!(parse_time_literal("1361834603000").unwrap(), 1_361_834_603_000);
        assert_eq!(parse_time_literal("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(
            parse_time_literal("2013-02-25T23:23:23").unwrap(),
            1_361_834_603_000
        );
        assert_eq!(
            parse_time_literal("2013-02-25T23:23:23+00:00").unwrap(),
            1_361_834_603_000
        );
        assert!(parse_time_literal("last tuesday").is_err());
    }

    #[test]
    fn parse_for_follows_key_kind() {
        assert_eq!(
            Operand::parse_for(SearchKey::Size, "2k").unwrap(),
            Operand::Number(2048)
        );
        assert_eq!(
            Operand::parse_for(SearchKey::Repl, "3").unwrap(),
            Operand::Number(3)
        );
        assert_eq!(
            Operand::parse_for(SearchKey::Owner, "hdfs").unwrap(),
            Operand::Text("hdfs".to_string())
        );
        assert!(Operand::parse_for(SearchKey::Repl, "three").is_err());
    }
}
