// ww3nml/src/validators.rs

//! Date and numeric validators shared by every namelist block.
//!
//! WW3 reads dates as fixed-width `YYYYMMDD HHMMSS` strings. Every date field
//! in this crate goes through [`validate_date_format`], either directly or via
//! the [`Ww3Date`] newtype.

use crate::error::{DateFormatError, Result, Ww3Error};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CANONICAL_FORMAT: &str = "%Y%m%d %H%M%S";
const DATESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

lazy_static! {
    static ref COMPACT_DATE: Regex = Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})[ _]([0-9]{2})([0-9]{2})([0-9]{2})$").unwrap();
    static ref ISO_DATE: Regex =
        Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[ T]([0-9]{2}):([0-9]{2}):([0-9]{2})$").unwrap();
}

/// Anything a date field may be given as.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::DateTime(value.naive_utc())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl From<&String> for DateInput {
    fn from(value: &String) -> Self {
        DateInput::Text(value.clone())
    }
}

fn parse_date_input(input: DateInput) -> std::result::Result<NaiveDateTime, DateFormatError> {
    let text = match input {
        DateInput::DateTime(value) => return Ok(value),
        DateInput::Text(text) => text,
    };

    let captures = COMPACT_DATE
        .captures(&text)
        .or_else(|| ISO_DATE.captures(&text))
        .ok_or_else(|| DateFormatError::Shape {
            value: text.clone(),
        })?;

    let field = |i: usize| -> u32 { captures[i].parse().unwrap_or(u32::MAX) };
    let year = captures[1].parse::<i32>().unwrap_or(i32::MAX);

    let date = NaiveDate::from_ymd_opt(year, field(2), field(3)).ok_or_else(|| {
        DateFormatError::Calendar {
            value: text.clone(),
            reason: format!(
                "{}-{}-{} is not a calendar date",
                &captures[1], &captures[2], &captures[3]
            ),
        }
    })?;
    let time = NaiveTime::from_hms_opt(field(4), field(5), field(6)).ok_or_else(|| {
        DateFormatError::Calendar {
            value: text.clone(),
            reason: format!(
                "{}:{}:{} is not a valid time of day",
                &captures[4], &captures[5], &captures[6]
            ),
        }
    })?;

    Ok(NaiveDateTime::new(date, time))
}

/// Validate a date and return it in canonical `YYYYMMDD HHMMSS` form.
///
/// Accepts native date-times or text as `YYYYMMDD HHMMSS`, `YYYYMMDD_HHMMSS`,
/// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn validate_date_format<D: Into<DateInput>>(
    value: D,
) -> std::result::Result<String, DateFormatError> {
    Ok(Ww3Date::new(value)?.to_string())
}

/// Like [`validate_date_format`] but returns the `YYYYMMDD_HHMMSS` stamp used
/// in file names.
pub fn normalize_datestamp<D: Into<DateInput>>(
    value: D,
) -> std::result::Result<String, DateFormatError> {
    Ok(Ww3Date::new(value)?.datestamp())
}

/// A validated WW3 date, displayed as `YYYYMMDD HHMMSS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ww3Date(NaiveDateTime);

impl Ww3Date {
    pub fn new<D: Into<DateInput>>(value: D) -> std::result::Result<Self, DateFormatError> {
        parse_date_input(value.into()).map(Ww3Date)
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// `YYYYMMDD_HHMMSS`
    pub fn datestamp(&self) -> String {
        self.0.format(DATESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for Ww3Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for Ww3Date {
    type Err = DateFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ww3Date::new(s)
    }
}

impl From<NaiveDateTime> for Ww3Date {
    fn from(value: NaiveDateTime) -> Self {
        Ww3Date(value)
    }
}

impl Serialize for Ww3Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ww3Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;
        let raw = String::deserialize(deserializer)?;
        Ww3Date::new(raw).map_err(D::Error::custom)
    }
}

/// A stride or count given as a number, a numeric string or a humantime
/// duration (`"1h"`, `"30m"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StrideInput {
    Number(i64),
    Text(String),
}

impl From<i64> for StrideInput {
    fn from(value: i64) -> Self {
        StrideInput::Number(value)
    }
}

impl From<u64> for StrideInput {
    fn from(value: u64) -> Self {
        StrideInput::Number(value.min(i64::MAX as u64) as i64)
    }
}

impl From<i32> for StrideInput {
    fn from(value: i32) -> Self {
        StrideInput::Number(value as i64)
    }
}

impl From<&str> for StrideInput {
    fn from(value: &str) -> Self {
        StrideInput::Text(value.to_string())
    }
}

impl From<String> for StrideInput {
    fn from(value: String) -> Self {
        StrideInput::Text(value)
    }
}

/// Normalize a stride to whole seconds, rejecting zero and negative values.
pub fn validate_stride<S: Into<StrideInput>>(value: S) -> Result<u64> {
    let invalid = |raw: String, reason: &str| {
        Ww3Error::validation("stride", &["STRIDE"], format!("{} ({:?})", reason, raw))
    };

    let seconds = match value.into() {
        StrideInput::Number(n) => n,
        StrideInput::Text(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    let duration = humantime::parse_duration(trimmed).map_err(|_| {
                        invalid(text.clone(), "not a number of seconds or a duration")
                    })?;
                    i64::try_from(duration.as_secs())
                        .map_err(|_| invalid(text.clone(), "duration is too long"))?
                }
            }
        }
    };

    if seconds <= 0 {
        return Err(invalid(seconds.to_string(), "stride must be > 0"));
    }
    Ok(seconds as u64)
}

/// Serde adapter for stride fields: accepts anything [`validate_stride`] does.
pub mod stride {
    use super::{validate_stride, StrideInput};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        use serde::de::Error;
        validate_stride(StrideInput::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub mod option {
        use super::super::{validate_stride, StrideInput};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            use serde::de::Error;
            match Option::<StrideInput>::deserialize(deserializer)? {
                Some(raw) => validate_stride(raw).map(Some).map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// Normalize a count given as a number or a numeric string, rejecting zero
/// and negative values.
pub fn validate_count<S: Into<StrideInput>>(value: S) -> Result<u64> {
    let invalid = |raw: String, reason: &str| {
        Ww3Error::validation("count", &["COUNT"], format!("{} ({:?})", reason, raw))
    };

    let count = match value.into() {
        StrideInput::Number(n) => n,
        StrideInput::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(text.clone(), "not a whole number"))?,
    };

    if count <= 0 {
        return Err(invalid(count.to_string(), "count must be > 0"));
    }
    Ok(count as u64)
}

/// Serde adapter for optional count fields: accepts anything
/// [`validate_count`] does.
pub mod count {
    pub mod option {
        use super::super::{validate_count, StrideInput};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            use serde::de::Error;
            match Option::<StrideInput>::deserialize(deserializer)? {
                Some(raw) => validate_count(raw).map(Some).map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// Fail unless `value` is finite.
pub fn ensure_finite(block: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Ww3Error::validation(
            block,
            &[field],
            format!("{} must be finite, got {}", field, value),
        ));
    }
    Ok(())
}

/// Fail unless `value` is finite and strictly positive.
pub fn ensure_positive(block: &str, field: &str, value: f64) -> Result<()> {
    ensure_finite(block, field, value)?;
    if value <= 0.0 {
        return Err(Ww3Error::validation(
            block,
            &[field],
            format!("{} must be > 0, got {}", field, value),
        ));
    }
    Ok(())
}

/// Fail when a required text field is empty or blank.
pub fn ensure_not_blank(block: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Ww3Error::validation(
            block,
            &[field],
            format!("{} must not be empty", field),
        ));
    }
    Ok(())
}

/// Fail unless `start` is strictly before `stop`.
pub fn ensure_ordered(
    block: &str,
    start_field: &str,
    stop_field: &str,
    start: &Ww3Date,
    stop: &Ww3Date,
) -> Result<()> {
    if start >= stop {
        return Err(Ww3Error::validation(
            block,
            &[start_field, stop_field],
            format!(
                "{} ({}) must be before {} ({})",
                start_field, start, stop_field, stop
            ),
        ));
    }
    Ok(())
}
