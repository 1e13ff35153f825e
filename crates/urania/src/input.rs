//! Validation of the free-text birth submission.
//!
//! Each field must match a fixed pattern; nothing is parsed leniently.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ephemeris::CivilInstant;
use crate::error::ChartError;

lazy_static::lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").unwrap();
    static ref TIME_RE: Regex =
        Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?$").unwrap();
    static ref LOCATION_RE: Regex = Regex::new(
        r"^[\p{L}][\p{L}\p{M} .'\-]{0,79}(?:,\s*[\p{L}][\p{L}\p{M} .'\-]{0,39})?$"
    )
    .unwrap();
}

pub const DATE_PATTERN: &str = "DD.MM.YYYY";
pub const TIME_PATTERN: &str = "HH:MM or HH:MM:SS";
pub const LOCATION_PATTERN: &str = "a place name, optionally followed by \", country\"";

/// A validated birth record in local civil time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    pub instant: CivilInstant,
    pub location: String,
}

impl BirthData {
    pub fn parse(date: &str, time: &str, location: &str) -> Result<Self, ChartError> {
        let (year, month, day) = parse_date(date)?;
        let (hour, minute, second) = parse_time(time)?;
        let location = parse_location(location)?;
        let instant = CivilInstant::new(year, month, day, hour, minute, second)
            .map_err(|_| ChartError::invalid_input("date", date, "an existing calendar day"))?;
        Ok(Self { instant, location })
    }
}

/// `DD.MM.YYYY` into (year, month, day).
pub fn parse_date(date: &str) -> Result<(i32, u32, u32), ChartError> {
    let date = date.trim();
    let caps = DATE_RE
        .captures(date)
        .ok_or_else(|| ChartError::invalid_input("date", date, DATE_PATTERN))?;
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year: i32 = caps[3].parse().unwrap_or(0);
    if chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(ChartError::invalid_input(
            "date",
            date,
            "an existing calendar day in DD.MM.YYYY",
        ));
    }
    Ok((year, month, day))
}

/// `HH:MM[:SS]` into (hour, minute, second).
pub fn parse_time(time: &str) -> Result<(u32, u32, u32), ChartError> {
    let time = time.trim();
    let caps = TIME_RE
        .captures(time)
        .ok_or_else(|| ChartError::invalid_input("time", time, TIME_PATTERN))?;
    let hour = caps[1].parse().unwrap_or(0);
    let minute = caps[2].parse().unwrap_or(0);
    let second = caps.get(3).and_then(|s| s.as_str().parse().ok()).unwrap_or(0);
    Ok((hour, minute, second))
}

/// Trimmed location text, rejected when it cannot be a place name.
pub fn parse_location(location: &str) -> Result<String, ChartError> {
    let trimmed = location.trim();
    if !LOCATION_RE.is_match(trimmed) {
        return Err(ChartError::invalid_input("location", trimmed, LOCATION_PATTERN));
    }
    Ok(trimmed.to_string())
}
