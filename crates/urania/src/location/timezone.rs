//! UTC offsets, their `UTC±H:MM` labels and daylight-saving rules.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

lazy_static::lazy_static! {
    static ref OFFSET_LABEL_RE: Regex =
        Regex::new(r"^(?:UTC|GMT)\s*(?:([+\-−])\s*(\d{1,2})(?::(\d{2}))?)?$").unwrap();
}

/// Resolved civil offset for one place and (optionally) one instant.
///
/// Hours and minutes carry the same sign as the total, so UTC-03:30 is
/// `offset_hours = -3`, `offset_minutes = -30`, `total_offset_minutes = -210`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneInfo {
    /// Registered zone name, or the label itself for synthesized zones
    pub name: String,
    /// `UTC±HH:MM` of the offset in effect
    pub label: String,
    pub offset_hours: i32,
    pub offset_minutes: i32,
    pub total_offset_minutes: i32,
    /// `None` when the tier that produced this zone knows nothing about DST
    pub dst: Option<bool>,
}

impl TimeZoneInfo {
    /// Build from a total offset; the only constructor, so the parts
    /// can never disagree.
    pub fn from_total_minutes(name: &str, total_offset_minutes: i32, dst: Option<bool>) -> Self {
        let label = format_offset_label(total_offset_minutes);
        Self {
            name: if name.is_empty() {
                label.clone()
            } else {
                name.to_string()
            },
            label,
            offset_hours: total_offset_minutes / 60,
            offset_minutes: total_offset_minutes % 60,
            total_offset_minutes,
            dst,
        }
    }

    pub fn from_label(name: &str, label: &str, dst: Option<bool>) -> Result<Self, ChartError> {
        Ok(Self::from_total_minutes(name, parse_offset_label(label)?, dst))
    }

    /// Synthesized zone named after its own label.
    pub fn synthesized(total_offset_minutes: i32) -> Self {
        Self::from_total_minutes("", total_offset_minutes, None)
    }

    pub fn utc() -> Self {
        Self::from_total_minutes("UTC", 0, None)
    }
}

/// Parse `UTC±H:MM` into total minutes east of Greenwich:
/// `sign * (H * 60 + MM)`. A bare `UTC` is zero.
pub fn parse_offset_label(label: &str) -> Result<i32, ChartError> {
    let trimmed = label.trim();
    let invalid = || ChartError::invalid_input("utc offset", trimmed, "UTC±H:MM");
    let caps = OFFSET_LABEL_RE.captures(trimmed).ok_or_else(invalid)?;
    let Some(sign) = caps.get(1) else {
        return Ok(0);
    };
    let sign = if sign.as_str() == "+" { 1 } else { -1 };
    let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
    let minutes: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }
    Ok(sign * (hours * 60 + minutes))
}

pub fn format_offset_label(total_offset_minutes: i32) -> String {
    let sign = if total_offset_minutes < 0 { '-' } else { '+' };
    let magnitude = total_offset_minutes.abs();
    format!("UTC{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)
}

/// Daylight-saving regime of a registered zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DstRule {
    #[default]
    None,
    /// Last Sunday of March 01:00 UTC until last Sunday of October 01:00 UTC
    EuropeanUnion,
    /// Second Sunday of March 02:00 until first Sunday of November 02:00, local
    NorthAmerica,
}

impl DstRule {
    /// Whether summer time is in force at a local wall-clock instant.
    pub fn is_active(self, local: NaiveDateTime, standard_offset_minutes: i32) -> bool {
        let year = local.year();
        match self {
            DstRule::None => false,
            DstRule::EuropeanUnion => {
                let ut = local - Duration::minutes(standard_offset_minutes as i64);
                let (Some(start), Some(end)) = (last_sunday(year, 3), last_sunday(year, 10)) else {
                    return false;
                };
                let start = start.and_hms_opt(1, 0, 0);
                let end = end.and_hms_opt(1, 0, 0);
                matches!((start, end), (Some(s), Some(e)) if ut >= s && ut < e)
            }
            DstRule::NorthAmerica => {
                let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
                    .and_then(|d| d.and_hms_opt(2, 0, 0));
                let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
                    .and_then(|d| d.and_hms_opt(2, 0, 0));
                matches!((start, end), (Some(s), Some(e)) if local >= s && local < e)
            }
        }
    }

    /// Offset in effect for a standard offset, plus the DST flag. Without
    /// an instant the standard offset is returned and the flag is unknown.
    pub fn apply(self, standard_offset_minutes: i32, local: Option<NaiveDateTime>) -> (i32, Option<bool>) {
        match local {
            Some(local) if self.is_active(local, standard_offset_minutes) => {
                (standard_offset_minutes + 60, Some(true))
            }
            Some(_) => (standard_offset_minutes, Some(false)),
            None => (standard_offset_minutes, None),
        }
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, 4))
}
