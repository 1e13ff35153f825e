//! Civil instants, Julian Day and sidereal time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::zodiac::normalize_degrees;

/// Julian Day of 2000-01-01 12:00 UT.
pub const J2000: f64 = 2_451_545.0;

/// A wall-clock instant without zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilInstant {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    pub day: u32,
    /// 0..=23
    pub hour: u32,
    /// 0..=59
    pub minute: u32,
    pub second: u32,
}

impl CivilInstant {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, ChartError> {
        let instant = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        instant.to_naive()?;
        Ok(instant)
    }

    pub fn to_naive(&self) -> Result<NaiveDateTime, ChartError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, self.second))
            .ok_or_else(|| {
                ChartError::invalid_input(
                    "instant",
                    &format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        self.year, self.month, self.day, self.hour, self.minute, self.second
                    ),
                    "a real calendar date and time of day",
                )
            })
    }

    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }

    /// Shift a local wall-clock instant to UT given the zone's total
    /// offset east of Greenwich. Day, month and year roll over as needed.
    pub fn to_universal(&self, offset_minutes: i32) -> Result<CivilInstant, ChartError> {
        let local = self.to_naive()?;
        Ok(Self::from_naive(local - Duration::minutes(offset_minutes as i64)))
    }

    /// Decimal hour of day.
    pub fn hour_decimal(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 + self.second as f64 / 3600.0
    }
}

/// Julian Day of a UT instant on the Gregorian calendar.
pub fn julian_day(ut: &CivilInstant) -> f64 {
    let (mut year, mut month) = (ut.year as f64, ut.month as f64);
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (year + 4716.0)).floor()
        + (30.6001 * (month + 1.0)).floor()
        + ut.day as f64
        + ut.hour_decimal() / 24.0
        + b
        - 1524.5
}

/// Greenwich mean sidereal time in degrees.
pub fn greenwich_sidereal_degrees(jd: f64) -> f64 {
    let t = (jd - J2000) / 36_525.0;
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Local sidereal time in hours for an east-positive longitude.
pub fn local_sidereal_hours(jd: f64, longitude: f64) -> f64 {
    normalize_degrees(greenwich_sidereal_degrees(jd) + longitude) / 15.0
}
