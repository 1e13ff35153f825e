//! Zodiac signs and longitude arithmetic.
//!
//! Each sign spans 30 degrees of ecliptic longitude starting at 0° Aries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

pub const SIGNS: [Sign; 12] = [
    Sign::Aries,
    Sign::Taurus,
    Sign::Gemini,
    Sign::Cancer,
    Sign::Leo,
    Sign::Virgo,
    Sign::Libra,
    Sign::Scorpio,
    Sign::Sagittarius,
    Sign::Capricorn,
    Sign::Aquarius,
    Sign::Pisces,
];

impl Sign {
    /// Zero-based position in the zodiac (Aries = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Sign {
        SIGNS[index % 12]
    }

    pub fn name(self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    /// Two-letter abbreviation as printed by swetest (`ar`, `ta`, ...).
    pub fn abbreviation(self) -> &'static str {
        const ABBREVIATIONS: [&str; 12] = [
            "ar", "ta", "ge", "cn", "le", "vi", "li", "sc", "sa", "cp", "aq", "pi",
        ];
        ABBREVIATIONS[self.index()]
    }

    pub fn glyph(self) -> char {
        const GLYPHS: [char; 12] = [
            '♈', '♉', '♊', '♋', '♌', '♍', '♎', '♏', '♐', '♑', '♒', '♓',
        ];
        GLYPHS[self.index()]
    }

    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    /// Planetary ruler; `modern` swaps in the outer planets for Scorpio,
    /// Aquarius and Pisces.
    pub fn ruler(self, modern: bool) -> &'static str {
        match (self, modern) {
            (Sign::Scorpio, true) => "pluto",
            (Sign::Aquarius, true) => "uranus",
            (Sign::Pisces, true) => "neptune",
            (Sign::Aries | Sign::Scorpio, _) => "mars",
            (Sign::Taurus | Sign::Libra, _) => "venus",
            (Sign::Gemini | Sign::Virgo, _) => "mercury",
            (Sign::Cancer, _) => "moon",
            (Sign::Leo, _) => "sun",
            (Sign::Sagittarius | Sign::Pisces, _) => "jupiter",
            (Sign::Capricorn | Sign::Aquarius, _) => "saturn",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sign {
    type Err = String;

    /// Accepts full names and swetest abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SIGNS
            .iter()
            .copied()
            .find(|sign| sign.name().to_lowercase() == needle || sign.abbreviation() == needle)
            .ok_or_else(|| format!("Unknown zodiac sign: {}", s))
    }
}

/// Wrap any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Sign containing an absolute longitude: `floor(lon / 30) mod 12`.
pub fn sign_of(longitude: f64) -> Sign {
    let normalized = normalize_degrees(longitude);
    Sign::from_index((normalized / 30.0).floor() as usize)
}

/// Position inside the sign, in [0, 30).
pub fn degree_in_sign(longitude: f64) -> f64 {
    let normalized = normalize_degrees(longitude);
    normalized - sign_of(normalized).index() as f64 * 30.0
}

/// Absolute longitude from a sign and a position inside it.
pub fn longitude_from(sign: Sign, degree_in_sign: f64) -> f64 {
    normalize_degrees(sign.index() as f64 * 30.0 + degree_in_sign)
}

/// Shortest arc between two longitudes, in [0, 180].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (normalize_degrees(a) - normalize_degrees(b)).abs();
    diff.min(360.0 - diff)
}

/// Degrees, arc-minutes and arc-seconds of an angle inside a sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl Dms {
    pub fn new(degrees: u32, minutes: u32, seconds: f64) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    pub fn to_degrees(&self) -> f64 {
        self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0
    }
}

/// Split an absolute longitude into its sign and a DMS position rounded
/// to tenths of an arc-second. Rounding carries into the next sign, so
/// 29°59'59.97" Aries comes out as 0°0'0.0" Taurus.
pub fn split_longitude(longitude: f64) -> (Sign, Dms) {
    const TENTHS_PER_DEGREE: i64 = 36_000;
    let total = (normalize_degrees(longitude) * TENTHS_PER_DEGREE as f64).round() as i64
        % (360 * TENTHS_PER_DEGREE);
    let sign = Sign::from_index((total / (30 * TENTHS_PER_DEGREE)) as usize);
    let within = total % (30 * TENTHS_PER_DEGREE);
    let degrees = within / TENTHS_PER_DEGREE;
    let minutes = (within % TENTHS_PER_DEGREE) / 600;
    let tenths = within % 600;
    (
        sign,
        Dms::new(degrees as u32, minutes as u32, tenths as f64 / 10.0),
    )
}
