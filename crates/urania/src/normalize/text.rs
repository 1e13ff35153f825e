//! Formatted-text listings.
//!
//! Two layouts are understood. The DMS layout writes positions inside
//! a sign, `Sun 19° Sagittarius 12' 34.5" R`, and is what
//! [`super::render_text`] produces. The decimal layout writes absolute
//! longitudes with an optional speed, `Sun 259.2096 1.0191`, and is what
//! `swetest -fPls` prints. House cusps use the same position syntax
//! after `house N`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Extracted, ParseReport};
use crate::chart::{canonical_key, Motion};
use crate::zodiac::{longitude_from, Dms, Sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDialect {
    /// Sign plus degrees, minutes and seconds
    Dms,
    /// One absolute decimal longitude per line
    Decimal,
}

impl TextDialect {
    /// Any degree sign or arc-minute mark means DMS.
    pub fn sniff(text: &str) -> Self {
        if text.contains('°') || text.contains('\'') {
            TextDialect::Dms
        } else {
            TextDialect::Decimal
        }
    }
}

lazy_static! {
    static ref HOUSE_LINE: Regex = Regex::new(r"(?i)^house\s*(\d{1,2})\b[\s:]*(.*)$").unwrap();
    static ref NAMED_LINE: Regex = Regex::new(r"^([^\d:]*[^\d\s:])\s*:?\s*(\d.*)$").unwrap();
    static ref DMS_POSITION: Regex = Regex::new(
        r#"^(\d{1,2})\s*(?:°|\s)\s*([A-Za-z]{2,11})\s*(\d{1,2})'\s*(\d{1,2}(?:\.\d+)?)"?\s*([RD])?\s*$"#
    )
    .unwrap();
    // A bare number only counts as a longitude when it looks like one
    static ref DECIMAL_LONGITUDE: Regex = Regex::new(r"^(\d{1,3}\.\d+)°?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Positions,
    Aspects,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    longitude: f64,
    motion: Motion,
}

pub(super) fn extract(text: &str, dialect: TextDialect, report: &mut ParseReport) -> Extracted {
    let mut extracted = Extracted::default();
    let mut section = Section::Positions;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.chars().all(|c| matches!(c, '-' | '=' | '*' | '_')) {
            continue;
        }
        if let Some(next) = section_header(line) {
            section = next;
            continue;
        }
        if section == Section::Aspects {
            continue;
        }

        if let Some(caps) = HOUSE_LINE.captures(line) {
            let house = caps[1].parse::<u8>().unwrap_or(0);
            match parse_position(&caps[2], dialect, report) {
                Some(position) if (1..=12).contains(&house) => {
                    extracted.cusps.insert(house, position.longitude);
                }
                _ => skip(line, report),
            }
            continue;
        }

        let Some(caps) = NAMED_LINE.captures(line) else {
            skip(line, report);
            continue;
        };
        let name = &caps[1];
        let rest = &caps[2];

        if is_julian_day_label(name) {
            match rest.split_whitespace().next().map(str::parse::<f64>) {
                Some(Ok(jd)) => extracted.julian_day = Some(jd),
                _ => skip(line, report),
            }
            continue;
        }

        let Some(key) = canonical_key(name) else {
            skip(line, report);
            continue;
        };
        match parse_position(rest, dialect, report) {
            Some(position) => extracted.insert_body(key, position.longitude, position.motion),
            None => skip(line, report),
        }
    }
    extracted
}

fn section_header(line: &str) -> Option<Section> {
    let label = line.strip_suffix(':')?.trim().to_lowercase();
    match label.as_str() {
        "planets" | "houses" => Some(Section::Positions),
        "aspects" => Some(Section::Aspects),
        _ => None,
    }
}

fn is_julian_day_label(name: &str) -> bool {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .eq_ignore_ascii_case("julian day")
}

fn skip(line: &str, report: &mut ParseReport) {
    log::debug!("Skipping line {:?}", line);
    report.lines_skipped += 1;
}

fn parse_position(rest: &str, dialect: TextDialect, report: &mut ParseReport) -> Option<Position> {
    match dialect {
        TextDialect::Decimal => parse_decimal(rest),
        TextDialect::Dms => parse_dms(rest).or_else(|| {
            let position = parse_decimal(rest)?;
            report.decimal_fallbacks += 1;
            Some(position)
        }),
    }
}

fn parse_dms(rest: &str) -> Option<Position> {
    let caps = DMS_POSITION.captures(rest.trim())?;
    let degrees: u32 = caps[1].parse().ok()?;
    let sign: Sign = caps[2].parse().ok()?;
    let minutes: u32 = caps[3].parse().ok()?;
    let seconds: f64 = caps[4].parse().ok()?;
    if degrees >= 30 || minutes >= 60 || seconds >= 60.0 {
        return None;
    }
    let motion = match caps.get(5).map(|m| m.as_str()) {
        Some("R") => Motion::Retrograde,
        Some("D") => Motion::Direct,
        _ => Motion::Unknown,
    };
    Some(Position {
        longitude: longitude_from(sign, Dms::new(degrees, minutes, seconds).to_degrees()),
        motion,
    })
}

/// First token is the absolute longitude; an optional speed or R/D
/// marker may follow.
fn parse_decimal(rest: &str) -> Option<Position> {
    let mut tokens = rest.split_whitespace();
    let caps = DECIMAL_LONGITUDE.captures(tokens.next()?)?;
    let longitude: f64 = caps[1].parse().ok()?;
    if longitude >= 360.0 {
        return None;
    }

    let mut speed = None;
    let mut marker = None;
    for token in tokens {
        match token {
            "R" => marker = Some(Motion::Retrograde),
            "D" => marker = Some(Motion::Direct),
            other if speed.is_none() => speed = other.parse::<f64>().ok(),
            _ => {}
        }
    }
    Some(Position {
        longitude,
        motion: marker.unwrap_or_else(|| Motion::from_speed(speed)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{MIDHEAVEN, NORTH_NODE};

    fn run(text: &str) -> (Extracted, ParseReport) {
        let dialect = TextDialect::sniff(text);
        let mut report = ParseReport::new(Some(dialect));
        let extracted = extract(text, dialect, &mut report);
        (extracted, report)
    }

    #[test]
    fn test_sniff() {
        assert_eq!(TextDialect::sniff("Sun 19° Sagittarius 0' 0\""), TextDialect::Dms);
        assert_eq!(TextDialect::sniff("Sun 19 sa 12'34.5"), TextDialect::Dms);
        assert_eq!(TextDialect::sniff("Sun 259.0 1.0"), TextDialect::Decimal);
    }

    #[test]
    fn test_dms_lines() {
        let text = "Planets:\n\
                    Sun 19° Sagittarius 12' 34.5\" D\n\
                    Mercury 2° Capricorn 0' 0.0\" R\n\
                    North Node 5° Taurus 30' 0.0\"\n\
                    MC 1° Leo 0' 0.0\"\n";
        let (extracted, report) = run(text);
        assert_eq!(report.lines_skipped, 0);
        let sun = &extracted.bodies["sun"];
        assert!((sun.longitude - (259.0 + 12.0 / 60.0 + 34.5 / 3600.0)).abs() < 1e-9);
        assert_eq!(sun.motion, Motion::Direct);
        assert_eq!(extracted.bodies["mercury"].motion, Motion::Retrograde);
        assert_eq!(extracted.bodies[NORTH_NODE].motion, Motion::Unknown);
        assert!((extracted.bodies[NORTH_NODE].longitude - 35.5).abs() < 1e-9);
        assert!((extracted.bodies[MIDHEAVEN].longitude - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_swetest_abbreviated_signs() {
        let (extracted, _) = run("Moon             13 sc 20'12.3456\n");
        let moon = &extracted.bodies["moon"];
        assert!((moon.longitude - (223.0 + 20.0 / 60.0 + 12.3456 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn test_decimal_listing_from_swetest() {
        let text = "Sun              259.2096000   1.0191000\n\
                    Mercury          243.5000000  -0.3500000\n\
                    true Node         35.1200000  -0.0530000\n\
                    Ceres             12.0000000   0.2000000\n\
                    house  1         199.1900000\n\
                    house 10         110.0000000\n\
                    Ascendant        199.1900000\n\
                    MC               110.0000000\n\
                    ARMC             112.4000000\n";
        let (extracted, report) = run(text);
        assert_eq!(report.dialect, Some(TextDialect::Decimal));
        assert_eq!(extracted.bodies["sun"].motion, Motion::Direct);
        assert_eq!(extracted.bodies["mercury"].motion, Motion::Retrograde);
        assert_eq!(extracted.bodies[NORTH_NODE].motion, Motion::Retrograde);
        assert_eq!(extracted.cusps.get(&1), Some(&199.19));
        assert_eq!(extracted.cusps.get(&10), Some(&110.0));
        assert_eq!(extracted.ascendant_line, Some(199.19));
        // Ceres and ARMC are not chart points
        assert_eq!(report.lines_skipped, 2);
    }

    #[test]
    fn test_decimal_fallback_requires_a_longitude() {
        let text = "Sun 19° Sagittarius 0' 0\"\n\
                    Moon 223.5\n\
                    Venus 12\n\
                    Mars 412.5\n\
                    house 3 8\n";
        let (extracted, report) = run(text);
        assert_eq!(report.decimal_fallbacks, 1);
        assert!((extracted.bodies["moon"].longitude - 223.5).abs() < 1e-9);
        assert!(!extracted.bodies.contains_key("venus"));
        assert!(!extracted.bodies.contains_key("mars"));
        assert!(extracted.cusps.is_empty());
        assert_eq!(report.lines_skipped, 3);
    }

    #[test]
    fn test_headers_separators_and_aspects_are_ignored() {
        let text = "Julian Day: 2451545.000000\n\
                    ----------\n\
                    Planets:\n\
                    Sun 10° Aries 0' 0.0\"\n\
                    Aspects:\n\
                    ☌ Sun - Moon 1° 0' 0.0\" Strong\n";
        let (extracted, report) = run(text);
        assert_eq!(extracted.julian_day, Some(2_451_545.0));
        assert_eq!(extracted.bodies.len(), 1);
        assert_eq!(report.lines_skipped, 0);
    }

    #[test]
    fn test_out_of_range_dms_rejected() {
        let (extracted, _) = run("Sun 31° Aries 0' 0.0\"\nMoon 1° Nowhere 0' 0.0\"\n");
        assert!(extracted.bodies.is_empty());
    }
}
