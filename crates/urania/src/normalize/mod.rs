//! Turns any raw provider result into one [`ChartResult`].
//!
//! Each [`RawAstronomicalResult`] variant has its own extractor that
//! only collects what the source states. [`assemble`] then applies the
//! shared rules: house 1 wins for the Ascendant, missing cusps follow
//! the equal-house rule, and the South Node mirrors the North Node.

mod render;
mod structured;
mod text;

pub use render::{render_summary, render_text};
pub use text::TextDialect;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::chart::{
    CelestialBody, ChartResult, ChartSource, HouseCusp, Motion, ASCENDANT, MIDHEAVEN, NORTH_NODE,
    SOUTH_NODE,
};
use crate::ephemeris::{DerivedAngles, RawAstronomicalResult};
use crate::zodiac::normalize_degrees;

/// Where the chart's Ascendant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AscendantSource {
    HouseOne,
    AscendantLine,
    ProviderAngles,
    /// Closed-form angle derived from the Julian Day
    Fallback,
    /// Nothing available; the Ascendant sits at 0° Aries
    Missing,
}

/// What the normalizer could and could not read. A partial parse is
/// normal operation, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    /// `None` for structured input
    pub dialect: Option<TextDialect>,
    pub lines_skipped: usize,
    /// Body positions read from the source, angles excluded
    pub planets_parsed: usize,
    pub houses_parsed: usize,
    /// Cusps filled in by the equal-house rule
    pub houses_synthesized: usize,
    /// Positions taken from a bare decimal after the DMS pattern failed
    pub decimal_fallbacks: usize,
    pub ascendant_source: AscendantSource,
    pub south_node_synthesized: bool,
}

impl ParseReport {
    fn new(dialect: Option<TextDialect>) -> Self {
        Self {
            dialect,
            lines_skipped: 0,
            planets_parsed: 0,
            houses_parsed: 0,
            houses_synthesized: 0,
            decimal_fallbacks: 0,
            ascendant_source: AscendantSource::Missing,
            south_node_synthesized: false,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.houses_synthesized > 0
            || matches!(
                self.ascendant_source,
                AscendantSource::Fallback | AscendantSource::Missing
            )
    }
}

/// Everything one extractor found, before the shared rules run.
#[derive(Debug, Default)]
struct Extracted {
    julian_day: Option<f64>,
    bodies: HashMap<String, CelestialBody>,
    ascendant_line: Option<f64>,
    provider_ascendant: Option<f64>,
    provider_midheaven: Option<f64>,
    cusps: BTreeMap<u8, f64>,
}

impl Extracted {
    fn insert_body(&mut self, key: &str, longitude: f64, motion: Motion) {
        if key == ASCENDANT {
            self.ascendant_line = Some(normalize_degrees(longitude));
        } else {
            self.bodies
                .insert(key.to_string(), CelestialBody::new(key, longitude, motion));
        }
    }

    fn planet_count(&self) -> usize {
        self.bodies.keys().filter(|k| k.as_str() != MIDHEAVEN).count()
    }
}

/// Normalize without fallback angles.
pub fn normalize(raw: &RawAstronomicalResult) -> (ChartResult, ParseReport) {
    normalize_with_fallback(raw, None)
}

/// Normalize, taking the Ascendant, Midheaven and Julian Day from
/// `fallback` when the raw result omits them.
pub fn normalize_with_fallback(
    raw: &RawAstronomicalResult,
    fallback: Option<&DerivedAngles>,
) -> (ChartResult, ParseReport) {
    let (extracted, report) = match raw {
        RawAstronomicalResult::Structured(positions) => {
            (structured::extract(positions), ParseReport::new(None))
        }
        RawAstronomicalResult::Text(text) => {
            let dialect = TextDialect::sniff(text);
            let mut report = ParseReport::new(Some(dialect));
            let extracted = text::extract(text, dialect, &mut report);
            (extracted, report)
        }
    };
    assemble(extracted, report, fallback)
}

fn assemble(
    mut extracted: Extracted,
    mut report: ParseReport,
    fallback: Option<&DerivedAngles>,
) -> (ChartResult, ParseReport) {
    report.planets_parsed = extracted.planet_count();
    report.houses_parsed = extracted.cusps.len();

    let (ascendant, source) = if let Some(cusp) = extracted.cusps.get(&1) {
        (*cusp, AscendantSource::HouseOne)
    } else if let Some(line) = extracted.ascendant_line {
        (line, AscendantSource::AscendantLine)
    } else if let Some(angle) = extracted.provider_ascendant {
        (angle, AscendantSource::ProviderAngles)
    } else if let Some(derived) = fallback {
        (derived.ascendant, AscendantSource::Fallback)
    } else {
        (0.0, AscendantSource::Missing)
    };
    report.ascendant_source = source;
    if source == AscendantSource::Missing {
        log::warn!("No Ascendant available; using 0° Aries");
    }
    let ascendant = normalize_degrees(ascendant);

    if !extracted.bodies.contains_key(MIDHEAVEN) {
        let midheaven = extracted
            .provider_midheaven
            .or_else(|| fallback.map(|d| d.midheaven));
        if let Some(lon) = midheaven {
            extracted.insert_body(MIDHEAVEN, lon, Motion::Unknown);
        }
    }

    if !extracted.bodies.contains_key(SOUTH_NODE) {
        if let Some(north) = extracted.bodies.get(NORTH_NODE).cloned() {
            extracted.insert_body(SOUTH_NODE, north.longitude + 180.0, north.motion);
            report.south_node_synthesized = true;
        }
    }

    let mut houses = BTreeMap::new();
    for house in 1..=12u8 {
        let longitude = match extracted.cusps.get(&house) {
            Some(lon) => *lon,
            None => {
                report.houses_synthesized += 1;
                ascendant + (house as f64 - 1.0) * 30.0
            }
        };
        houses.insert(house, HouseCusp::new(house, longitude));
    }
    if report.houses_synthesized > 0 && report.houses_parsed > 0 {
        log::debug!(
            "Filled {} missing house cusps with equal houses",
            report.houses_synthesized
        );
    }

    let julian_day = extracted
        .julian_day
        .or_else(|| fallback.map(|d| d.julian_day))
        .unwrap_or(0.0);

    let chart = ChartResult {
        julian_day,
        ascendant: CelestialBody::new(ASCENDANT, ascendant, Motion::Unknown),
        bodies: extracted.bodies,
        houses,
        aspects: Vec::new(),
        source: ChartSource::Calculated,
    };
    (chart, report)
}
