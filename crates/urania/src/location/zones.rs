//! Ordered timezone resolution tiers.
//!
//! Each tier either answers or passes. [`ZoneChain::standard`] tries a
//! registered zone first, then the political overrides (countries whose
//! civil time ignores longitude), then US multi-zone routing, then the
//! nearest registered zone, and finally pure longitude banding, which
//! always answers.

use chrono::NaiveDateTime;
use std::sync::Arc;

use super::gazetteer::{LocationDatabase, RegisteredZone};
use super::timezone::{parse_offset_label, DstRule, TimeZoneInfo};

/// Everything a tier may look at.
#[derive(Debug, Clone, Copy)]
pub struct ZoneQuery<'a> {
    pub lat: f64,
    pub lon: f64,
    /// Upper-case country code, when the place came from the database
    pub country: Option<&'a str>,
    pub registered: Option<&'a RegisteredZone>,
    pub local: Option<NaiveDateTime>,
}

impl<'a> ZoneQuery<'a> {
    pub fn coordinates(lat: f64, lon: f64, local: Option<NaiveDateTime>) -> Self {
        Self {
            lat,
            lon,
            country: None,
            registered: None,
            local,
        }
    }
}

pub trait ZoneStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo>;
}

fn zone_with_dst(
    name: &str,
    standard_offset_minutes: i32,
    dst: DstRule,
    local: Option<NaiveDateTime>,
) -> TimeZoneInfo {
    let (total, flag) = dst.apply(standard_offset_minutes, local);
    let flag = if dst == DstRule::None { local.map(|_| false) } else { flag };
    TimeZoneInfo::from_total_minutes(name, total, flag)
}

/// Longitude wrapped into [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    let mut lon = lon;
    while lon >= 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}

/// The zone the database already knows for this place.
pub struct RegisteredZoneStrategy;

impl ZoneStrategy for RegisteredZoneStrategy {
    fn name(&self) -> &str {
        "registered"
    }

    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        let zone = query.registered?;
        match parse_offset_label(&zone.offset) {
            Ok(standard) => Some(zone_with_dst(&zone.name, standard, zone.dst, query.local)),
            Err(e) => {
                log::warn!("Ignoring registered zone {}: {}", zone.name, e);
                None
            }
        }
    }
}

/// Latitude/longitude rectangle, inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBox {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// A country whose civil time deviates from longitude banding.
#[derive(Debug, Clone)]
pub struct PoliticalOverride {
    pub country: &'static str,
    pub zone: &'static str,
    pub standard_offset_minutes: i32,
    pub dst: DstRule,
    pub boxes: &'static [GeoBox],
}

/// Portugal precedes Spain so the shared Iberian longitudes stay on UTC+0.
/// The boxes trace each border closely enough that bare coordinates in a
/// neighbouring country fall through to the later tiers.
pub const POLITICAL_OVERRIDES: &[PoliticalOverride] = &[
    PoliticalOverride {
        country: "PT",
        zone: "Europe/Lisbon",
        standard_offset_minutes: 0,
        dst: DstRule::EuropeanUnion,
        boxes: &[
            GeoBox::new(36.9, 38.2, -9.6, -7.45),
            GeoBox::new(38.2, 40.0, -9.6, -7.0),
            GeoBox::new(40.0, 41.0, -9.6, -6.85),
            GeoBox::new(41.0, 41.6, -9.6, -6.2),
            GeoBox::new(41.6, 41.87, -9.6, -6.5),
            GeoBox::new(41.87, 42.15, -8.75, -8.1),
        ],
    },
    PoliticalOverride {
        country: "ES",
        zone: "Europe/Madrid",
        standard_offset_minutes: 60,
        dst: DstRule::EuropeanUnion,
        boxes: &[GeoBox::new(35.9, 43.9, -9.4, 3.4)],
    },
    PoliticalOverride {
        country: "IN",
        zone: "Asia/Kolkata",
        standard_offset_minutes: 330,
        dst: DstRule::None,
        boxes: &[
            // Peninsula and the plains, west of Bangladesh and Pakistan
            GeoBox::new(6.5, 24.0, 68.1, 88.8),
            GeoBox::new(24.0, 26.4, 70.3, 88.2),
            GeoBox::new(26.4, 28.0, 70.3, 80.0),
            GeoBox::new(26.4, 27.3, 80.0, 84.0),
            GeoBox::new(28.0, 29.2, 72.5, 80.0),
            GeoBox::new(29.2, 30.0, 73.6, 80.3),
            GeoBox::new(30.0, 31.0, 74.6, 80.3),
            GeoBox::new(31.0, 32.5, 74.6, 79.0),
            GeoBox::new(32.5, 34.7, 74.7, 80.3),
            // Andaman and Nicobar Islands
            GeoBox::new(6.5, 13.7, 92.2, 94.0),
            // Sikkim and the north-east, around Nepal, Bhutan and Bangladesh
            GeoBox::new(26.8, 28.2, 88.1, 88.8),
            GeoBox::new(26.4, 26.8, 88.1, 92.5),
            GeoBox::new(25.2, 26.4, 89.8, 92.5),
            GeoBox::new(25.5, 26.8, 92.5, 95.5),
            GeoBox::new(26.8, 29.3, 92.0, 95.5),
            GeoBox::new(27.0, 29.4, 95.5, 97.4),
            GeoBox::new(24.0, 25.5, 92.5, 94.3),
            GeoBox::new(22.9, 24.3, 91.2, 92.3),
            GeoBox::new(21.9, 24.0, 92.3, 93.4),
        ],
    },
    PoliticalOverride {
        country: "CN",
        zone: "Asia/Shanghai",
        standard_offset_minutes: 480,
        dst: DstRule::None,
        boxes: &[
            // Heartland, west of Korea and north of Vietnam
            GeoBox::new(23.5, 42.5, 97.4, 124.5),
            GeoBox::new(20.0, 23.5, 108.0, 124.5),
            GeoBox::new(18.0, 20.0, 108.5, 111.1),
            GeoBox::new(22.0, 23.5, 99.5, 102.0),
            // Inner Mongolia and the north-east, inside the Russian border
            GeoBox::new(42.5, 45.0, 111.0, 119.5),
            GeoBox::new(45.0, 49.7, 115.5, 119.5),
            GeoBox::new(42.5, 53.3, 119.5, 127.0),
            GeoBox::new(42.5, 48.0, 127.0, 131.2),
            GeoBox::new(48.0, 49.5, 127.0, 130.0),
            GeoBox::new(46.0, 48.5, 131.2, 134.0),
            // Tibet and Xinjiang, clear of Nepal, Bhutan and Central Asia
            GeoBox::new(29.0, 30.5, 84.0, 88.2),
            GeoBox::new(28.3, 30.5, 88.2, 92.0),
            GeoBox::new(29.3, 30.5, 92.0, 97.4),
            GeoBox::new(30.5, 36.0, 80.3, 97.4),
            GeoBox::new(36.0, 40.0, 75.0, 97.4),
            GeoBox::new(40.0, 41.0, 77.0, 97.4),
            GeoBox::new(41.0, 42.5, 80.0, 97.4),
            GeoBox::new(42.5, 45.0, 80.2, 96.0),
            GeoBox::new(45.0, 47.5, 82.5, 91.0),
            GeoBox::new(47.5, 49.2, 85.5, 88.2),
        ],
    },
];

/// Bounding-box overrides. With a known country only that country's
/// override may apply; without one the boxes alone decide.
pub struct PoliticalOverrideStrategy {
    overrides: Vec<PoliticalOverride>,
}

impl PoliticalOverrideStrategy {
    pub fn new(overrides: Vec<PoliticalOverride>) -> Self {
        Self { overrides }
    }
}

impl Default for PoliticalOverrideStrategy {
    fn default() -> Self {
        Self::new(POLITICAL_OVERRIDES.to_vec())
    }
}

impl ZoneStrategy for PoliticalOverrideStrategy {
    fn name(&self) -> &str {
        "political_override"
    }

    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        let lon = wrap_longitude(query.lon);
        self.overrides
            .iter()
            .filter(|o| query.country.map_or(true, |c| c.eq_ignore_ascii_case(o.country)))
            .find(|o| o.boxes.iter().any(|b| b.contains(query.lat, lon)))
            .map(|o| zone_with_dst(o.zone, o.standard_offset_minutes, o.dst, query.local))
    }
}

const US_CONTINENTAL: GeoBox = GeoBox::new(24.4, 49.4, -125.0, -66.9);
const US_ALASKA: GeoBox = GeoBox::new(51.0, 71.6, -180.0, -129.9);
const US_HAWAII: GeoBox = GeoBox::new(18.9, 22.3, -160.3, -154.8);
const US_ARIZONA: GeoBox = GeoBox::new(31.33, 37.0, -114.8, -109.05);

/// Western edge (exclusive upper longitude bound) of each US zone, west to east.
const US_ZONES: &[(f64, &str, i32)] = &[
    (-169.0, "America/Adak", -600),
    (-141.0, "America/Anchorage", -540),
    (-114.5, "America/Los_Angeles", -480),
    (-101.0, "America/Denver", -420),
    (-86.5, "America/Chicago", -360),
    (f64::INFINITY, "America/New_York", -300),
];

/// Longitude routing across the six US zones, with Hawaii and Arizona
/// (mountain time without daylight saving) carved out.
pub struct UnitedStatesStrategy;

impl ZoneStrategy for UnitedStatesStrategy {
    fn name(&self) -> &str {
        "united_states"
    }

    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        let lon = wrap_longitude(query.lon);
        let in_us_boxes = [US_CONTINENTAL, US_ALASKA, US_HAWAII]
            .iter()
            .any(|b| b.contains(query.lat, lon));
        let applies = match query.country {
            Some(country) => country.eq_ignore_ascii_case("US"),
            None => in_us_boxes,
        };
        if !applies {
            return None;
        }

        if US_HAWAII.contains(query.lat, lon) {
            return Some(zone_with_dst("Pacific/Honolulu", -600, DstRule::None, query.local));
        }
        if US_ARIZONA.contains(query.lat, lon) {
            return Some(zone_with_dst("America/Phoenix", -420, DstRule::None, query.local));
        }
        let (_, zone, standard) = US_ZONES.iter().find(|(edge, _, _)| lon < *edge)?;
        Some(zone_with_dst(zone, *standard, DstRule::NorthAmerica, query.local))
    }
}

/// Borrow the zone of the closest database entry that has one.
pub struct ClosestRegisteredStrategy {
    database: Arc<LocationDatabase>,
    radius: f64,
}

impl ClosestRegisteredStrategy {
    pub fn new(database: Arc<LocationDatabase>, radius: f64) -> Self {
        Self { database, radius }
    }
}

impl ZoneStrategy for ClosestRegisteredStrategy {
    fn name(&self) -> &str {
        "closest_registered"
    }

    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        let entry = self
            .database
            .nearest_with_zone(query.lat, wrap_longitude(query.lon), self.radius)?;
        log::debug!("Closest registered zone for ({}, {}) is {}", query.lat, query.lon, entry.name);
        RegisteredZoneStrategy.resolve(&ZoneQuery {
            registered: entry.zone.as_ref(),
            ..*query
        })
    }
}

/// 15° bands centred on Greenwich, each a whole-hour offset.
pub struct LongitudeBucketStrategy;

impl LongitudeBucketStrategy {
    pub fn offset_hours(lon: f64) -> i32 {
        let band = ((wrap_longitude(lon) + 7.5) / 15.0).floor() as i32;
        band.clamp(-12, 12)
    }
}

impl ZoneStrategy for LongitudeBucketStrategy {
    fn name(&self) -> &str {
        "longitude_bucket"
    }

    fn resolve(&self, query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        Some(TimeZoneInfo::synthesized(Self::offset_hours(query.lon) * 60))
    }
}

/// Tiers tried in order; the first answer wins.
pub struct ZoneChain {
    strategies: Vec<Box<dyn ZoneStrategy>>,
}

impl ZoneChain {
    pub fn new(strategies: Vec<Box<dyn ZoneStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn standard(database: Arc<LocationDatabase>, closest_match_radius: f64) -> Self {
        Self::new(vec![
            Box::new(RegisteredZoneStrategy),
            Box::new(PoliticalOverrideStrategy::default()),
            Box::new(UnitedStatesStrategy),
            Box::new(ClosestRegisteredStrategy::new(database, closest_match_radius)),
            Box::new(LongitudeBucketStrategy),
        ])
    }

    /// Add a tier before the one at `index`.
    pub fn insert(&mut self, index: usize, strategy: Box<dyn ZoneStrategy>) {
        let index = index.min(self.strategies.len());
        self.strategies.insert(index, strategy);
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, query: &ZoneQuery<'_>) -> TimeZoneInfo {
        for strategy in &self.strategies {
            if let Some(zone) = strategy.resolve(query) {
                log::debug!("Zone tier {} answered {}", strategy.name(), zone.label);
                return zone;
            }
        }
        log::warn!("No zone tier answered for ({}, {}); using UTC", query.lat, query.lon);
        TimeZoneInfo::utc()
    }
}
