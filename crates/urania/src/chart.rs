//! Canonical chart representation shared by every stage of the pipeline.

use crate::aspects::Aspect;
use crate::error::ChartError;
use crate::zodiac::{degree_in_sign, normalize_degrees, sign_of, Sign};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const ASCENDANT: &str = "ascendant";
pub const MIDHEAVEN: &str = "midheaven";
pub const NORTH_NODE: &str = "northnode";
pub const SOUTH_NODE: &str = "southnode";

/// Canonical key, display name and accepted aliases of every point the
/// chart knows about, in rendering order.
pub const BODY_TABLE: &[(&str, &str, &[&str])] = &[
    ("sun", "Sun", &[]),
    ("moon", "Moon", &[]),
    ("mercury", "Mercury", &[]),
    ("venus", "Venus", &[]),
    ("mars", "Mars", &[]),
    ("jupiter", "Jupiter", &[]),
    ("saturn", "Saturn", &[]),
    ("uranus", "Uranus", &[]),
    ("neptune", "Neptune", &[]),
    ("pluto", "Pluto", &[]),
    (
        NORTH_NODE,
        "North Node",
        &["true node", "mean node", "node", "north_node"],
    ),
    (SOUTH_NODE, "South Node", &["south_node"]),
    (
        "lilith",
        "Lilith",
        &["mean apogee", "osc. apogee", "black moon", "black moon lilith"],
    ),
    ("chiron", "Chiron", &[]),
    (MIDHEAVEN, "Midheaven", &["mc", "medium coeli"]),
    (ASCENDANT, "Ascendant", &["asc", "ac"]),
];

lazy_static::lazy_static! {
    static ref NAME_TO_KEY: HashMap<String, &'static str> = {
        let mut names = HashMap::new();
        for (key, display, aliases) in BODY_TABLE {
            names.insert(key.to_string(), *key);
            names.insert(display.to_lowercase(), *key);
            for alias in aliases.iter() {
                names.insert(alias.to_string(), *key);
            }
        }
        names
    };
}

/// Map a long-form or abbreviated point name to its canonical key.
pub fn canonical_key(name: &str) -> Option<&'static str> {
    let folded = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    NAME_TO_KEY.get(&folded).copied()
}

pub fn display_name(key: &str) -> Option<&'static str> {
    BODY_TABLE
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, display, _)| *display)
}

/// Position in [`BODY_TABLE`], unknown keys last.
pub fn body_order(key: &str) -> usize {
    BODY_TABLE
        .iter()
        .position(|(k, _, _)| *k == key)
        .unwrap_or(BODY_TABLE.len())
}

/// Apparent direction of travel along the ecliptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Direct,
    Retrograde,
    /// The provider gave no speed figure for this body.
    #[default]
    Unknown,
}

impl Motion {
    pub fn from_speed(speed: Option<f64>) -> Self {
        match speed {
            Some(s) if s < 0.0 => Motion::Retrograde,
            Some(_) => Motion::Direct,
            None => Motion::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub key: String,
    /// Absolute ecliptic longitude in [0, 360)
    pub longitude: f64,
    pub sign: Sign,
    /// Position inside the sign in [0, 30)
    pub degree_in_sign: f64,
    pub motion: Motion,
}

impl CelestialBody {
    pub fn new(key: &str, longitude: f64, motion: Motion) -> Self {
        let longitude = normalize_degrees(longitude);
        Self {
            key: key.to_string(),
            longitude,
            sign: sign_of(longitude),
            degree_in_sign: degree_in_sign(longitude),
            motion,
        }
    }

    /// `None` when motion is unknown.
    pub fn is_retrograde(&self) -> Option<bool> {
        match self.motion {
            Motion::Retrograde => Some(true),
            Motion::Direct => Some(false),
            Motion::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house: u8,
    pub longitude: f64,
    pub sign: Sign,
    pub degree_in_sign: f64,
}

impl HouseCusp {
    pub fn new(house: u8, longitude: f64) -> Self {
        let longitude = normalize_degrees(longitude);
        Self {
            house,
            longitude,
            sign: sign_of(longitude),
            degree_in_sign: degree_in_sign(longitude),
        }
    }
}

/// Twelve cusps spaced 30° apart starting at the ascendant.
pub fn equal_houses(ascendant: f64) -> BTreeMap<u8, HouseCusp> {
    (1..=12u8)
        .map(|n| (n, HouseCusp::new(n, ascendant + (n as f64 - 1.0) * 30.0)))
        .collect()
}

/// How a chart came to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSource {
    Calculated,
    /// Stand-in built when the position provider failed; planets are absent.
    Placeholder { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub julian_day: f64,
    pub ascendant: CelestialBody,
    pub bodies: HashMap<String, CelestialBody>,
    pub houses: BTreeMap<u8, HouseCusp>,
    pub aspects: Vec<Aspect>,
    pub source: ChartSource,
}

impl ChartResult {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.source, ChartSource::Placeholder { .. })
    }

    pub fn midheaven(&self) -> Option<&CelestialBody> {
        self.bodies.get(MIDHEAVEN)
    }

    /// Bodies in rendering order.
    pub fn sorted_bodies(&self) -> Vec<&CelestialBody> {
        let mut bodies: Vec<&CelestialBody> = self.bodies.values().collect();
        bodies.sort_by(|a, b| {
            body_order(&a.key)
                .cmp(&body_order(&b.key))
                .then_with(|| a.key.cmp(&b.key))
        });
        bodies
    }

    /// Structural checks every finished chart must pass.
    pub fn validate(&self) -> Result<(), ChartError> {
        let first = self.houses.get(&1).ok_or_else(|| ChartError::InvalidInvariant {
            message: "house map is missing house 1".to_string(),
        })?;
        if self.houses.len() != 12 || !(1..=12u8).all(|n| self.houses.contains_key(&n)) {
            return Err(ChartError::InvalidInvariant {
                message: format!("expected houses 1..12, found {:?}", self.houses.keys()),
            });
        }
        if crate::zodiac::angular_separation(first.longitude, self.ascendant.longitude) > 1e-6 {
            return Err(ChartError::InvalidInvariant {
                message: format!(
                    "house 1 cusp {} differs from ascendant {}",
                    first.longitude, self.ascendant.longitude
                ),
            });
        }
        for body in self.bodies.values().chain(std::iter::once(&self.ascendant)) {
            let recomposed = body.sign.index() as f64 * 30.0 + body.degree_in_sign;
            if (recomposed - body.longitude).abs() > 1e-6 {
                return Err(ChartError::InvalidInvariant {
                    message: format!("{} sign/degree disagree with longitude", body.key),
                });
            }
        }
        Ok(())
    }

    /// Compare positions within `tolerance` degrees; aspects are derived
    /// data and are not compared.
    pub fn approx_eq(&self, other: &ChartResult, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| crate::zodiac::angular_separation(a, b) <= tolerance;
        (self.julian_day - other.julian_day).abs() <= tolerance
            && close(self.ascendant.longitude, other.ascendant.longitude)
            && self.bodies.len() == other.bodies.len()
            && self.bodies.iter().all(|(key, body)| {
                other.bodies.get(key).is_some_and(|o| {
                    close(body.longitude, o.longitude) && body.motion == o.motion
                })
            })
            && self.houses.len() == other.houses.len()
            && self.houses.iter().all(|(n, cusp)| {
                other
                    .houses
                    .get(n)
                    .is_some_and(|o| close(cusp.longitude, o.longitude))
            })
    }
}
