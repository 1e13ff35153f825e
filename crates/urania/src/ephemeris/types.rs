use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::error::ChartError;

/// Errors raised by a position provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Malformed provider output: {message}")]
    Malformed { message: String },
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Failed to calculate position for {planet_id}: {message}")]
    CalculationFailed { planet_id: String, message: String },
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },
}

impl From<ProviderError> for ChartError {
    fn from(e: ProviderError) -> Self {
        ChartError::CalculationUnavailable {
            message: e.to_string(),
        }
    }
}

/// Planetary position data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Speed in longitude (degrees per day), when the provider reports it
    #[serde(default)]
    pub speed_lon: Option<f64>,
}

/// House system positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HousePositions {
    /// House system name
    #[serde(default)]
    pub system: String,
    /// House cusps: "1".."12" -> degrees
    #[serde(default)]
    pub cusps: HashMap<String, f64>,
    /// Angles: "asc", "mc" -> degrees
    #[serde(default)]
    pub angles: HashMap<String, f64>,
}

/// Object-shaped provider output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StructuredPositions {
    #[serde(default)]
    pub julian_day: Option<f64>,
    /// Body name (any alias) -> position
    pub planets: HashMap<String, PlanetPosition>,
    /// Absent when the provider exposes planetary longitudes only
    #[serde(default)]
    pub houses: Option<HousePositions>,
}

/// Whatever a provider returned, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "lowercase")]
pub enum RawAstronomicalResult {
    Structured(StructuredPositions),
    /// Formatted listing of positions and cusps
    Text(String),
}

impl RawAstronomicalResult {
    /// Tell JSON objects from formatted text by their first character.
    pub fn sniff(output: &str) -> Result<Self, ProviderError> {
        if output.trim_start().starts_with('{') {
            serde_json::from_str(output.trim())
                .map(RawAstronomicalResult::Structured)
                .map_err(|e| ProviderError::Malformed {
                    message: e.to_string(),
                })
        } else {
            Ok(RawAstronomicalResult::Text(output.to_string()))
        }
    }
}

/// Settings for ephemeris calculations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemerisSettings {
    /// Zodiac type: only "tropical" is computed
    pub zodiac_type: String,
    /// House system name
    pub house_system: String,
    /// List of body keys to include
    pub include_objects: Vec<String>,
}

impl Default for EphemerisSettings {
    fn default() -> Self {
        Self {
            zodiac_type: "tropical".to_string(),
            house_system: "equal".to_string(),
            include_objects: DEFAULT_OBJECTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub const DEFAULT_OBJECTS: &[&str] = &[
    "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
    "northnode", "lilith",
];

/// House system mapping
pub const HOUSE_SYSTEMS: &[(&str, char)] = &[
    ("placidus", 'P'),
    ("whole_sign", 'W'),
    ("koch", 'K'),
    ("equal", 'E'),
    ("regiomontanus", 'R'),
    ("campanus", 'C'),
    ("alcabitius", 'B'),
    ("morinus", 'M'),
    ("porphyry", 'O'),
];

/// Convert house system name to its one-letter code
pub fn house_system_code(house_system: &str) -> Result<char, ProviderError> {
    HOUSE_SYSTEMS
        .iter()
        .find(|(name, _)| *name == house_system.to_lowercase())
        .map(|(_, code)| *code)
        .ok_or_else(|| ProviderError::InvalidHouseSystem {
            system: house_system.to_string(),
            valid: HOUSE_SYSTEMS.iter().map(|(name, _)| name.to_string()).collect(),
        })
}
