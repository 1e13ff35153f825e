//! In-process Swiss Ephemeris provider (cargo feature `swisseph`).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use swisseph::swe::{calc_ut, houses_ex};
use swisseph::{AscMc, Cusp};

use super::provider::{PositionProvider, PositionRequest};
use super::types::{
    house_system_code, HousePositions, PlanetPosition, ProviderError, RawAstronomicalResult,
    StructuredPositions,
};

// Swiss Ephemeris body numbers
const PLANET_IDS: &[(&str, i32)] = &[
    ("sun", 0),
    ("moon", 1),
    ("mercury", 2),
    ("venus", 3),
    ("mars", 4),
    ("jupiter", 5),
    ("saturn", 6),
    ("uranus", 7),
    ("neptune", 8),
    ("pluto", 9),
    ("northnode", 11), // TRUE_NODE
    ("lilith", 12),    // MEAN_APOG
    ("chiron", 15),
];

// FLG_SWIEPH | FLG_SPEED
const FLAGS: i32 = 2 | 256;

pub struct SwissEphemerisProvider {
    _ephemeris_path: PathBuf,
}

impl SwissEphemerisProvider {
    /// Create a new provider with optional ephemeris path
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, ProviderError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/usr/local/share/swisseph"))
        });

        if !path.exists() {
            return Err(ProviderError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        Ok(Self {
            _ephemeris_path: path,
        })
    }

    fn planet_position(&self, key: &str, jd: f64) -> Result<PlanetPosition, ProviderError> {
        let code = PLANET_IDS
            .iter()
            .find(|(id, _)| *id == key)
            .map(|(_, code)| *code)
            .ok_or_else(|| ProviderError::CalculationFailed {
                planet_id: key.to_string(),
                message: format!("Unknown planet ID: {}", key),
            })?;

        let result = calc_ut(jd, code as u32, FLAGS as u32).map_err(|e| {
            ProviderError::CalculationFailed {
                planet_id: key.to_string(),
                message: format!("Swiss Ephemeris error: {}", e),
            }
        })?;

        let out = result.out;
        Ok(PlanetPosition {
            lon: out[0].rem_euclid(360.0),
            speed_lon: Some(out[3]),
        })
    }

    fn houses(&self, request: &PositionRequest) -> Result<HousePositions, ProviderError> {
        let code = house_system_code(&request.house_system)?;
        let (c, a) = houses_ex(
            request.julian_day,
            FLAGS,
            request.lat,
            request.lon,
            code as u8 as i32,
        );
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        let cusp_values = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];
        let cusps = cusp_values
            .iter()
            .enumerate()
            .map(|(i, cusp)| ((i + 1).to_string(), cusp.rem_euclid(360.0)))
            .collect();

        Ok(HousePositions {
            system: request.house_system.clone(),
            cusps,
            angles: HashMap::from([
                ("asc".to_string(), ascmc.ascendant.rem_euclid(360.0)),
                ("mc".to_string(), ascmc.mc.rem_euclid(360.0)),
            ]),
        })
    }
}

impl PositionProvider for SwissEphemerisProvider {
    fn name(&self) -> &str {
        "swisseph"
    }

    fn positions(&self, request: &PositionRequest) -> Result<RawAstronomicalResult, ProviderError> {
        let mut planets = HashMap::new();
        for key in &request.include_objects {
            planets.insert(key.clone(), self.planet_position(key, request.julian_day)?);
        }
        Ok(RawAstronomicalResult::Structured(StructuredPositions {
            julian_day: Some(request.julian_day),
            planets,
            houses: Some(self.houses(request)?),
        }))
    }
}
