//! External body-position providers.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::time::CivilInstant;
use super::types::{house_system_code, ProviderError, RawAstronomicalResult};

/// A fully specified request: the UT instant, the observer and the
/// house system to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRequest {
    pub ut: CivilInstant,
    pub julian_day: f64,
    pub lat: f64,
    pub lon: f64,
    pub house_system: String,
    pub include_objects: Vec<String>,
}

/// Source of raw per-body longitudes. Implementations make one attempt
/// and report failure; retrying is not their business.
pub trait PositionProvider {
    fn name(&self) -> &str;
    fn positions(&self, request: &PositionRequest) -> Result<RawAstronomicalResult, ProviderError>;
}

impl<P: PositionProvider + ?Sized> PositionProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn positions(&self, request: &PositionRequest) -> Result<RawAstronomicalResult, ProviderError> {
        (**self).positions(request)
    }
}

/// Replays a fixed answer, whatever the request.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    answer: Result<RawAstronomicalResult, String>,
}

impl StaticProvider {
    pub fn new(raw: RawAstronomicalResult) -> Self {
        Self { answer: Ok(raw) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
        }
    }
}

impl PositionProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn positions(&self, _request: &PositionRequest) -> Result<RawAstronomicalResult, ProviderError> {
        self.answer.clone().map_err(|message| ProviderError::Unavailable { message })
    }
}

/// swetest planet selectors for body keys.
const SWETEST_BODIES: &[(&str, char)] = &[
    ("sun", '0'),
    ("moon", '1'),
    ("mercury", '2'),
    ("venus", '3'),
    ("mars", '4'),
    ("jupiter", '5'),
    ("saturn", '6'),
    ("uranus", '7'),
    ("neptune", '8'),
    ("pluto", '9'),
    ("northnode", 't'),
    ("lilith", 'A'),
    ("chiron", 'D'),
];

/// Runs the Swiss Ephemeris `swetest` command-line program and hands
/// back its listing (one `name longitude speed` line per body, then the
/// house cusps and angles) for the text normalizer.
#[derive(Debug, Clone)]
pub struct SwetestProvider {
    program: PathBuf,
    ephemeris_path: Option<PathBuf>,
}

impl SwetestProvider {
    pub fn new(program: Option<PathBuf>, ephemeris_path: Option<PathBuf>) -> Self {
        let program = program.unwrap_or_else(|| {
            env::var("SWETEST_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("swetest"))
        });
        let ephemeris_path =
            ephemeris_path.or_else(|| env::var("SWISS_EPHEMERIS_PATH").ok().map(PathBuf::from));
        Self {
            program,
            ephemeris_path,
        }
    }

    pub fn arguments(&self, request: &PositionRequest) -> Result<Vec<String>, ProviderError> {
        let code = house_system_code(&request.house_system)?;
        let selectors: String = request
            .include_objects
            .iter()
            .filter_map(|key| {
                SWETEST_BODIES
                    .iter()
                    .find(|(k, _)| *k == key.as_str())
                    .map(|(_, c)| *c)
            })
            .collect();
        let ut = &request.ut;
        let mut args = vec![
            format!("-b{}.{}.{}", ut.day, ut.month, ut.year),
            format!("-ut{}:{:02}:{:02}", ut.hour, ut.minute, ut.second),
            format!("-p{}", selectors),
            "-fPls".to_string(),
            format!("-house{},{},{}", request.lon, request.lat, code),
            "-head".to_string(),
        ];
        if let Some(path) = &self.ephemeris_path {
            args.push(format!("-edir{}", path.display()));
        }
        Ok(args)
    }
}

impl Default for SwetestProvider {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PositionProvider for SwetestProvider {
    fn name(&self) -> &str {
        "swetest"
    }

    fn positions(&self, request: &PositionRequest) -> Result<RawAstronomicalResult, ProviderError> {
        let program = self.program.display().to_string();
        let args = self.arguments(request)?;
        log::debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| ProviderError::Spawn {
                program: program.clone(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(ProviderError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // swetest reports most problems on stdout with a zero exit code
        if stdout.trim().is_empty() || stdout.contains("error") {
            return Err(ProviderError::Malformed {
                message: stdout.lines().next().unwrap_or("empty output").to_string(),
            });
        }
        RawAstronomicalResult::sniff(&stdout)
    }
}
