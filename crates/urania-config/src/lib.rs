use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use urania::ephemeris::types::house_system_code;
use urania::location::{LocationDatabase, DEFAULT_CLOSEST_MATCH_RADIUS};
use urania::{AspectKind, AspectSettings, EphemerisSettings};

/// Relative locations tried for `configs/urania.toml`, from the repo root
/// and from a crate directory.
pub const CONFIG_SEARCH_PATHS: [&str; 2] = ["configs/urania.toml", "../../configs/urania.toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// External `swetest` program
    #[default]
    Swetest,
    /// In-process Swiss Ephemeris (needs the `swisseph` feature)
    Swisseph,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemerisConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Falls back to `SWETEST_PATH`, then `swetest` on the PATH
    #[serde(default)]
    pub swetest_path: Option<PathBuf>,
    /// Falls back to `SWISS_EPHEMERIS_PATH`
    #[serde(default)]
    pub ephemeris_path: Option<PathBuf>,
    #[serde(default = "default_house_system")]
    pub house_system: String,
    #[serde(default = "default_zodiac")]
    pub zodiac: String,
    /// Body keys to request; the standard set when absent
    #[serde(default)]
    pub objects: Option<Vec<String>>,
}

fn default_house_system() -> String {
    "equal".to_string()
}

fn default_zodiac() -> String {
    "tropical".to_string()
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            swetest_path: None,
            ephemeris_path: None,
            house_system: default_house_system(),
            zodiac: default_zodiac(),
            objects: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AspectsConfig {
    /// Aspect name ("trine", "Sextile", ...) to orb in degrees
    #[serde(default)]
    pub orbs: HashMap<String, f64>,
    #[serde(default = "default_strong_orb")]
    pub strong_orb: f64,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_strong_orb() -> f64 {
    3.0
}

fn default_exclude() -> Vec<String> {
    vec!["southnode".to_string()]
}

impl Default for AspectsConfig {
    fn default() -> Self {
        Self {
            orbs: HashMap::new(),
            strong_orb: default_strong_orb(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    /// Extra `[[location]]` entries appended to the built-in table
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default = "default_radius")]
    pub closest_match_radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_CLOSEST_MATCH_RADIUS
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            database: None,
            closest_match_radius: default_radius(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub ephemeris: EphemerisConfig,
    #[serde(default)]
    pub aspects: AspectsConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

impl Settings {
    pub fn ephemeris_settings(&self) -> EphemerisSettings {
        let mut settings = EphemerisSettings {
            zodiac_type: self.ephemeris.zodiac.clone(),
            house_system: self.ephemeris.house_system.to_lowercase(),
            ..EphemerisSettings::default()
        };
        if let Some(objects) = &self.ephemeris.objects {
            settings.include_objects = objects.clone();
        }
        settings
    }

    pub fn aspect_settings(&self) -> anyhow::Result<AspectSettings> {
        let mut orbs = HashMap::new();
        for (name, orb) in &self.aspects.orbs {
            let kind = AspectKind::from_name(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown aspect in [aspects.orbs]: {name}"))?;
            orbs.insert(kind, *orb);
        }
        Ok(AspectSettings {
            orbs,
            strong_orb: self.aspects.strong_orb,
            exclude: self.aspects.exclude.clone(),
        })
    }

    /// Built-in gazetteer, extended by `[location].database` when set.
    pub fn location_database(&self) -> anyhow::Result<Arc<LocationDatabase>> {
        let builtin = LocationDatabase::builtin();
        match &self.location.database {
            None => Ok(builtin),
            Some(path) => {
                let extra = LocationDatabase::load(path).map_err(|e| {
                    anyhow::anyhow!("Failed to load location database {}: {e}", path.display())
                })?;
                Ok(Arc::new(builtin.extended(extra)))
            }
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        house_system_code(&self.ephemeris.house_system)
            .map_err(|e| anyhow::anyhow!("[ephemeris] {e}"))?;
        if !self.ephemeris.zodiac.eq_ignore_ascii_case("tropical") {
            anyhow::bail!(
                "[ephemeris] zodiac {:?} is not supported (only \"tropical\")",
                self.ephemeris.zodiac
            );
        }
        for (name, orb) in &self.aspects.orbs {
            if !orb.is_finite() || *orb <= 0.0 {
                anyhow::bail!("[aspects.orbs] {name} must be a positive number of degrees");
            }
        }
        if self.aspects.strong_orb < 0.0 {
            anyhow::bail!("[aspects] strong_orb must not be negative");
        }
        if self.location.closest_match_radius < 0.0 {
            anyhow::bail!("[location] closest_match_radius must not be negative");
        }
        self.aspect_settings()?;
        Ok(())
    }
}

pub fn parse_settings(text: &str) -> anyhow::Result<Settings> {
    let settings: Settings =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse urania.toml: {e}"))?;
    settings.validate()?;
    Ok(settings)
}

/// Try the common relative paths for `configs/urania.toml`.
pub fn read_config_text() -> Option<(PathBuf, String)> {
    CONFIG_SEARCH_PATHS.iter().find_map(|p| {
        fs::read_to_string(p)
            .ok()
            .map(|text| (PathBuf::from(p), text))
    })
}

/// Load from an explicit path (which must exist), else from the search
/// paths, else defaults.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let (path, text) = match explicit {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Could not read config {}: {e}", path.display()))?;
            (path.to_path_buf(), text)
        }
        None => match read_config_text() {
            Some(found) => found,
            None => return Ok(Settings::default()),
        },
    };
    parse_settings(&text).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}
