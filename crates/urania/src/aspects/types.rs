use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Major aspects, in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
}

/// Widest orbs first so they claim a separation before the narrower ones.
pub const ASPECT_PRIORITY: [AspectKind; 5] = [
    AspectKind::Conjunction,
    AspectKind::Opposition,
    AspectKind::Trine,
    AspectKind::Square,
    AspectKind::Sextile,
];

impl AspectKind {
    /// Exact angle defining the aspect.
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Trine => 120.0,
            AspectKind::Square => 90.0,
            AspectKind::Sextile => 60.0,
        }
    }

    pub fn default_orb(self) -> f64 {
        match self {
            AspectKind::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            AspectKind::Conjunction => '☌',
            AspectKind::Opposition => '☍',
            AspectKind::Trine => '△',
            AspectKind::Square => '□',
            AspectKind::Sextile => '⚹',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Conjunction",
            AspectKind::Opposition => "Opposition",
            AspectKind::Trine => "Trine",
            AspectKind::Square => "Square",
            AspectKind::Sextile => "Sextile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ASPECT_PRIORITY
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectStrength {
    Strong,
    Moderate,
}

impl fmt::Display for AspectStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectStrength::Strong => f.write_str("Strong"),
            AspectStrength::Moderate => f.write_str("Moderate"),
        }
    }
}

/// One classified pair of bodies. `first` sorts before `second`, so the
/// same pair always produces the same value whichever way it was asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub first: String,
    pub second: String,
    pub kind: AspectKind,
    /// Exact angle of the aspect (0, 60, 90, 120, 180)
    pub angle: f64,
    /// Deviation of the observed separation from `angle`
    pub orb: f64,
    pub strength: AspectStrength,
    pub glyph: char,
}

/// Settings for aspect calculations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectSettings {
    /// Orb overrides per aspect; missing kinds use [`AspectKind::default_orb`]
    pub orbs: HashMap<AspectKind, f64>,
    /// Orbs strictly below this are "Strong"
    pub strong_orb: f64,
    /// Keys of synthetic points never paired
    pub exclude: Vec<String>,
}

impl AspectSettings {
    pub fn orb_for(&self, kind: AspectKind) -> f64 {
        self.orbs.get(&kind).copied().unwrap_or_else(|| kind.default_orb())
    }
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            orbs: HashMap::new(),
            strong_orb: 3.0,
            exclude: vec![crate::chart::SOUTH_NODE.to_string()],
        }
    }
}
