//! Location and civil-time resolution.

pub mod gazetteer;
pub mod resolver;
pub mod timezone;
pub mod zones;

pub use gazetteer::{LocationDatabase, LocationEntry, RegisteredZone};
pub use resolver::{LocationResolver, DEFAULT_CLOSEST_MATCH_RADIUS};
pub use timezone::{format_offset_label, parse_offset_label, DstRule, TimeZoneInfo};
pub use zones::{ZoneChain, ZoneQuery, ZoneStrategy};

use serde::{Deserialize, Serialize};

/// Geographic location coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Degrees north, -90..=90
    pub lat: f64,
    /// Degrees east, -180..=180
    pub lon: f64,
    pub display_name: String,
    pub country_code: String,
}
