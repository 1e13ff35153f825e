//! Read-only location database.
//!
//! The built-in table covers major cities; deployments append their own
//! entries from a TOML file at startup. Entries keep their load order,
//! which is also the tie-break order for every lookup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::timezone::DstRule;

/// Zone information a database entry may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredZone {
    /// IANA-style name, e.g. "Europe/Madrid"
    pub name: String,
    /// Standard (winter) offset as `UTC±H:MM`
    pub offset: String,
    #[serde(default)]
    pub dst: DstRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    /// ISO 3166-1 alpha-2, upper case
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub zone: Option<RegisteredZone>,
}

impl LocationEntry {
    pub fn display_name(&self) -> String {
        match country_name(&self.country) {
            Some(country) => format!("{}, {}", self.name, country),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    /// Whether a user-typed qualifier ("es", "Spain") names this entry's country.
    pub fn matches_country(&self, qualifier: &str) -> bool {
        let qualifier = qualifier.trim();
        self.country.eq_ignore_ascii_case(qualifier)
            || country_name(&self.country).is_some_and(|name| name.eq_ignore_ascii_case(qualifier))
    }
}

const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CN", "China"),
    ("DE", "Germany"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("IN", "India"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("MX", "Mexico"),
    ("NG", "Nigeria"),
    ("NL", "Netherlands"),
    ("PT", "Portugal"),
    ("RU", "Russia"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("US", "United States"),
    ("ZA", "South Africa"),
];

pub fn country_name(code: &str) -> Option<&'static str> {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

type BuiltinRow = (
    &'static str,
    &'static str,
    f64,
    f64,
    Option<(&'static str, &'static str, DstRule)>,
);

// Entries without a zone exercise the coordinate-based fallbacks.
const BUILTIN: &[BuiltinRow] = &[
    ("London", "GB", 51.5074, -0.1278, Some(("Europe/London", "UTC+0:00", DstRule::EuropeanUnion))),
    ("Paris", "FR", 48.8566, 2.3522, Some(("Europe/Paris", "UTC+1:00", DstRule::EuropeanUnion))),
    ("Berlin", "DE", 52.5200, 13.4050, Some(("Europe/Berlin", "UTC+1:00", DstRule::EuropeanUnion))),
    ("Munich", "DE", 48.1351, 11.5820, None),
    ("Amsterdam", "NL", 52.3676, 4.9041, Some(("Europe/Amsterdam", "UTC+1:00", DstRule::EuropeanUnion))),
    ("Madrid", "ES", 40.4168, -3.7038, Some(("Europe/Madrid", "UTC+1:00", DstRule::EuropeanUnion))),
    ("Barcelona", "ES", 41.3874, 2.1686, None),
    ("Seville", "ES", 37.3891, -5.9845, None),
    ("A Coruna", "ES", 43.3623, -8.4115, None),
    ("Lisbon", "PT", 38.7223, -9.1393, Some(("Europe/Lisbon", "UTC+0:00", DstRule::EuropeanUnion))),
    ("Rome", "IT", 41.9028, 12.4964, Some(("Europe/Rome", "UTC+1:00", DstRule::EuropeanUnion))),
    ("Kyiv", "UA", 50.4501, 30.5234, Some(("Europe/Kyiv", "UTC+2:00", DstRule::EuropeanUnion))),
    ("Istanbul", "TR", 41.0082, 28.9784, Some(("Europe/Istanbul", "UTC+3:00", DstRule::None))),
    ("Moscow", "RU", 55.7558, 37.6173, Some(("Europe/Moscow", "UTC+3:00", DstRule::None))),
    ("Cairo", "EG", 30.0444, 31.2357, Some(("Africa/Cairo", "UTC+2:00", DstRule::None))),
    ("Lagos", "NG", 6.5244, 3.3792, Some(("Africa/Lagos", "UTC+1:00", DstRule::None))),
    ("Johannesburg", "ZA", -26.2041, 28.0473, Some(("Africa/Johannesburg", "UTC+2:00", DstRule::None))),
    ("New Delhi", "IN", 28.6139, 77.2090, Some(("Asia/Kolkata", "UTC+5:30", DstRule::None))),
    ("Mumbai", "IN", 19.0760, 72.8777, None),
    ("Kolkata", "IN", 22.5726, 88.3639, None),
    ("Beijing", "CN", 39.9042, 116.4074, Some(("Asia/Shanghai", "UTC+8:00", DstRule::None))),
    ("Shanghai", "CN", 31.2304, 121.4737, None),
    ("Urumqi", "CN", 43.8256, 87.6168, None),
    ("Chengdu", "CN", 30.5728, 104.0668, None),
    ("Tokyo", "JP", 35.6762, 139.6503, Some(("Asia/Tokyo", "UTC+9:00", DstRule::None))),
    ("Sydney", "AU", -33.8688, 151.2093, Some(("Australia/Sydney", "UTC+10:00", DstRule::None))),
    ("New York", "US", 40.7128, -74.0060, Some(("America/New_York", "UTC-5:00", DstRule::NorthAmerica))),
    ("Chicago", "US", 41.8781, -87.6298, Some(("America/Chicago", "UTC-6:00", DstRule::NorthAmerica))),
    ("Denver", "US", 39.7392, -104.9903, None),
    ("Los Angeles", "US", 34.0522, -118.2437, Some(("America/Los_Angeles", "UTC-8:00", DstRule::NorthAmerica))),
    ("Seattle", "US", 47.6062, -122.3321, None),
    ("Houston", "US", 29.7604, -95.3698, None),
    ("Miami", "US", 25.7617, -80.1918, None),
    ("Anchorage", "US", 61.2181, -149.9003, None),
    ("Honolulu", "US", 21.3069, -157.8583, None),
    ("Toronto", "CA", 43.6532, -79.3832, Some(("America/Toronto", "UTC-5:00", DstRule::NorthAmerica))),
    ("Mexico City", "MX", 19.4326, -99.1332, Some(("America/Mexico_City", "UTC-6:00", DstRule::None))),
    ("Sao Paulo", "BR", -23.5505, -46.6333, Some(("America/Sao_Paulo", "UTC-3:00", DstRule::None))),
    ("Buenos Aires", "AR", -34.6037, -58.3816, Some(("America/Argentina/Buenos_Aires", "UTC-3:00", DstRule::None))),
];

lazy_static::lazy_static! {
    static ref BUILTIN_DATABASE: Arc<LocationDatabase> = Arc::new(LocationDatabase::from_builtin());
}

#[derive(Debug, Deserialize)]
struct LocationFile {
    #[serde(default, rename = "location")]
    locations: Vec<LocationEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationDatabase {
    entries: Vec<LocationEntry>,
}

impl LocationDatabase {
    pub fn new(entries: Vec<LocationEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut e| {
                e.country = e.country.to_uppercase();
                e
            })
            .collect();
        Self { entries }
    }

    fn from_builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(name, country, lat, lon, zone)| LocationEntry {
                    name: name.to_string(),
                    country: country.to_string(),
                    lat: *lat,
                    lon: *lon,
                    zone: zone.map(|(zone_name, offset, dst)| RegisteredZone {
                        name: zone_name.to_string(),
                        offset: offset.to_string(),
                        dst,
                    }),
                })
                .collect(),
        )
    }

    /// Process-wide built-in table, built on first use.
    pub fn builtin() -> Arc<LocationDatabase> {
        BUILTIN_DATABASE.clone()
    }

    /// Parse `[[location]]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: LocationFile = toml::from_str(text)?;
        Ok(Self::new(file.locations))
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// This database followed by `other`, preserving both orders.
    pub fn extended(&self, other: LocationDatabase) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(other.entries);
        Self { entries }
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose name satisfies `name_matches` and whose country
    /// matches the qualifier, if one was given. First in load order wins.
    pub fn find<F>(&self, qualifier: Option<&str>, name_matches: F) -> Option<&LocationEntry>
    where
        F: Fn(&str) -> bool,
    {
        self.entries.iter().find(|entry| {
            name_matches(&entry.name) && qualifier.map_or(true, |q| entry.matches_country(q))
        })
    }

    /// Nearest entry with a registered zone, by Euclidean distance in
    /// (lat, lon) degrees, within `radius`. Ties keep the earlier entry.
    pub fn nearest_with_zone(&self, lat: f64, lon: f64, radius: f64) -> Option<&LocationEntry> {
        let mut best: Option<(&LocationEntry, f64)> = None;
        for entry in self.entries.iter().filter(|e| e.zone.is_some()) {
            let distance = ((entry.lat - lat).powi(2) + (entry.lon - lon).powi(2)).sqrt();
            if distance > radius {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((entry, distance));
            }
        }
        best.map(|(entry, _)| entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_mumbai_without_zone() {
        let db = LocationDatabase::builtin();
        let mumbai = db
            .find(Some("IN"), |n| n.eq_ignore_ascii_case("mumbai"))
            .unwrap();
        assert!(mumbai.zone.is_none());
        assert_eq!(mumbai.display_name(), "Mumbai, India");
    }

    #[test]
    fn test_country_qualifier_by_name() {
        let db = LocationDatabase::builtin();
        assert!(db.find(Some("spain"), |n| n == "Madrid").is_some());
        assert!(db.find(Some("FR"), |n| n == "Madrid").is_none());
    }

    #[test]
    fn test_nearest_with_zone_respects_radius() {
        let db = LocationDatabase::builtin();
        let near = db.nearest_with_zone(40.0, -3.5, 5.0).unwrap();
        assert_eq!(near.name, "Madrid");
        assert!(db.nearest_with_zone(-60.0, -140.0, 5.0).is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let text = r#"
            [[location]]
            name = "Valletta"
            country = "mt"
            lat = 35.8989
            lon = 14.5146
            zone = { name = "Europe/Malta", offset = "UTC+1:00", dst = "european_union" }

            [[location]]
            name = "Reykjavik"
            country = "IS"
            lat = 64.1466
            lon = -21.9426
        "#;
        let db = LocationDatabase::from_toml_str(text).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.entries()[0].country, "MT");
        assert_eq!(
            db.entries()[0].zone.as_ref().map(|z| z.dst),
            Some(DstRule::EuropeanUnion)
        );
        assert!(db.entries()[1].zone.is_none());

        let merged = LocationDatabase::builtin().extended(db);
        assert_eq!(merged.entries().last().map(|e| e.name.as_str()), Some("Reykjavik"));
    }
}
