use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::gazetteer::{LocationDatabase, LocationEntry, RegisteredZone};
use super::timezone::TimeZoneInfo;
use super::zones::{ZoneChain, ZoneQuery};
use super::GeoLocation;
use crate::ephemeris::CivilInstant;
use crate::error::ChartError;

pub const DEFAULT_CLOSEST_MATCH_RADIUS: f64 = 5.0;

/// One way of finding a place in the database.
pub trait LocationLookup: Send + Sync {
    fn name(&self) -> &str;
    fn lookup<'a>(
        &self,
        database: &'a LocationDatabase,
        place: &str,
        qualifier: Option<&str>,
    ) -> Option<&'a LocationEntry>;
}

/// Lower-cased with Latin diacritics folded, so "São Paulo" and
/// "sao paulo" compare equal.
pub fn fold_name(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'ď' | 'đ' => 'd',
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
            'ğ' => 'g',
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => 'i',
            'ł' => 'l',
            'ñ' | 'ń' | 'ň' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
            'ř' => 'r',
            'ś' | 'š' | 'ş' | 'ș' => 's',
            'ť' | 'ţ' | 'ț' => 't',
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
            'ý' | 'ÿ' => 'y',
            'ź' | 'ż' | 'ž' => 'z',
            other => other,
        })
        .collect()
}

/// Case- and accent-insensitive full-name match.
pub struct ExactNameLookup;

impl LocationLookup for ExactNameLookup {
    fn name(&self) -> &str {
        "exact"
    }

    fn lookup<'a>(
        &self,
        database: &'a LocationDatabase,
        place: &str,
        qualifier: Option<&str>,
    ) -> Option<&'a LocationEntry> {
        let needle = fold_name(place);
        database.find(qualifier, |name| fold_name(name) == needle)
    }
}

/// Case- and accent-insensitive name prefix ("los ang" finds Los Angeles).
pub struct PrefixLookup;

impl LocationLookup for PrefixLookup {
    fn name(&self) -> &str {
        "prefix"
    }

    fn lookup<'a>(
        &self,
        database: &'a LocationDatabase,
        place: &str,
        qualifier: Option<&str>,
    ) -> Option<&'a LocationEntry> {
        let needle = fold_name(place);
        if needle.chars().count() < 3 {
            return None;
        }
        database.find(qualifier, |name| fold_name(name).starts_with(&needle))
    }
}

#[derive(Debug, Clone)]
struct CachedPlace {
    location: GeoLocation,
    zone: Option<RegisteredZone>,
}

/// Free text to coordinates plus civil offset.
///
/// Successful lookups are cached per normalized query. Offsets are never
/// cached: they depend on the instant as well as the place.
pub struct LocationResolver {
    database: Arc<LocationDatabase>,
    lookups: Vec<Box<dyn LocationLookup>>,
    zones: ZoneChain,
    cache: RwLock<HashMap<String, CachedPlace>>,
}

impl LocationResolver {
    pub fn new(database: Arc<LocationDatabase>, closest_match_radius: f64) -> Self {
        let zones = ZoneChain::standard(database.clone(), closest_match_radius);
        Self::with_tiers(
            database,
            vec![Box::new(ExactNameLookup), Box::new(PrefixLookup)],
            zones,
        )
    }

    pub fn with_tiers(
        database: Arc<LocationDatabase>,
        lookups: Vec<Box<dyn LocationLookup>>,
        zones: ZoneChain,
    ) -> Self {
        Self {
            database,
            lookups,
            zones,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn database(&self) -> &LocationDatabase {
        &self.database
    }

    /// Resolve `"Place"` or `"Place, Country"`. With a local instant the
    /// offset includes daylight saving where the zone observes it.
    pub fn resolve(
        &self,
        text: &str,
        local: Option<CivilInstant>,
    ) -> Result<(GeoLocation, TimeZoneInfo), ChartError> {
        let place = self.locate(text)?;
        let local = local.map(|l| l.to_naive()).transpose()?;
        let query = ZoneQuery {
            lat: place.location.lat,
            lon: place.location.lon,
            country: Some(place.location.country_code.as_str()),
            registered: place.zone.as_ref(),
            local,
        };
        let zone = self.zones.resolve(&query);
        Ok((place.location, zone))
    }

    /// Offset for bare coordinates, when no place name is known.
    pub fn timezone_for(
        &self,
        lon: f64,
        lat: f64,
        local: Option<CivilInstant>,
    ) -> Result<TimeZoneInfo, ChartError> {
        let local = local.map(|l| l.to_naive()).transpose()?;
        Ok(self.zones.resolve(&ZoneQuery::coordinates(lat, lon, local)))
    }

    fn locate(&self, text: &str) -> Result<CachedPlace, ChartError> {
        let (place, qualifier) = split_location_text(text);
        let not_found = || ChartError::LocationNotFound {
            query: text.trim().to_string(),
        };
        if place.is_empty() {
            return Err(not_found());
        }

        let key = match qualifier {
            Some(q) => format!("{}|{}", fold_name(place), fold_name(q)),
            None => fold_name(place),
        };
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&key) {
                return Ok(hit.clone());
            }
        }

        let entry = self
            .lookups
            .iter()
            .find_map(|lookup| {
                let found = lookup.lookup(&self.database, place, qualifier);
                if found.is_some() {
                    log::debug!("Location tier {} matched {:?}", lookup.name(), text);
                }
                found
            })
            .ok_or_else(not_found)?;

        let resolved = CachedPlace {
            location: GeoLocation {
                lat: entry.lat,
                lon: entry.lon,
                display_name: entry.display_name(),
                country_code: entry.country.clone(),
            },
            zone: entry.zone.clone(),
        };
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, resolved.clone());
        }
        Ok(resolved)
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(LocationDatabase::builtin(), DEFAULT_CLOSEST_MATCH_RADIUS)
    }
}

/// Split on the first comma into place and optional qualifier.
pub fn split_location_text(text: &str) -> (&str, Option<&str>) {
    match text.split_once(',') {
        Some((place, qualifier)) => {
            let qualifier = qualifier.trim();
            (place.trim(), (!qualifier.is_empty()).then_some(qualifier))
        }
        None => (text.trim(), None),
    }
}
