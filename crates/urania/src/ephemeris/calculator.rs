use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::provider::{PositionProvider, PositionRequest};
use super::time::{julian_day, local_sidereal_hours, CivilInstant};
use super::types::{EphemerisSettings, RawAstronomicalResult};
use crate::chart::{
    equal_houses, CelestialBody, ChartResult, ChartSource, Motion, ASCENDANT, MIDHEAVEN,
};
use crate::error::ChartError;
use crate::location::{GeoLocation, TimeZoneInfo};
use crate::normalize::normalize_with_fallback;
use crate::zodiac::normalize_degrees;

/// Angles computed without any provider, for providers that omit them.
///
/// This is the simplified model: RAMC is the fractional part of the
/// Julian Day times 360, the ascendant adds a quarter turn plus a
/// latitude term, and the midheaven sits opposite RAMC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedAngles {
    pub julian_day: f64,
    /// Local sidereal time in hours, reported alongside the angles
    pub local_sidereal_hours: f64,
    pub ramc: f64,
    pub ascendant: f64,
    pub midheaven: f64,
}

impl DerivedAngles {
    pub fn compute(julian_day: f64, lat: f64, lon: f64) -> Self {
        let ramc = julian_day.fract() * 360.0;
        Self {
            julian_day,
            local_sidereal_hours: local_sidereal_hours(julian_day, lon),
            ramc,
            ascendant: normalize_degrees(ramc + 90.0 + 15.0 * lat.to_radians().tan()),
            midheaven: normalize_degrees(ramc + 180.0),
        }
    }
}

/// Raw provider output together with the fallback angles for its instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedPositions {
    pub raw: RawAstronomicalResult,
    pub derived: DerivedAngles,
}

pub struct PositionCalculator<P: PositionProvider> {
    provider: P,
    settings: EphemerisSettings,
}

impl<P: PositionProvider> PositionCalculator<P> {
    pub fn new(provider: P, settings: EphemerisSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &EphemerisSettings {
        &self.settings
    }

    /// Julian Day and request for a local instant in the given zone.
    pub fn request_for(
        &self,
        local: CivilInstant,
        zone: &TimeZoneInfo,
        location: &GeoLocation,
    ) -> Result<PositionRequest, ChartError> {
        let ut = local.to_universal(zone.total_offset_minutes)?;
        Ok(PositionRequest {
            ut,
            julian_day: julian_day(&ut),
            lat: location.lat,
            lon: location.lon,
            house_system: self.settings.house_system.clone(),
            include_objects: self.settings.include_objects.clone(),
        })
    }

    /// Ask the provider once. Provider failures come back as
    /// [`ChartError::CalculationUnavailable`].
    pub fn calculate(
        &self,
        local: CivilInstant,
        zone: &TimeZoneInfo,
        location: &GeoLocation,
    ) -> Result<CalculatedPositions, ChartError> {
        let request = self.request_for(local, zone, location)?;
        let derived = DerivedAngles::compute(request.julian_day, location.lat, location.lon);
        let raw = self.provider.positions(&request)?;
        Ok(CalculatedPositions { raw, derived })
    }

    /// Build the chart for an instant, substituting a flagged placeholder
    /// when the provider fails or returns nothing usable. Only an
    /// impossible instant is an error.
    pub fn chart_at(
        &self,
        local: CivilInstant,
        zone: &TimeZoneInfo,
        location: &GeoLocation,
    ) -> Result<ChartResult, ChartError> {
        let request = self.request_for(local, zone, location)?;
        let derived = DerivedAngles::compute(request.julian_day, location.lat, location.lon);

        match self.chart_from_provider(&request, &derived) {
            Ok(chart) => Ok(chart),
            Err(ChartError::CalculationUnavailable { message }) => {
                log::warn!("Substituting placeholder chart: {}", message);
                Ok(placeholder_chart(&derived, &message))
            }
            Err(other) => Err(other),
        }
    }

    fn chart_from_provider(
        &self,
        request: &PositionRequest,
        derived: &DerivedAngles,
    ) -> Result<ChartResult, ChartError> {
        let raw = self.provider.positions(request)?;
        let (chart, report) = normalize_with_fallback(&raw, Some(derived));
        if report.planets_parsed == 0 {
            return Err(ChartError::CalculationUnavailable {
                message: format!("{} returned no body positions", self.provider.name()),
            });
        }
        log::debug!("Normalized {} output: {:?}", self.provider.name(), report);
        Ok(chart)
    }
}

/// Chart carrying only the derived angles and equal houses, flagged as a
/// placeholder.
pub fn placeholder_chart(derived: &DerivedAngles, reason: &str) -> ChartResult {
    let mut bodies = HashMap::new();
    bodies.insert(
        MIDHEAVEN.to_string(),
        CelestialBody::new(MIDHEAVEN, derived.midheaven, Motion::Unknown),
    );
    ChartResult {
        julian_day: derived.julian_day,
        ascendant: CelestialBody::new(ASCENDANT, derived.ascendant, Motion::Unknown),
        bodies,
        houses: equal_houses(derived.ascendant),
        aspects: Vec::new(),
        source: ChartSource::Placeholder {
            reason: reason.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::provider::StaticProvider;
    use crate::ephemeris::types::ProviderError;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Cell<usize>,
    }

    impl PositionProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn positions(
            &self,
            _request: &PositionRequest,
        ) -> Result<RawAstronomicalResult, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RawAstronomicalResult::Text("Sun 280.37 1.02".into()))
        }
    }

    fn greenwich() -> GeoLocation {
        GeoLocation {
            lat: 51.48,
            lon: 0.0,
            display_name: "Greenwich".to_string(),
            country_code: "GB".to_string(),
        }
    }

    #[test]
    fn test_derived_angles_closed_form() {
        // JD 2451545.25: fractional part .25 -> RAMC 90
        let angles = DerivedAngles::compute(2_451_545.25, 0.0, 0.0);
        assert!((angles.ramc - 90.0).abs() < 1e-6);
        assert!((angles.ascendant - 180.0).abs() < 1e-6);
        assert!((angles.midheaven - 270.0).abs() < 1e-6);

        let north = DerivedAngles::compute(2_451_545.25, 45.0, 0.0);
        assert!((north.ascendant - 195.0).abs() < 1e-6);
    }

    #[test]
    fn test_provider_failure_gives_flagged_placeholder() {
        let calc = PositionCalculator::new(
            StaticProvider::failing("ephemeris offline"),
            EphemerisSettings::default(),
        );
        let local = CivilInstant::new(2000, 1, 1, 12, 0, 0).unwrap();
        let chart = calc.chart_at(local, &TimeZoneInfo::utc(), &greenwich()).unwrap();
        assert!(chart.is_placeholder());
        assert!((chart.julian_day - 2_451_545.0).abs() < 1e-9);
        assert!(chart.bodies.get("sun").is_none());
        assert!(chart.validate().is_ok());
        match &chart.source {
            ChartSource::Placeholder { reason } => assert!(reason.contains("ephemeris offline")),
            other => panic!("expected placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_unusable_text_gives_placeholder() {
        let calc = PositionCalculator::new(
            StaticProvider::new(RawAstronomicalResult::Text("garbage\n---\n".into())),
            EphemerisSettings::default(),
        );
        let local = CivilInstant::new(2000, 1, 1, 12, 0, 0).unwrap();
        let chart = calc.chart_at(local, &TimeZoneInfo::utc(), &greenwich()).unwrap();
        assert!(chart.is_placeholder());
    }

    #[test]
    fn test_calculate_converts_to_universal_time() {
        let calc = PositionCalculator::new(
            StaticProvider::new(RawAstronomicalResult::Text("Sun 280.37 1.02".into())),
            EphemerisSettings::default(),
        );
        let zone = TimeZoneInfo::from_total_minutes("Asia/Kolkata", 330, Some(false));
        let local = CivilInstant::new(2000, 1, 1, 17, 30, 0).unwrap();
        let request = calc.request_for(local, &zone, &greenwich()).unwrap();
        assert_eq!(request.ut, CivilInstant::new(2000, 1, 1, 12, 0, 0).unwrap());
        assert!((request.julian_day - 2_451_545.0).abs() < 1e-9);

        let chart = calc.chart_at(local, &zone, &greenwich()).unwrap();
        assert!(!chart.is_placeholder());
        assert_eq!(chart.bodies["sun"].motion, Motion::Direct);
        // No angles in the text, so the derived ones fill in
        let derived = DerivedAngles::compute(2_451_545.0, 51.48, 0.0);
        assert!((chart.ascendant.longitude - derived.ascendant).abs() < 1e-6);
        assert!((chart.bodies[MIDHEAVEN].longitude - derived.midheaven).abs() < 1e-6);
    }

    #[test]
    fn test_chart_at_queries_provider_once() {
        let calc = PositionCalculator::new(
            CountingProvider { calls: Cell::new(0) },
            EphemerisSettings::default(),
        );
        let local = CivilInstant::new(2000, 1, 1, 12, 0, 0).unwrap();
        let chart = calc.chart_at(local, &TimeZoneInfo::utc(), &greenwich()).unwrap();
        assert!(!chart.is_placeholder());
        assert_eq!(calc.provider().calls.get(), 1);
    }
}
