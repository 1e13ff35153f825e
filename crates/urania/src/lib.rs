//! Natal chart computation.
//!
//! The pipeline runs leaf-first: [`location`] turns free text into
//! coordinates and a civil UTC offset, [`ephemeris`] asks a position
//! provider for raw body longitudes and derives the angles it may omit,
//! [`normalize`] turns whatever shape the provider returned into one
//! [`ChartResult`], and [`aspects`] classifies the angular relations
//! between the bodies of that chart.

pub mod aspects;
pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod input;
pub mod location;
pub mod normalize;
pub mod zodiac;

pub use aspects::{Aspect, AspectCalculator, AspectKind, AspectSettings, AspectStrength};
pub use chart::{CelestialBody, ChartResult, ChartSource, HouseCusp, Motion};
pub use ephemeris::{
    CivilInstant, DerivedAngles, EphemerisSettings, PositionCalculator, PositionProvider,
    PositionRequest, ProviderError, RawAstronomicalResult, StaticProvider, SwetestProvider,
};
pub use error::ChartError;
pub use input::BirthData;
pub use location::{GeoLocation, LocationResolver, TimeZoneInfo};
pub use normalize::{
    normalize, normalize_with_fallback, render_summary, render_text, AscendantSource, ParseReport,
};
pub use zodiac::Sign;

/// Run the whole pipeline for one validated birth record.
///
/// A failing position provider does not fail the call: the returned
/// chart is then a placeholder, flagged through [`ChartResult::source`].
pub fn compute_chart<P: PositionProvider>(
    birth: &BirthData,
    resolver: &LocationResolver,
    calculator: &PositionCalculator<P>,
    aspect_settings: &AspectSettings,
) -> Result<(ChartResult, GeoLocation, TimeZoneInfo), ChartError> {
    let (location, zone) = resolver.resolve(&birth.location, Some(birth.instant))?;
    log::info!(
        "Resolved {:?} to {} ({:.4}, {:.4}) in {}",
        birth.location,
        location.display_name,
        location.lat,
        location.lon,
        zone.label
    );

    let mut chart = calculator.chart_at(birth.instant, &zone, &location)?;
    chart.aspects = AspectCalculator::new().compute(&chart.bodies, aspect_settings);
    Ok((chart, location, zone))
}
