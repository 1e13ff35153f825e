pub mod calculator;
pub mod provider;
#[cfg(feature = "swisseph")]
pub mod swiss;
pub mod time;
pub mod types;

pub use calculator::{placeholder_chart, CalculatedPositions, DerivedAngles, PositionCalculator};
pub use provider::{PositionProvider, PositionRequest, StaticProvider, SwetestProvider};
#[cfg(feature = "swisseph")]
pub use swiss::SwissEphemerisProvider;
pub use time::{julian_day, local_sidereal_hours, CivilInstant};
pub use types::{
    EphemerisSettings, HousePositions, PlanetPosition, ProviderError, RawAstronomicalResult,
    StructuredPositions,
};
