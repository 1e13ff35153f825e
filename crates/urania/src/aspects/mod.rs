pub mod calculator;
pub mod types;

pub use calculator::AspectCalculator;
pub use types::{Aspect, AspectKind, AspectSettings, AspectStrength, ASPECT_PRIORITY};
