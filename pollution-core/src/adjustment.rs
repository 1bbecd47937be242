//! Bounded multiplicative adjustments applied to the model's baseline output.
//!
//! Each stage returns the adjusted value; the orchestrator chains them in a
//! fixed order so the factors compound.

pub mod drift;
pub mod region;
pub mod weather;

pub use drift::{DRIFT_CAP, apply_future_drift, drift_delta};
pub use region::{RegionRules, RegionTable};
pub use weather::{WeatherSummary, weather_adjustment};

/// `value * (1 + factor)`.
pub fn scale(value: f64, factor: f64) -> f64 {
    value * (1.0 + factor)
}
