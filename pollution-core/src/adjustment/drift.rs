use super::{region::RegionTable, scale};

pub const DRIFT_STEP_DAYS: i64 = 7;
pub const DRIFT_STEP_RATE: f64 = 0.03;
pub const DRIFT_CAP: f64 = 0.20;

/// Total drift delta for a horizon of `days_ahead` days.
///
/// Grows by one step per whole week, scaled by the region's sensitivity and
/// capped at [`DRIFT_CAP`].
pub fn drift_delta(days_ahead: i64, sensitivity: f64) -> f64 {
    let steps = days_ahead.div_euclid(DRIFT_STEP_DAYS);
    if steps <= 0 {
        return 0.0;
    }

    (steps as f64 * DRIFT_STEP_RATE * sensitivity).min(DRIFT_CAP)
}

/// Apply weekly stepwise drift to `value`. Identity for `days_ahead < 7`.
pub fn apply_future_drift(
    value: f64,
    days_ahead: i64,
    region: &str,
    sensitivities: &RegionTable,
) -> f64 {
    scale(value, drift_delta(days_ahead, sensitivities.factor(region)))
}
