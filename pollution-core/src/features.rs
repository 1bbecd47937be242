//! Lag and rolling-window features for the regressor.
//!
//! For row `i` the derived values look strictly backwards: lags read rows
//! `i-2`, `i-3` and `i-7`; rolling statistics cover the rows before `i`.
//! A row without a full history (or with a missing value) is dropped and the
//! latest surviving row becomes the model input.

use crate::{dataset::TimeSeries, error::PredictionError, model::Record};

/// Longest look-back used by any derived feature.
const MAX_LOOKBACK: usize = 7;

/// Minimum number of records before any row survives the drop step.
pub const MIN_HISTORY: usize = MAX_LOOKBACK + 1;

/// Fixed-order model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub dew: f64,
    pub temp: f64,
    pub press: f64,
    pub wnd_spd: f64,
    pub snow: f64,
    pub rain: f64,
    pub pollution_yesterday: f64,
    pub pollution_2_days_ago: f64,
    pub pollution_3_days_ago: f64,
    pub pollution_7_days_ago: f64,
    pub pollution_3day_mean: f64,
    pub pollution_7day_mean: f64,
    pub pollution_7day_std: f64,
}

impl FeatureVector {
    pub const LEN: usize = 13;

    pub const NAMES: [&'static str; Self::LEN] = [
        "dew",
        "temp",
        "press",
        "wnd_spd",
        "snow",
        "rain",
        "pollution_yesterday",
        "pollution_2_days_ago",
        "pollution_3_days_ago",
        "pollution_7_days_ago",
        "pollution_3day_mean",
        "pollution_7day_mean",
        "pollution_7day_std",
    ];

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.dew,
            self.temp,
            self.press,
            self.wnd_spd,
            self.snow,
            self.rain,
            self.pollution_yesterday,
            self.pollution_2_days_ago,
            self.pollution_3_days_ago,
            self.pollution_7_days_ago,
            self.pollution_3day_mean,
            self.pollution_7day_mean,
            self.pollution_7day_std,
        ]
    }

    fn is_complete(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }
}

/// Build the feature vector for the most recent complete row.
pub fn build_features(series: &TimeSeries) -> Result<FeatureVector, PredictionError> {
    let records = series.records();

    (MAX_LOOKBACK..records.len())
        .rev()
        .filter(|&i| records[i].pollution_today.is_finite())
        .map(|i| features_at(records, i))
        .find(FeatureVector::is_complete)
        .ok_or(PredictionError::InsufficientHistory {
            required: MIN_HISTORY,
            available: records.len(),
        })
}

/// Features for row `i`; requires `i >= MAX_LOOKBACK`.
fn features_at(records: &[Record], i: usize) -> FeatureVector {
    let row = &records[i];
    let pollution = |offset: usize| records[i - offset].pollution_today;
    let prior = |n: usize| -> Vec<f64> {
        records[i - n..i].iter().map(|r| r.pollution_today).collect()
    };

    let prior_7 = prior(7);

    FeatureVector {
        dew: row.dew,
        temp: row.temp,
        press: row.press,
        wnd_spd: row.wnd_spd,
        snow: row.snow,
        rain: row.rain,
        pollution_yesterday: row.pollution_yesterday,
        pollution_2_days_ago: pollution(2),
        pollution_3_days_ago: pollution(3),
        pollution_7_days_ago: pollution(7),
        pollution_3day_mean: mean(&prior(3)),
        pollution_7day_mean: mean(&prior_7),
        pollution_7day_std: sample_std(&prior_7),
    }
}

/// Arithmetic mean; `NaN` if any value is missing.
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with an `n - 1` denominator.
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}
