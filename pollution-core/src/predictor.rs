//! Prediction orchestrator.
//!
//! Adjustments compound in a fixed order: model baseline, weather, region,
//! then future drift (only for dates after today and within the drift
//! horizon).

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    adjustment::{RegionRules, WeatherSummary, apply_future_drift, scale},
    config::Config,
    dataset::TimeSeries,
    error::PredictionError,
    explain::{Explainer, FALLBACK_EXPLANATION, explainer_from_config},
    features::build_features,
    model::{
        Category, CategoryThresholds, Factor, PredictionRequest, PredictionResponse, TrendPoint,
    },
    regressor::{LinearRegressor, Regressor},
    window::{DEFAULT_WINDOW, anchor_window},
};

/// R² of the trained model on its hold-out set.
pub const CONFIDENCE_R2: f64 = 0.94;

/// Number of historical points shown before "Today" on the trend chart.
const TREND_POINTS: usize = 4;

/// Tunables of the numeric pipeline.
#[derive(Debug, Clone)]
pub struct PredictorSettings {
    pub anchor_window: usize,
    pub drift_horizon_days: i64,
    pub regions: RegionRules,
    pub categories: CategoryThresholds,
    pub explain_timeout: Duration,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            anchor_window: DEFAULT_WINDOW,
            drift_horizon_days: 180,
            regions: RegionRules::default(),
            categories: CategoryThresholds::default(),
            explain_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for PredictorSettings {
    fn from(config: &Config) -> Self {
        Self {
            anchor_window: config.anchor_window,
            drift_horizon_days: config.drift_horizon_days,
            regions: config.regions.clone(),
            categories: config.categories,
            explain_timeout: config.explainer_timeout(),
        }
    }
}

/// Snapshot of what the predictor was built from.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub explainer_enabled: bool,
}

/// Read-only prediction service. Cheap to clone and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct PollutionPredictor {
    series: Arc<TimeSeries>,
    model: Arc<dyn Regressor>,
    explainer: Option<Arc<dyn Explainer>>,
    settings: PredictorSettings,
}

impl PollutionPredictor {
    pub fn new(
        series: Arc<TimeSeries>,
        model: Arc<dyn Regressor>,
        settings: PredictorSettings,
    ) -> Self {
        Self { series, model, explainer: None, settings }
    }

    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Load dataset, model and optional explainer as described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let series = TimeSeries::from_csv_path(&config.dataset_path)
            .context("Failed to load pollution dataset")?;
        let model = LinearRegressor::load(&config.model_path)
            .context("Failed to load regression model")?;

        let settings = PredictorSettings::from(config);
        let predictor = Self::new(Arc::new(series), Arc::new(model), settings);

        Ok(match explainer_from_config(config) {
            Some(explainer) => predictor.with_explainer(Arc::from(explainer)),
            None => predictor,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            status: "ready",
            records: self.series.len(),
            first_date: self.series.first().date,
            last_date: self.series.last().date,
            explainer_enabled: self.explainer.is_some(),
        }
    }

    /// Predict for `request`, treating the local calendar date as today.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        self.predict_on(request, Local::now().date_naive()).await
    }

    /// Predict for `request` as if `today` were the current date.
    pub async fn predict_on(
        &self,
        request: &PredictionRequest,
        today: NaiveDate,
    ) -> Result<PredictionResponse, PredictionError> {
        let target = request.target_date()?;
        let value = self.estimate(&request.location, target, today)?;
        let category = self.settings.categories.categorize(value);
        let explanation = self.explanation(value, category).await;
        let predicted = round2(value);

        Ok(PredictionResponse {
            location: request.location.clone(),
            predicted_pollution: predicted,
            category,
            confidence_r2: CONFIDENCE_R2,
            explanation,
            trend_data: self.trend(predicted),
            factors: contributing_factors(),
        })
    }

    /// Final, unrounded pollution estimate for `region` on `target`.
    pub fn estimate(
        &self,
        region: &str,
        target: NaiveDate,
        today: NaiveDate,
    ) -> Result<f64, PredictionError> {
        let features = build_features(&self.series)?;
        let base = self.model.predict(&features)?;

        let window = anchor_window(&self.series, target, self.settings.anchor_window);
        let weather = WeatherSummary::from_window(window);
        let weather_factor = weather.adjustment();
        let after_weather = scale(base, weather_factor);

        let after_region = self.settings.regions.multipliers.apply(after_weather, region);

        let days_ahead = (target - today).num_days();
        let sensitivities = &self.settings.regions.sensitivities;
        let value = if days_ahead > 0 && days_ahead <= self.settings.drift_horizon_days {
            apply_future_drift(after_region, days_ahead, region, sensitivities)
        } else {
            after_region
        };

        debug!(
            region,
            %target,
            base,
            weather_factor,
            anchor = %window[window.len() - 1].date,
            window_len = window.len(),
            after_region,
            days_ahead,
            value,
            "pollution estimate"
        );

        Ok(value)
    }

    async fn explanation(&self, value: f64, category: Category) -> String {
        let Some(explainer) = &self.explainer else {
            return FALLBACK_EXPLANATION.to_string();
        };

        let timeout = self.settings.explain_timeout;
        match tokio::time::timeout(timeout, explainer.explain(value, category)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "explainer failed, using static explanation");
                FALLBACK_EXPLANATION.to_string()
            }
            Err(_) => {
                warn!(?timeout, "explainer timed out, using static explanation");
                FALLBACK_EXPLANATION.to_string()
            }
        }
    }

    /// The four values before the last record, then the prediction as "Today".
    fn trend(&self, predicted: f64) -> Vec<TrendPoint> {
        let records = self.series.records();
        let end = records.len().saturating_sub(1);
        let start = end.saturating_sub(TREND_POINTS);
        let recent = &records[start..end];

        recent
            .iter()
            .enumerate()
            .map(|(i, r)| TrendPoint {
                day: format!("Day-{}", recent.len() - i),
                value: r.pollution_today,
            })
            .chain(std::iter::once(TrendPoint { day: "Today".to_string(), value: predicted }))
            .collect()
    }
}

/// Display weights for the factors chart. Not derived from the adjustments.
pub fn contributing_factors() -> Vec<Factor> {
    [("Past Pollution Levels", 0.7), ("Low Wind Speed", 0.5), ("Rainfall", 0.2)]
        .into_iter()
        .map(|(name, impact)| Factor { name: name.to_string(), impact })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
