//! Core library for the urban air-pollution prediction service.
//!
//! This crate defines:
//! - The historical dataset and the lag/rolling features derived from it
//! - Anchor-window selection and the chain of bounded adjustments
//!   (weather, region, future drift)
//! - The regression model and optional natural-language explainer seams
//! - The prediction orchestrator and its configuration
//!
//! It is used by `pollution-cli`, but can also be embedded in other binaries or services.

pub mod adjustment;
pub mod config;
pub mod dataset;
pub mod error;
pub mod explain;
pub mod features;
pub mod model;
pub mod predictor;
pub mod regressor;
pub mod window;

pub use adjustment::{RegionRules, RegionTable};
pub use config::{Config, ExplainerConfig};
pub use dataset::TimeSeries;
pub use error::{DatasetError, PredictionError, RegressorError};
pub use explain::{Explainer, GeminiExplainer};
pub use features::{FeatureVector, build_features};
pub use model::{Category, CategoryThresholds, PredictionRequest, PredictionResponse, Record};
pub use predictor::{PollutionPredictor, PredictorSettings, ServiceStatus};
pub use regressor::{LinearRegressor, Regressor};
