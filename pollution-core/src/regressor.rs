use std::{fmt::Debug, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::RegressorError, features::FeatureVector};

/// A trained model mapping a feature vector to a pollution level.
pub trait Regressor: Send + Sync + Debug {
    fn predict(&self, features: &FeatureVector) -> Result<f64, RegressorError>;
}

/// Linear model persisted as JSON:
///
/// ```json
/// { "intercept": 3.1, "coefficients": [0.2, -0.4, ...] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self, RegressorError> {
        if coefficients.len() != FeatureVector::LEN {
            return Err(RegressorError::FeatureCount {
                expected: FeatureVector::LEN,
                actual: coefficients.len(),
            });
        }

        Ok(Self { intercept, coefficients })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegressorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| RegressorError::Read { path: path.to_path_buf(), source })?;

        let raw: LinearRegressor = serde_json::from_str(&contents)
            .map_err(|source| RegressorError::Parse { path: path.to_path_buf(), source })?;

        let model = Self::new(raw.intercept, raw.coefficients)?;
        info!(
            path = %path.display(),
            features = model.coefficients.len(),
            "loaded regression model"
        );

        Ok(model)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, RegressorError> {
        let y = self.intercept
            + self.coefficients.iter().zip(features.to_array()).map(|(c, x)| c * x).sum::<f64>();

        if y.is_finite() { Ok(y) } else { Err(RegressorError::NonFinite) }
    }
}
