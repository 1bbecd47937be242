use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single prediction request.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(
        "insufficient data: need at least {required} complete records, dataset has {available}"
    )]
    InsufficientHistory { required: usize, available: usize },

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("model prediction failed")]
    Model(#[from] RegressorError),
}

/// Failures while loading or validating the historical dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset row {row}")]
    Parse {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("dataset is empty")]
    Empty,

    #[error("dataset is not sorted by date: {previous} is followed by {next}")]
    Unsorted { previous: NaiveDate, next: NaiveDate },

    #[error("dataset contains duplicate date {0}")]
    DuplicateDate(NaiveDate),
}

/// Failures while loading or evaluating the regression model.
#[derive(Debug, Error)]
pub enum RegressorError {
    #[error("failed to read model file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model has {actual} coefficients, expected {expected}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model produced a non-finite prediction")]
    NonFinite,
}
