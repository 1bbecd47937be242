use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

/// One day of historical measurements.
///
/// Missing numeric cells are stored as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub pollution_today: f64,
    pub pollution_yesterday: f64,
    pub dew: f64,
    pub temp: f64,
    pub press: f64,
    pub wnd_spd: f64,
    pub rain: f64,
    pub snow: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub location: String,
    pub date: String,
}

impl PredictionRequest {
    pub fn new(location: impl Into<String>, date: impl Into<String>) -> Self {
        Self { location: location.into(), date: date.into() }
    }

    /// Calendar date of the request. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn target_date(&self) -> Result<NaiveDate, PredictionError> {
        let raw = self.date.trim();

        if let Ok(date) = raw.parse::<NaiveDate>() {
            return Ok(date);
        }

        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .map_err(|_| PredictionError::InvalidDate(self.date.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    Unhealthy,
    Severe,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::Unhealthy => "Unhealthy",
            Category::Severe => "Severe",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (exclusive) of the first three categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryThresholds {
    pub good: f64,
    pub moderate: f64,
    pub unhealthy: f64,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self { good: 50.0, moderate: 100.0, unhealthy: 150.0 }
    }
}

impl CategoryThresholds {
    pub fn categorize(&self, value: f64) -> Category {
        if value < self.good {
            Category::Good
        } else if value < self.moderate {
            Category::Moderate
        } else if value < self.unhealthy {
            Category::Unhealthy
        } else {
            Category::Severe
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub location: String,
    pub predicted_pollution: f64,
    pub category: Category,
    pub confidence_r2: f64,
    pub explanation: String,
    pub trend_data: Vec<TrendPoint>,
    pub factors: Vec<Factor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_boundaries_belong_to_the_higher_band() {
        let t = CategoryThresholds::default();

        assert_eq!(t.categorize(49.99), Category::Good);
        assert_eq!(t.categorize(50.0), Category::Moderate);
        assert_eq!(t.categorize(99.99), Category::Moderate);
        assert_eq!(t.categorize(100.0), Category::Unhealthy);
        assert_eq!(t.categorize(149.99), Category::Unhealthy);
        assert_eq!(t.categorize(150.0), Category::Severe);
    }

    #[test]
    fn alternate_thresholds_are_honoured() {
        let t = CategoryThresholds { good: 10.0, moderate: 20.0, unhealthy: 30.0 };

        assert_eq!(t.categorize(15.0), Category::Moderate);
        assert_eq!(t.categorize(45.0), Category::Severe);
    }

    #[test]
    fn target_date_accepts_plain_and_rfc3339_dates() {
        let plain = PredictionRequest::new("Windy Area", "2024-03-05");
        assert_eq!(plain.target_date().unwrap(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        let stamped = PredictionRequest::new("Windy Area", "2024-03-05T08:30:00Z");
        assert_eq!(stamped.target_date().unwrap(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn target_date_rejects_garbage() {
        let err = PredictionRequest::new("Windy Area", "next tuesday").target_date().unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn category_serializes_as_plain_label() {
        let json = serde_json::to_string(&Category::Unhealthy).unwrap();
        assert_eq!(json, "\"Unhealthy\"");
    }
}
