use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const RAINY_AREA: &str = "Rainy Area";
pub const WINDY_AREA: &str = "Windy Area";
pub const NORMAL_URBAN_AREA: &str = "Normal Urban Area";
pub const SEASONAL_VARIATION_AREA: &str = "Seasonal Variation Area";
pub const HIGH_POLLUTION_AREA: &str = "High Pollution Area";

/// Factor used for any region missing from a table.
pub const NEUTRAL: f64 = 1.0;

/// Per-region scaling factors, keyed by exact (case-sensitive) region name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable(BTreeMap<String, f64>);

impl RegionTable {
    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Default prediction multipliers.
    pub fn multipliers() -> Self {
        Self::new([
            (RAINY_AREA, 0.90),
            (WINDY_AREA, 0.95),
            (NORMAL_URBAN_AREA, 1.00),
            (SEASONAL_VARIATION_AREA, 1.10),
            (HIGH_POLLUTION_AREA, 1.25),
        ])
    }

    /// Default drift sensitivities.
    pub fn drift_sensitivities() -> Self {
        Self::new([
            (RAINY_AREA, 0.8),
            (WINDY_AREA, 0.9),
            (NORMAL_URBAN_AREA, 1.0),
            (SEASONAL_VARIATION_AREA, 1.1),
            (HIGH_POLLUTION_AREA, 1.2),
        ])
    }

    pub fn factor(&self, region: &str) -> f64 {
        self.0.get(region).copied().unwrap_or(NEUTRAL)
    }

    pub fn contains(&self, region: &str) -> bool {
        self.0.contains_key(region)
    }

    /// Scale `value` by the region's factor.
    pub fn apply(&self, value: f64, region: &str) -> f64 {
        value * self.factor(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Both region-keyed tables used by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRules {
    #[serde(default = "RegionTable::multipliers")]
    pub multipliers: RegionTable,
    #[serde(default = "RegionTable::drift_sensitivities")]
    pub sensitivities: RegionTable,
}

impl Default for RegionRules {
    fn default() -> Self {
        Self {
            multipliers: RegionTable::multipliers(),
            sensitivities: RegionTable::drift_sensitivities(),
        }
    }
}

impl RegionRules {
    /// Every region named in either table, sorted.
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.multipliers.iter().chain(self.sensitivities.iter()).map(|(k, _)| k).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
