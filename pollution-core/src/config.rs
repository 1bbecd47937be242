use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{adjustment::RegionRules, model::CategoryThresholds, window::DEFAULT_WINDOW};

/// Environment variable that overrides the configured explainer API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Settings for the optional natural-language explainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self { api_key: None, model: "gemini-1.5-pro".to_string(), timeout_secs: 10 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// dataset_path = "data/air_pollution.csv"
/// anchor_window = 10
///
/// [explainer]
/// api_key = "..."
///
/// [regions.multipliers]
/// "High Pollution Area" = 1.25
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,

    /// Number of trailing records used for weather statistics.
    pub anchor_window: usize,

    /// Future drift applies only up to this many days ahead.
    pub drift_horizon_days: i64,

    pub explainer: ExplainerConfig,
    pub regions: RegionRules,
    pub categories: CategoryThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/air_pollution.csv"),
            model_path: PathBuf::from("model/pollution_model.json"),
            anchor_window: DEFAULT_WINDOW,
            drift_horizon_days: 180,
            explainer: ExplainerConfig::default(),
            regions: RegionRules::default(),
            categories: CategoryThresholds::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "urban-pollution", "pollution-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_explainer_api_key(&mut self, api_key: String) {
        self.explainer.api_key = Some(api_key);
    }

    /// API key for the explainer: environment first, then the config file.
    pub fn explainer_api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.explainer.api_key.as_deref())
    }

    pub fn is_explainer_configured(&self) -> bool {
        self.explainer_api_key().is_some()
    }

    pub fn explainer_timeout(&self) -> Duration {
        Duration::from_secs(self.explainer.timeout_secs.max(1))
    }
}

fn resolve_api_key(env: Option<String>, configured: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| configured.filter(|k| !k.trim().is_empty()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::region::HIGH_POLLUTION_AREA;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(cfg.anchor_window, 10);
        assert_eq!(cfg.drift_horizon_days, 180);
        assert_eq!(cfg.regions.multipliers.factor(HIGH_POLLUTION_AREA), 1.25);
        assert_eq!(cfg.explainer.model, "gemini-1.5-pro");
    }

    #[test]
    fn save_and_load_preserve_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_explainer_api_key("SECRET".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.explainer.api_key.as_deref(), Some("SECRET"));
        assert_eq!(loaded.regions, cfg.regions);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            anchor_window = 5

            [categories]
            good = 40.0

            [explainer]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.anchor_window, 5);
        assert_eq!(cfg.categories.good, 40.0);
        assert_eq!(cfg.categories.moderate, 100.0);
        assert_eq!(cfg.explainer_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.explainer.model, "gemini-1.5-pro");
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "anchor_window = \"ten\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn environment_key_wins_over_config() {
        assert_eq!(resolve_api_key(Some("ENV".into()), Some("FILE")), Some("ENV".to_string()));
        assert_eq!(resolve_api_key(None, Some("FILE")), Some("FILE".to_string()));
        assert_eq!(resolve_api_key(Some("  ".into()), Some("FILE")), Some("FILE".to_string()));
        assert_eq!(resolve_api_key(None, Some("")), None);
        assert_eq!(resolve_api_key(None, None), None);
    }
}
