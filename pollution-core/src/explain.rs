use crate::{Config, model::Category};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod gemini;

pub use gemini::GeminiExplainer;

/// Text used whenever no explainer is configured or the explainer fails.
pub const FALLBACK_EXPLANATION: &str = "The pollution level is estimated using past pollution \
     trends and weather conditions. Recent pollution has remained high, and lower \
     wind speed allows pollutants to accumulate.";

/// Natural-language explanation of a prediction.
#[async_trait]
pub trait Explainer: Send + Sync + Debug {
    async fn explain(&self, prediction: f64, category: Category) -> anyhow::Result<String>;
}

/// Prompt sent to text-generation backends.
pub fn prompt(prediction: f64, category: Category) -> String {
    format!(
        "Explain today's air pollution result in simple human language.\n\n\
         Pollution value: {prediction:.2} µg/m³\n\
         Category: {category}\n\n\
         Mention recent pollution trend and weather impact.\n\
         Avoid technical terms."
    )
}

/// Construct the explainer from config, or `None` when no API key is available.
///
/// The `GOOGLE_API_KEY` environment variable takes precedence over the config file.
pub fn explainer_from_config(config: &Config) -> Option<Box<dyn Explainer>> {
    build_explainer(config, config.explainer_api_key())
}

fn build_explainer(config: &Config, api_key: Option<String>) -> Option<Box<dyn Explainer>> {
    let api_key = api_key?;
    let model = config.explainer.model.clone();

    match GeminiExplainer::new(api_key, model, config.explainer_timeout()) {
        Ok(e) => Some(Box::new(e)),
        Err(e) => {
            tracing::warn!(error = %e, "explainer unavailable, using static explanations");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_rounds_value_and_names_category() {
        let p = prompt(87.456, Category::Moderate);

        assert!(p.contains("87.46 µg/m³"));
        assert!(p.contains("Category: Moderate"));
    }

    #[test]
    fn no_explainer_without_api_key() {
        let cfg = Config::default();
        assert!(build_explainer(&cfg, None).is_none());
    }

    #[test]
    fn explainer_built_when_key_present() {
        let cfg = Config::default();
        assert!(build_explainer(&cfg, Some("KEY".to_string())).is_some());
    }

    #[test]
    fn explainer_built_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_explainer_api_key("KEY".to_string());

        assert!(explainer_from_config(&cfg).is_some());
    }
}
