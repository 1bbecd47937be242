use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use pollution_core::{Config, PollutionPredictor, PredictionRequest};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pollution", version, about = "Urban air-pollution prediction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key used for natural-language explanations.
    Configure,

    /// Predict pollution for a region and date.
    Predict {
        /// Region name, e.g. "Normal Urban Area" (exact, case-sensitive).
        #[arg(long)]
        location: String,

        /// Target date, YYYY-MM-DD.
        #[arg(long)]
        date: String,

        /// Reference date used as "today" for future drift; defaults to the local date.
        #[arg(long)]
        today: Option<NaiveDate>,

        #[command(flatten)]
        sources: Sources,
    },

    /// Show the dataset and explainer the service would run with.
    Status {
        #[command(flatten)]
        sources: Sources,
    },

    /// List known regions with their multiplier and drift sensitivity.
    Regions,
}

/// Per-invocation overrides of the configured input files.
#[derive(Debug, Args)]
pub struct Sources {
    /// Historical dataset (CSV).
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Regression model (JSON).
    #[arg(long)]
    model: Option<PathBuf>,
}

impl Sources {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.dataset {
            config.dataset_path = path;
        }
        if let Some(path) = self.model {
            config.model_path = path;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Predict { location, date, today, sources } => {
                sources.apply(&mut config);
                let predictor = PollutionPredictor::from_config(&config)?;
                let request = PredictionRequest::new(location, date);

                let response = match today {
                    Some(today) => predictor.predict_on(&request, today).await?,
                    None => predictor.predict(&request).await?,
                };

                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Command::Status { sources } => {
                sources.apply(&mut config);
                let predictor = PollutionPredictor::from_config(&config)?;
                println!("{}", serde_json::to_string_pretty(&predictor.status())?);
            }
            Command::Regions => {
                let rules = &config.regions;
                println!("{:<28} {:>10} {:>12}", "REGION", "MULTIPLIER", "SENSITIVITY");
                for name in rules.region_names() {
                    println!(
                        "{:<28} {:>10.2} {:>12.2}",
                        name,
                        rules.multipliers.factor(name),
                        rules.sensitivities.factor(name),
                    );
                }
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("Gemini API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep static explanations")
        .prompt()
        .context("Failed to read API key")?;

    apply_api_key_input(config, &api_key);
    config.save()?;

    let path = Config::config_file_path()?;
    info!(
        path = %path.display(),
        explainer = config.explainer.api_key.is_some(),
        "configuration saved"
    );

    Ok(())
}

/// Store the entered key; blank input switches back to static explanations.
fn apply_api_key_input(config: &mut Config, input: &str) {
    let api_key = input.trim();
    if api_key.is_empty() {
        config.explainer.api_key = None;
    } else {
        config.set_explainer_api_key(api_key.to_string());
    }
}
