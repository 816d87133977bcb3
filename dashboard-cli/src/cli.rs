use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, Controller, WeatherProvider, config::API_KEY_ENV, provider_from_config,
};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;

use crate::{app, view};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Current weather for any city")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Print current weather for a city once.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,
    },

    /// Interactive dashboard with optional auto-refresh.
    Dashboard {
        /// City to search right away.
        city: Option<String>,

        /// Start with auto-refresh off.
        #[arg(long)]
        no_auto_refresh: bool,

        /// Seconds between auto-refreshes; overrides the config file.
        #[arg(long, value_name = "SECS")]
        interval_secs: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Dashboard { city, no_auto_refresh, interval_secs } => {
                let mut config = Config::load()?;
                apply_overrides(&mut config, no_auto_refresh, interval_secs);

                let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config)?);
                let controller = Controller::from_config(provider, &config);
                app::run(controller, city).await
            }
        }
    }
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut Config, no_auto_refresh: bool, interval_secs: Option<u64>) {
    if no_auto_refresh {
        config.auto_refresh = false;
    }
    if let Some(secs) = interval_secs {
        config.refresh_interval_secs = secs;
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");

    println!("Saved API key to {}", path.display());
    if std::env::var_os(API_KEY_ENV).is_some() {
        println!("Note: {API_KEY_ENV} is set and takes precedence over the saved key.");
    }

    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let record = provider.fetch(city).await?;
    print!("{}", view::weather_card(&record));

    Ok(())
}
