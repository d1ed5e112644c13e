use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Select, Text};
use station_core::{
    Config, Dashboard, Units,
    provider::{time_source_from_config, transport_from_config, weather_source_from_config},
};
use tokio::time::{Instant, MissedTickBehavior};

use crate::render::{TerminalRenderer, print_snapshot};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "station", version, about = "Weather station dashboard")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set location, API key and units interactively.
    Configure,

    /// Run the dashboard until interrupted.
    Run,

    /// Fetch the current weather once and print it.
    Show,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(self.config),
            Command::Run => run(&load_config(self.config.as_deref())?).await,
            Command::Show => show(&load_config(self.config.as_deref())?).await,
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

fn configure(path: Option<PathBuf>) -> Result<()> {
    let mut config = match &path {
        Some(p) if p.exists() => Config::load_from(p)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    };

    config.location = Text::new("Location (city or town):")
        .with_default(&config.location)
        .prompt()?;
    config.country_code = Text::new("Country code (GB / US / ZA / ...):")
        .with_default(&config.country_code)
        .prompt()?
        .to_uppercase();

    let api_key = Password::new("OpenWeather API key (leave empty to keep current):")
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = api_key.trim().to_string();
    }

    let units = Select::new("Units:", vec!["metric", "imperial"])
        .with_starting_cursor(usize::from(config.units == Units::Imperial))
        .prompt()?;
    config.units = Units::try_from(units)?;

    config.utc_offset_hours = CustomType::<i32>::new("UTC offset in hours:")
        .with_default(config.utc_offset_hours)
        .with_error_message("Please type a whole number of hours, e.g. 2 or -5")
        .prompt()?;

    config.validate()?;

    let saved_to = match path {
        Some(p) => {
            config.save_to(&p)?;
            p
        }
        None => config.save()?,
    };
    println!("Configuration saved to {}", saved_to.display());

    Ok(())
}

async fn run(config: &Config) -> Result<()> {
    let transport = transport_from_config(config)?;
    let weather = weather_source_from_config(config, transport.clone());
    let time = time_source_from_config(config, transport);

    let started = Instant::now();
    let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut dashboard = Dashboard::start(config, weather, time, elapsed_ms())
        .await
        .with_context(|| format!("Failed to start station for {}", config.place_query()))?;

    let mut renderer = TerminalRenderer::new(std::io::stdout());
    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                dashboard.step(elapsed_ms(), &mut renderer).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn show(config: &Config) -> Result<()> {
    let transport = transport_from_config(config)?;
    let mut weather = weather_source_from_config(config, transport);

    let at = weather
        .resolve(&config.location, &config.country_code)
        .await
        .with_context(|| format!("Failed to resolve {}", config.place_query()))?;
    let snapshot = weather
        .fetch_current(at)
        .await
        .context("Failed to fetch current weather")?;

    print_snapshot(&mut std::io::stdout(), &snapshot)?;
    Ok(())
}
