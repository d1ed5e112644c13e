use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Units;

pub const DEFAULT_PERIOD_MS: u64 = 300_000;
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_HISTORY_LEN: usize = 24;
pub const DEFAULT_GRAPH_LEVELS: u8 = 12;
pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

/// Where the wall-clock time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeSourceKind {
    /// Host clock.
    #[default]
    System,
    /// `Date` header of `time_url`.
    Http,
}

/// Station configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// location = "New York"
/// country_code = "US"
/// api_key = "..."
/// units = "imperial"
/// utc_offset_hours = -5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: String,
    pub country_code: String,
    pub api_key: String,
    pub units: Units,
    pub utc_offset_hours: i32,

    pub period_ms: u64,
    pub retry_interval_ms: u64,
    pub max_retries: u32,
    pub history_len: usize,
    pub graph_levels: u8,
    /// Driver cadence; every tick ends with a redraw.
    pub tick_ms: u64,

    pub api_base: String,
    pub http_timeout_secs: u64,
    pub time_source: TimeSourceKind,
    pub time_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: String::new(),
            country_code: String::new(),
            api_key: String::new(),
            units: Units::Metric,
            utc_offset_hours: 0,
            period_ms: DEFAULT_PERIOD_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            history_len: DEFAULT_HISTORY_LEN,
            graph_levels: DEFAULT_GRAPH_LEVELS,
            tick_ms: 1000,
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout_secs: 10,
            time_source: TimeSourceKind::System,
            time_url: "https://www.google.com".to_string(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: nothing configured yet.
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "weather-station", "station")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check the settings the station cannot run without.
    pub fn validate(&self) -> Result<()> {
        const HINT: &str = "Hint: run `station configure` first.";

        if self.location.trim().is_empty() {
            bail!("No location configured.\n{HINT}");
        }
        if self.country_code.trim().is_empty() {
            bail!("No country code configured.\n{HINT}");
        }
        if self.api_key.trim().is_empty() {
            bail!("No OpenWeather API key configured.\n{HINT}");
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            bail!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.utc_offset_hours
            );
        }

        let zero = [
            ("period_ms", self.period_ms == 0),
            ("retry_interval_ms", self.retry_interval_ms == 0),
            ("history_len", self.history_len == 0),
            ("graph_levels", self.graph_levels == 0),
            ("tick_ms", self.tick_ms == 0),
        ];
        if let Some((name, _)) = zero.iter().find(|(_, is_zero)| *is_zero) {
            bail!("{name} must be greater than zero");
        }

        Ok(())
    }

    /// `<location>,<country>` as sent to the geolocation endpoint, before encoding.
    pub fn place_query(&self) -> String {
        format!("{},{}", self.location.trim(), self.country_code.trim())
    }
}
