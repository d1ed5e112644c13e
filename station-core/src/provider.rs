use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    Config, WeatherSnapshot,
    config::TimeSourceKind,
    error::{FetchError, ResolutionError, TimeSyncError},
    model::Coordinates,
    provider::{
        clock::{HttpDateClock, SystemClock},
        openweather::OpenWeatherClient,
    },
    transport::{HttpTransport, ReqwestTransport},
};

pub mod clock;
pub mod openweather;

/// Geolocation + current weather.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Resolve a place to coordinates. Implementations cache the first success
    /// and answer later calls without touching the network.
    async fn resolve(
        &mut self,
        location: &str,
        country_code: &str,
    ) -> Result<Coordinates, ResolutionError>;

    async fn fetch_current(&self, at: Coordinates) -> Result<WeatherSnapshot, FetchError>;
}

/// Authoritative wall-clock time.
#[async_trait]
pub trait TimeSource: Send + Sync + Debug {
    async fn sync(&self) -> Result<DateTime<Utc>, TimeSyncError>;
}

/// Build the shared HTTP transport from config.
pub fn transport_from_config(config: &Config) -> anyhow::Result<Arc<dyn HttpTransport>> {
    let transport = ReqwestTransport::new(Duration::from_secs(config.http_timeout_secs))?;
    Ok(Arc::new(transport))
}

pub fn weather_source_from_config(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn WeatherSource> {
    Box::new(OpenWeatherClient::new(
        transport,
        config.api_base.as_str(),
        config.api_key.as_str(),
        config.units,
        config.utc_offset_hours,
    ))
}

pub fn time_source_from_config(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn TimeSource> {
    match config.time_source {
        TimeSourceKind::System => Box::new(SystemClock),
        TimeSourceKind::Http => Box::new(HttpDateClock::new(transport, config.time_url.as_str())),
    }
}
