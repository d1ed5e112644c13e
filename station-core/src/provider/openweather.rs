use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{FetchError, ResolutionError},
    model::{
        Coordinates, Units, WeatherSnapshot, capitalize_first, format_unix_time,
        strip_airport_suffix,
    },
    transport::{HttpTransport, redact_key, truncate_body},
};

use super::WeatherSource;

/// OpenWeather geocoding + current-weather client.
///
/// Coordinates are resolved once and cached for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    api_key: String,
    units: Units,
    utc_offset_hours: i32,
    coordinates: Option<Coordinates>,
}

impl OpenWeatherClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        units: Units,
        utc_offset_hours: i32,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            units,
            utc_offset_hours,
            coordinates: None,
        }
    }

    pub fn cached_coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn geocode_url(&self, location: &str, country_code: &str) -> String {
        format!(
            "{}/geo/1.0/direct?q={},{}&limit=1&appid={}",
            self.api_base,
            urlencoding::encode(location.trim()),
            urlencoding::encode(country_code.trim()),
            urlencoding::encode(&self.api_key),
        )
    }

    pub fn weather_url(&self, at: Coordinates) -> String {
        format!(
            "{}/data/2.5/weather?lat={:.6}&lon={:.6}&units={}&appid={}",
            self.api_base,
            at.latitude,
            at.longitude,
            self.units,
            urlencoding::encode(&self.api_key),
        )
    }

    async fn lookup(
        &self,
        location: &str,
        country_code: &str,
    ) -> Result<Coordinates, ResolutionError> {
        let url = self.geocode_url(location, country_code);
        tracing::debug!(url = %redact_key(&url), "resolving location");

        let res = self.transport.get(&url).await?;
        if !res.is_success() {
            tracing::warn!(
                status = res.status,
                body = %truncate_body(&res.body),
                "geolocation request failed"
            );
            return Err(ResolutionError::Status(res.status));
        }

        let entries: Vec<OwGeoEntry> = serde_json::from_str(&res.body)?;
        let first = entries
            .first()
            .ok_or_else(|| ResolutionError::NotFound(format!("{location},{country_code}")))?;

        Ok(Coordinates {
            latitude: first.lat,
            longitude: first.lon,
        })
    }

    fn snapshot_from(&self, parsed: OwCurrentResponse) -> Result<WeatherSnapshot, FetchError> {
        let description = parsed
            .weather
            .first()
            .map(|w| w.description.as_str())
            .ok_or(FetchError::MissingField("weather[0].description"))?;

        Ok(WeatherSnapshot {
            place: strip_airport_suffix(&parsed.name).to_string(),
            units: self.units,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            condition: capitalize_first(description),
            sunrise: format_unix_time(parsed.sys.sunrise, self.utc_offset_hours),
            sunset: format_unix_time(parsed.sys.sunset, self.utc_offset_hours),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn resolve(
        &mut self,
        location: &str,
        country_code: &str,
    ) -> Result<Coordinates, ResolutionError> {
        if let Some(cached) = self.coordinates {
            return Ok(cached);
        }

        let coords = self.lookup(location, country_code).await?;
        tracing::info!(
            lat = coords.latitude,
            lon = coords.longitude,
            "resolved {location},{country_code}"
        );
        self.coordinates = Some(coords);
        Ok(coords)
    }

    async fn fetch_current(&self, at: Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let url = self.weather_url(at);
        tracing::debug!(url = %redact_key(&url), "fetching current weather");

        let res = self.transport.get(&url).await?;
        if !res.is_success() {
            tracing::warn!(
                status = res.status,
                body = %truncate_body(&res.body),
                "weather request failed"
            );
            return Err(FetchError::Status(res.status));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&res.body)?;
        self.snapshot_from(parsed)
    }
}
