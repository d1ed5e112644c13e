use serde::{Deserialize, Serialize};

/// Unit system requested from the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Temperature suffix, "C" or "F".
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "C",
            Units::Imperial => "F",
        }
    }

    pub fn wind_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A complete current-weather reading. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place: String,
    pub units: Units,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub condition: String,
    /// Local `HH:MM`.
    pub sunrise: String,
    /// Local `HH:MM`.
    pub sunset: String,
}

impl WeatherSnapshot {
    /// Text shown in the scrolling status line after a successful update.
    pub fn status_message(&self) -> String {
        format!(
            "#Conditions: {}  #Feels like: {}{}  #Sunrise: {}  #Sunset: {}",
            self.condition,
            format_temperature(self.feels_like),
            self.units.temperature_symbol(),
            self.sunrise,
            self.sunset,
        )
    }
}

/// Time of day of a UNIX timestamp shifted by `utc_offset_hours`, as zero-padded `HH:MM`.
pub fn format_unix_time(unix_secs: i64, utc_offset_hours: i32) -> String {
    let secs_of_day = unix_secs.rem_euclid(86_400);
    let hours = (secs_of_day / 3600 + i64::from(utc_offset_hours)).rem_euclid(24);
    let minutes = (secs_of_day % 3600) / 60;
    format!("{hours:02}:{minutes:02}")
}

pub fn format_temperature(value: f64) -> String {
    format!("{value:.1}")
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Weather stations near airports report names like "Bristol Airport".
pub fn strip_airport_suffix(name: &str) -> &str {
    name.strip_suffix(" Airport").unwrap_or(name)
}
