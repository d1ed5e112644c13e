use thiserror::Error;

/// The request never produced an HTTP response (DNS, connect, timeout, body read).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Geolocation lookup failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("geolocation request failed with status {0}")]
    Status(u16),

    #[error("failed to parse geolocation response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no coordinates found for '{0}'")]
    NotFound(String),
}

/// Current-weather request failed. No snapshot is produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("weather request failed with status {0}")]
    Status(u16),

    #[error("failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("weather response is missing `{0}`")]
    MissingField(&'static str),
}

impl FetchError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            _ => None,
        }
    }

    /// Short reason used in the on-screen status line.
    pub fn short_reason(&self) -> String {
        match self {
            FetchError::Status(code) => format!("HTTP {code}"),
            FetchError::Transport(_) => "network".to_string(),
            FetchError::Parse(_) | FetchError::MissingField(_) => "bad data".to_string(),
        }
    }
}

/// Wall-clock synchronisation failed.
#[derive(Debug, Error)]
pub enum TimeSyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("time server answered with status {0}")]
    Status(u16),

    #[error("time server response has no Date header")]
    MissingDate,

    #[error("invalid Date header '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Startup cannot continue without coordinates and a synchronised clock.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to resolve location: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("failed to synchronise time: {0}")]
    TimeSync(#[from] TimeSyncError),
}
