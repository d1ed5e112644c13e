//! Core library for the `station` weather dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client (geolocation + current weather) over an HTTP seam
//! - Time sources and the synchronised clock
//! - The retry state machine and the periodic scheduler tick
//! - The rolling temperature history and its bar-graph transform
//!
//! Rendering is left to the caller through [`Renderer`].

pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;
pub mod retry;
pub mod scheduler;
pub mod transport;
pub mod view;

pub use config::{Config, TimeSourceKind};
pub use error::{FetchError, ResolutionError, StartupError, TimeSyncError, TransportError};
pub use history::TemperatureHistory;
pub use model::{Coordinates, Units, WeatherSnapshot};
pub use provider::{TimeSource, WeatherSource};
pub use retry::{RetryPhase, RetryPolicy, RetryState, SyncKind};
pub use scheduler::{Dashboard, TickReport};
pub use view::{DashboardView, FrameTiming, Renderer};
