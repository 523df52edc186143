//! Core library for the `betterweather` CLI.
//!
//! This crate defines:
//! - The canonical weather record and its sentinels
//! - Condition code tables, icon themes and unit conversion
//! - Location lookup and the stored location setting
//! - Abstraction over weather providers and the provider factory
//! - Configuration & credentials handling
//!
//! It is used by `betterweather-cli`, but can also be reused by other binaries or services.

pub mod condition;
pub mod config;
pub mod error;
pub mod icon_theme;
pub mod location;
pub mod model;
pub mod provider;
pub mod units;

pub use config::{Config, DisplayConfig, ProviderConfig};
pub use error::WeatherError;
pub use icon_theme::IconTheme;
pub use location::{PlacesClient, StoredLocation};
pub use model::{ErrorCode, LocationInfo, LocationSearchResult, WeatherRecord};
pub use provider::{ProviderId, WeatherProvider, provider_for, provider_from_config};
pub use units::{SpeedUnit, TemperatureUnit};
