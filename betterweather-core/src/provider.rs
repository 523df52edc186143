use crate::{
    Config,
    error::WeatherError,
    location::PlacesClient,
    model::{ErrorCode, LocationInfo, WeatherRecord},
    provider::{
        forecast_io::ForecastIoProvider, openweathermap::OpenWeatherMapProvider,
        yahoo::YahooProvider,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use std::{convert::TryFrom, fmt::Debug};

pub mod forecast_io;
pub mod openweathermap;
pub mod yahoo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderId {
    #[default]
    Yahoo,
    ForecastIo,
    OpenWeatherMap,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Yahoo => "yahoo",
            ProviderId::ForecastIo => "forecastio",
            ProviderId::OpenWeatherMap => "openweathermap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Yahoo,
            ProviderId::ForecastIo,
            ProviderId::OpenWeatherMap,
        ]
    }

    /// Id stored in settings, aliases included. Unknown values give the default.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "forecastio" | "forecast" => ProviderId::ForecastIo,
            "openweathermap" | "owm" => ProviderId::OpenWeatherMap,
            "yahoo" => ProviderId::Yahoo,
            other => {
                tracing::debug!("Unknown provider setting '{other}', using yahoo");
                ProviderId::default()
            }
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderId::Yahoo)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "yahoo" => Ok(ProviderId::Yahoo),
            "forecastio" => Ok(ProviderId::ForecastIo),
            "openweathermap" => Ok(ProviderId::OpenWeatherMap),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: yahoo, forecastio, openweathermap."
            )),
        }
    }
}

/// A weather upstream that answers with a canonical [`WeatherRecord`].
///
/// Upstream failures (bad status, unusable body, missing sections) come back
/// as `Ok` records tagged with an [`ErrorCode`]; only transport failures are
/// returned as `Err`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, location: &LocationInfo) -> Result<WeatherRecord, WeatherError>;

    fn id(&self) -> ProviderId;
}

/// Construct a provider for `id` using the credentials found in `config`.
///
/// A missing API key still gives a client; its requests are rejected upstream
/// and surface as [`ErrorCode::Api`] records.
pub fn provider_for(id: ProviderId, config: &Config) -> Box<dyn WeatherProvider> {
    let keys = config.provider_key_pool(id);
    if id.requires_api_key() && keys.is_empty() {
        tracing::warn!(
            "No API key configured for provider '{id}'. Hint: run `betterweather configure`."
        );
    }

    match id {
        ProviderId::Yahoo => Box::new(YahooProvider::new(config.units)),
        ProviderId::ForecastIo => Box::new(ForecastIoProvider::new(
            keys.into_iter().next().unwrap_or_default(),
            config.units,
            places_client(config),
        )),
        ProviderId::OpenWeatherMap => Box::new(OpenWeatherMapProvider::new(
            keys,
            config.units,
            places_client(config),
        )),
    }
}

/// Construct the provider selected in `config`.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    provider_for(config.provider_id(), config)
}

/// Places client configured from `config`, used for location names.
pub fn places_client(config: &Config) -> PlacesClient {
    PlacesClient::new(
        config.places_api_key.clone().unwrap_or_default(),
        config.lang.clone(),
    )
}

/// Record for a location that cannot be fetched, or `None` when it is usable.
fn check_location(id: ProviderId, location: &LocationInfo) -> Option<WeatherRecord> {
    if location.is_valid() {
        return None;
    }
    tracing::warn!("{id}: no usable location, skipping request");
    Some(WeatherRecord::error(ErrorCode::Location))
}

fn api_error(id: ProviderId, reason: impl std::fmt::Display) -> WeatherRecord {
    tracing::warn!("{id}: {reason}");
    WeatherRecord::error(ErrorCode::Api)
}

/// Field deserializer that logs and skips a value of the wrong shape instead
/// of failing the whole response.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Skipping unreadable field: {e}");
        T::default()
    }))
}

/// Nearest degree; halves round up, so -0.5 gives 0.
fn round_temperature(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Metres per second to km/h, kept as the decimal string a record carries.
fn ms_to_kmh(speed: f64) -> String {
    format_speed(speed * 3.6)
}

fn format_speed(speed: f64) -> String {
    format!("{}", (speed * 100.0).round() / 100.0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
