use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::icon_theme::IconTheme;
use crate::provider::ProviderId;
use crate::units::{SpeedUnit, TemperatureUnit};

/// Credentials for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Extra keys tried in order when the upstream rejects the previous one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_keys: Vec<String>,
}

impl ProviderConfig {
    /// Primary key followed by the fallbacks, skipping blanks.
    pub fn key_pool(&self) -> Vec<String> {
        std::iter::once(&self.api_key)
            .chain(self.fallback_keys.iter())
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// Options read only by the renderer of the host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_today_forecast: bool,
    pub show_tomorrow_forecast: bool,
    pub show_high_low: bool,
    pub invert_high_low: bool,
    pub show_wind_details: bool,
    pub show_feels_like: bool,
    pub show_humidity: bool,
    pub hide_location_name: bool,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
///
/// ```toml
/// units = "c"
/// speed_units = 1
/// provider = "openweathermap"
/// icon_theme = "googlenow"
/// location = "615702/Paris, Île-de-France/48.85693/2.3412"
///
/// [providers.openweathermap]
/// api_key = "..."
/// fallback_keys = ["..."]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub units: TemperatureUnit,
    pub speed_units: SpeedUnit,

    /// Provider id as typed by the user, e.g. "yahoo" or "forecastio".
    pub provider: Option<String>,

    pub icon_theme: Option<String>,

    /// Stored location value; empty means "use the device location".
    pub location: String,

    /// Language passed to the places service.
    pub lang: Option<String>,

    /// Application id for the places service.
    pub places_api_key: Option<String>,

    pub providers: HashMap<String, ProviderConfig>,

    pub display: DisplayConfig,
}

impl Config {
    /// Active provider; unknown or missing values give the default provider.
    pub fn provider_id(&self) -> ProviderId {
        self.provider
            .as_deref()
            .map(ProviderId::from_setting)
            .unwrap_or_default()
    }

    pub fn icon_theme(&self) -> IconTheme {
        self.icon_theme
            .as_deref()
            .map(IconTheme::from_setting)
            .unwrap_or_default()
    }

    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider = Some(id.as_str().to_string());
    }

    pub fn set_icon_theme(&mut self, theme: IconTheme) {
        self.icon_theme = Some(theme.as_str().to_string());
    }

    /// True when no location is stored and the device position must be used.
    pub fn uses_device_location(&self) -> bool {
        self.location.trim().is_empty()
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Set/replace the primary key of a provider, keeping its fallbacks.
    pub fn upsert_provider_api_key(&mut self, id: ProviderId, api_key: String) {
        self.providers
            .entry(id.as_str().to_string())
            .and_modify(|cfg| cfg.api_key = api_key.clone())
            .or_insert_with(|| ProviderConfig {
                api_key,
                fallback_keys: Vec::new(),
            });

        if self.provider.is_none() {
            self.set_provider(id);
        }
    }

    /// Returns the primary API key for a provider, if present.
    pub fn provider_api_key(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id).map(|cfg| cfg.api_key.as_str())
    }

    /// Every key configured for a provider, primary first.
    pub fn provider_key_pool(&self, id: ProviderId) -> Vec<String> {
        self.provider_config(id)
            .map(ProviderConfig::key_pool)
            .unwrap_or_default()
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        !id.requires_api_key() || !self.provider_key_pool(id).is_empty()
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

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
        let dirs = ProjectDirs::from("net", "imatruck", "betterweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
