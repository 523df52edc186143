use anyhow::Context;
use betterweather_core::{
    Config, ErrorCode, LocationInfo, PlacesClient, ProviderId, StoredLocation, WeatherRecord,
    icon_theme::IconTheme,
    location::{AUTOMATIC_DISPLAY_VALUE, stored::display_value},
    provider::{places_client, provider_for},
    units::{SpeedUnit, TemperatureUnit},
};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Select, Text};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "betterweather", version, about = "BetterWeather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively choose provider, credentials, units, icon theme and location.
    Configure,

    /// Search places by name prefix.
    Search {
        /// Beginning of a place name, e.g. "Par".
        text: String,
    },

    /// Fetch and show the weather.
    Show {
        /// Latitude of the device position; used when no location is stored.
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the device position.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Override the configured provider for this run.
        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure().await,
            Command::Search { text } => search(&text).await,
            Command::Show { lat, lng, provider } => {
                let coords = lat.zip(lng);
                show(coords, provider.as_deref()).await
            }
        }
    }
}

async fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load().context("Failed to load configuration")?;

    let provider = Select::new("Weather provider:", ProviderId::all().to_vec())
        .with_starting_cursor(index_of(ProviderId::all(), &cfg.provider_id()))
        .prompt()?;
    cfg.set_provider(provider);

    if provider.requires_api_key() {
        let key = Password::new(&format!("API key for {provider} (empty keeps the current one):"))
            .without_confirmation()
            .prompt()?;
        if !key.trim().is_empty() {
            cfg.upsert_provider_api_key(provider, key.trim().to_string());
        } else if !cfg.is_provider_configured(provider) {
            println!("Warning: {provider} has no API key; requests will fail.");
        }
    }

    let units = [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    cfg.units = Select::new("Temperature unit:", units.to_vec())
        .with_starting_cursor(index_of(&units, &cfg.units))
        .prompt()?;

    cfg.speed_units = Select::new("Wind speed unit:", SpeedUnit::all().to_vec())
        .with_starting_cursor(index_of(SpeedUnit::all(), &cfg.speed_units))
        .prompt()?;

    cfg.set_icon_theme(
        Select::new("Icon theme:", IconTheme::all().to_vec())
            .with_starting_cursor(index_of(IconTheme::all(), &cfg.icon_theme()))
            .prompt()?,
    );

    if cfg.places_api_key.is_none() {
        let app_id = Text::new("Places service application id:").prompt()?;
        if !app_id.trim().is_empty() {
            cfg.places_api_key = Some(app_id.trim().to_string());
        }
    }

    if Confirm::new("Change the weather location?")
        .with_default(false)
        .prompt()?
    {
        cfg.location = choose_location(&places_client(&cfg)).await?;
    }

    cfg.save().context("Failed to save configuration")?;
    println!(
        "Saved. Provider: {}, location: {}",
        cfg.provider_id(),
        display_value(&cfg.location)
    );

    Ok(())
}

fn index_of<T: PartialEq>(items: &[T], item: &T) -> usize {
    items.iter().position(|i| i == item).unwrap_or(0)
}

/// Returns the stored value for the chosen place; empty means automatic.
async fn choose_location(places: &PlacesClient) -> anyhow::Result<String> {
    loop {
        let query = Text::new("Search for a place (empty for automatic):").prompt()?;
        if query.trim().is_empty() {
            return Ok(String::new());
        }

        let results = places.search_by_prefix(&query).await;
        if results.is_empty() {
            println!("No places found for '{query}'.");
            continue;
        }

        let labels: Vec<String> = results
            .iter()
            .map(|r| format!("{} ({})", r.display_name, r.country))
            .collect();

        let choice = Select::new("Location:", labels).raw_prompt()?;
        let stored = StoredLocation::from_search_result(&results[choice.index]);
        return Ok(stored.encode());
    }
}

async fn search(text: &str) -> anyhow::Result<()> {
    let cfg = Config::load().context("Failed to load configuration")?;
    let results = places_client(&cfg).search_by_prefix(text).await;

    if results.is_empty() {
        println!("No places found.");
        return Ok(());
    }

    for result in &results {
        println!(
            "{:>10}  {} ({})  [{}, {}]",
            result.woeid, result.display_name, result.country, result.lat, result.lng
        );
    }

    Ok(())
}

/// Location to fetch for, or the error record explaining why there is none.
async fn resolve_location(
    cfg: &Config,
    places: &PlacesClient,
    coords: Option<(f64, f64)>,
) -> Result<LocationInfo, WeatherRecord> {
    let stored = StoredLocation::parse(&cfg.location).ok_or_else(|| {
        tracing::warn!("Unrecognized stored location '{}'", cfg.location);
        WeatherRecord::error(ErrorCode::Location)
    })?;

    match stored {
        StoredLocation::Automatic => {
            let Some((lat, lng)) = coords else {
                tracing::warn!("{AUTOMATIC_DISPLAY_VALUE} location needs --lat and --lng");
                return Err(WeatherRecord::error(ErrorCode::Location));
            };
            places
                .resolve(lat, lng)
                .await
                .map_err(|e| WeatherRecord::error(e.error_code()))
        }
        StoredLocation::Legacy { ref woeid, .. } => {
            // Legacy values carry no coordinates; look them up.
            match places.resolve_woeid(woeid).await {
                Ok(info) => Ok(info),
                Err(e) => {
                    tracing::warn!("Could not resolve place {woeid}: {e}");
                    stored
                        .to_location_info()
                        .ok_or_else(|| WeatherRecord::error(e.error_code()))
                }
            }
        }
        StoredLocation::Full { .. } => stored
            .to_location_info()
            .ok_or_else(|| WeatherRecord::error(ErrorCode::Location)),
    }
}

async fn show(coords: Option<(f64, f64)>, provider: Option<&str>) -> anyhow::Result<()> {
    let cfg = Config::load().context("Failed to load configuration")?;

    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => cfg.provider_id(),
    };

    let places = places_client(&cfg);
    let record = match resolve_location(&cfg, &places, coords).await {
        Ok(location) => {
            let provider = provider_for(id, &cfg);
            tracing::debug!("Fetching weather for {} from {id}", location.display_name);
            provider
                .fetch_weather(&location)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Fetch failed: {e}");
                    WeatherRecord::error(e.error_code())
                })
        }
        Err(record) => record,
    };

    println!("{}", render(&record, &cfg));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn show_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["betterweather", "show", "--lat", "48.8"]).is_err());

        let cli = Cli::try_parse_from(["betterweather", "show", "--lat", "48.8", "--lng", "-2.3"])
            .expect("parse");
        match cli.command {
            Command::Show { lat, lng, provider } => {
                assert_eq!(lat, Some(48.8));
                assert_eq!(lng, Some(-2.3));
                assert_eq!(provider, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn index_of_defaults_to_first() {
        assert_eq!(index_of(SpeedUnit::all(), &SpeedUnit::Ms), 2);
        assert_eq!(index_of::<SpeedUnit>(&[], &SpeedUnit::Ms), 0);
    }

    #[tokio::test]
    async fn automatic_location_without_coordinates_is_location_error() {
        let cfg = Config::default();
        let places = PlacesClient::with_base_url("APP".into(), None, "http://127.0.0.1:9");

        let err = resolve_location(&cfg, &places, None).await.unwrap_err();
        assert_eq!(err.error_code, ErrorCode::Location);
    }

    #[tokio::test]
    async fn stored_full_location_needs_no_lookup() {
        let cfg = Config {
            location: "615702/Paris, Île-de-France/48.85/2.35".into(),
            ..Config::default()
        };
        let places = PlacesClient::with_base_url("APP".into(), None, "http://127.0.0.1:9");

        let info = resolve_location(&cfg, &places, None).await.expect("location");
        assert_eq!(info.woeid, "615702");
        assert_eq!(info.small_location, "Paris");
    }

    #[tokio::test]
    async fn unrecognized_stored_location_is_location_error() {
        let cfg = Config {
            location: "somewhere nice".into(),
            ..Config::default()
        };
        let places = PlacesClient::with_base_url("APP".into(), None, "http://127.0.0.1:9");

        let err = resolve_location(&cfg, &places, None).await.unwrap_err();
        assert_eq!(err.error_code, ErrorCode::Location);
    }
}
