use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    location::PlacesClient,
    model::{INVALID_CONDITION, LocationInfo, WeatherRecord},
    units::TemperatureUnit,
};

use super::{
    ProviderId, WeatherProvider, api_error, check_location, format_speed, lenient, ms_to_kmh,
    round_temperature, truncate_body,
};

const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
const FORECAST_DAYS: &str = "2";

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    /// Tried in order; a 404 moves on to the next key.
    api_keys: Vec<String>,
    http: Client,
    base_url: String,
    units: TemperatureUnit,
    places: PlacesClient,
}

/// Outcome of one endpoint after walking the key pool.
enum Upstream {
    Body(String),
    Failed(String),
}

impl OpenWeatherMapProvider {
    pub fn new(api_keys: Vec<String>, units: TemperatureUnit, places: PlacesClient) -> Self {
        Self::with_base_url(api_keys, units, places, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_keys: Vec<String>,
        units: TemperatureUnit,
        places: PlacesClient,
        base_url: &str,
    ) -> Self {
        Self {
            api_keys,
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units,
            places,
        }
    }

    fn unit_param(&self) -> &'static str {
        match self.units {
            TemperatureUnit::Celsius => "metric",
            TemperatureUnit::Fahrenheit => "imperial",
        }
    }

    /// GET `endpoint`, retrying with the next key while the upstream answers 404.
    ///
    /// Each key is tried at most once. With no key configured a single request
    /// is sent without one.
    async fn get_with_key_pool(
        &self,
        endpoint: &str,
        location: &LocationInfo,
        extra: &[(&str, &str)],
    ) -> Result<Upstream, WeatherError> {
        let url = format!("{}{endpoint}", self.base_url);
        let lat = location.lat.to_string();
        let lng = location.lng.to_string();

        let no_key = [String::new()];
        let keys = if self.api_keys.is_empty() {
            &no_key[..]
        } else {
            &self.api_keys[..]
        };

        for (attempt, key) in keys.iter().enumerate() {
            tracing::debug!("Using URL: {url} (key #{attempt})");

            let res = self
                .http
                .get(&url)
                .query(&[
                    ("lat", lat.as_str()),
                    ("lon", lng.as_str()),
                    ("units", self.unit_param()),
                ])
                .query(extra)
                .query(&[("APPID", key.as_str())])
                .send()
                .await?;

            let status = res.status();
            let body = res.text().await?;

            if status == StatusCode::NOT_FOUND {
                tracing::debug!("Could not retrieve {endpoint}, retry #{attempt}");
                continue;
            }

            if !status.is_success() {
                return Ok(Upstream::Failed(format!(
                    "{endpoint} failed with status {status}: {}",
                    truncate_body(&body)
                )));
            }

            return Ok(Upstream::Body(body));
        }

        Ok(Upstream::Failed(format!(
            "{endpoint} not found with any of {} key(s)",
            keys.len()
        )))
    }

    fn apply_current(&self, current: &OwmCurrentResponse, record: &mut WeatherRecord) {
        let (Some(weather), Some(main), Some(wind)) =
            (current.weather.first(), &current.main, &current.wind)
        else {
            return;
        };

        match main.temp {
            Some(temp) => {
                record.temperature = round_temperature(temp);
                record.feels_like = record.temperature;
            }
            None => tracing::warn!("openweathermap: current weather has no temperature"),
        }
        record.humidity = main.humidity.map(|h| (h.round() as i32).to_string());

        match weather.id {
            Some(id) => {
                let night = weather.icon.as_deref().is_some_and(|icon| icon.contains('n'));
                record.condition_code = condition_code(id, night);
            }
            None => tracing::warn!("openweathermap: current weather has no condition"),
        }
        record.condition_text = weather.description.clone();

        if let Some(speed) = wind.speed {
            record.wind_speed = Some(match self.units {
                TemperatureUnit::Celsius => ms_to_kmh(speed),
                TemperatureUnit::Fahrenheit => format_speed(speed),
            });
        }
        if let Some(deg) = wind.deg {
            record.wind_direction = deg.round() as i32;
        }
    }
}

fn apply_day(day: &OwmDay, code: &mut i32, low: &mut Option<i32>, high: &mut Option<i32>) {
    *code = day
        .weather
        .first()
        .and_then(|w| w.id)
        .map(|id| condition_code(id, false))
        .unwrap_or(INVALID_CONDITION);

    if let Some(temp) = &day.temp {
        *high = temp.max.map(round_temperature);
        *low = temp.min.map(round_temperature);
    }
}

/// Map a numeric weather id to a condition code.
pub fn condition_code(id: i64, night: bool) -> i32 {
    match id {
        200 | 201 | 210 | 211 | 230 | 231 => 4,
        202 | 212 | 221 | 232 => 3,
        300..=302 | 310..=314 | 321 => 9,
        500..=504 | 520..=522 | 531 => 12,
        511 => 10,
        600 | 601 => 16,
        602 => 41,
        611 | 612 => 18,
        615 | 616 => 5,
        620..=622 => 46,
        701 | 741 => 20,
        711 => 22,
        721 => 21,
        731 | 751 | 761 | 762 => 19,
        771 => 24,
        781 | 900 => 0,
        800 | 950..=955 => {
            if night {
                31
            } else {
                32
            }
        }
        801 | 802 => {
            if night {
                29
            } else {
                30
            }
        }
        803 => {
            if night {
                27
            } else {
                28
            }
        }
        804 => 26,
        901 | 960 | 961 => 1,
        902 | 962 => 2,
        903 => 25,
        904 => 36,
        905 | 956..=959 => 24,
        906 => 17,
        _ => INVALID_CONDITION,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmWeather {
    #[serde(deserialize_with = "lenient")]
    id: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    icon: Option<String>,
    #[serde(deserialize_with = "lenient")]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmMain {
    #[serde(deserialize_with = "lenient")]
    temp: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmWind {
    #[serde(deserialize_with = "lenient")]
    speed: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    deg: Option<f64>,
}

/// Sections of the wrong shape read as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCurrentResponse {
    #[serde(deserialize_with = "lenient")]
    weather: Vec<OwmWeather>,
    #[serde(deserialize_with = "lenient")]
    main: Option<OwmMain>,
    #[serde(deserialize_with = "lenient")]
    wind: Option<OwmWind>,
}

impl OwmCurrentResponse {
    fn is_complete(&self) -> bool {
        !self.weather.is_empty() && self.main.is_some() && self.wind.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmTemp {
    #[serde(deserialize_with = "lenient")]
    min: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmDay {
    #[serde(deserialize_with = "lenient")]
    temp: Option<OwmTemp>,
    #[serde(deserialize_with = "lenient")]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmForecastResponse {
    #[serde(deserialize_with = "lenient")]
    list: Vec<OwmDay>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn fetch_weather(&self, location: &LocationInfo) -> Result<WeatherRecord, WeatherError> {
        if let Some(record) = check_location(self.id(), location) {
            return Ok(record);
        }

        let current_body = match self.get_with_key_pool("/data/2.5/weather", location, &[]).await? {
            Upstream::Body(body) => body,
            Upstream::Failed(reason) => return Ok(api_error(self.id(), reason)),
        };

        let forecast_body = match self
            .get_with_key_pool("/data/2.5/forecast/daily", location, &[("cnt", FORECAST_DAYS)])
            .await?
        {
            Upstream::Body(body) => body,
            Upstream::Failed(reason) => return Ok(api_error(self.id(), reason)),
        };

        let current: OwmCurrentResponse = match serde_json::from_str(&current_body) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(api_error(self.id(), format!("failed to parse current JSON: {e}"))),
        };
        if !current.is_complete() {
            return Ok(api_error(self.id(), "could not parse current weather data"));
        }

        let forecast: OwmForecastResponse = match serde_json::from_str(&forecast_body) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(api_error(self.id(), format!("failed to parse forecast JSON: {e}"))),
        };
        let [today, tomorrow, ..] = forecast.list.as_slice() else {
            return Ok(api_error(self.id(), "forecast has fewer than two days"));
        };

        let mut record = WeatherRecord::new();
        self.apply_current(&current, &mut record);
        apply_day(
            today,
            &mut record.today_forecast_condition_code,
            &mut record.today_low,
            &mut record.today_high,
        );
        apply_day(
            tomorrow,
            &mut record.tomorrow_forecast_condition_code,
            &mut record.tomorrow_low,
            &mut record.tomorrow_high,
        );

        record.location = Some(
            self.places
                .location_name_from_coords(location.lat, location.lng)
                .await,
        );

        Ok(record)
    }

    fn id(&self) -> ProviderId {
        ProviderId::OpenWeatherMap
    }
}
