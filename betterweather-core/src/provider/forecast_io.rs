use async_trait::async_trait;
use reqwest::Client;
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

const DEFAULT_BASE_URL: &str = "https://api.forecast.io";

#[derive(Debug, Clone)]
pub struct ForecastIoProvider {
    api_key: String,
    http: Client,
    base_url: String,
    units: TemperatureUnit,
    places: PlacesClient,
}

impl ForecastIoProvider {
    pub fn new(api_key: String, units: TemperatureUnit, places: PlacesClient) -> Self {
        Self::with_base_url(api_key, units, places, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: String,
        units: TemperatureUnit,
        places: PlacesClient,
        base_url: &str,
    ) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units,
            places,
        }
    }

    fn unit_param(&self) -> &'static str {
        match self.units {
            TemperatureUnit::Celsius => "si",
            TemperatureUnit::Fahrenheit => "us",
        }
    }

    fn apply_currently(&self, currently: &FioCurrently, record: &mut WeatherRecord) {
        match currently.icon.as_deref() {
            Some(icon) => record.condition_code = condition_code(icon),
            None => tracing::warn!("forecastio: current conditions have no icon"),
        }
        record.condition_text = currently.summary.clone();

        match currently.temperature {
            Some(temp) => record.temperature = round_temperature(temp),
            None => tracing::warn!("forecastio: current conditions have no temperature"),
        }
        record.feels_like = currently
            .apparent_temperature
            .map(round_temperature)
            .unwrap_or(record.temperature);
        if let Some(humidity) = currently.humidity {
            record.humidity = Some(((humidity * 100.0) as i32).to_string());
        }

        if let Some(speed) = currently.wind_speed {
            record.wind_speed = Some(match self.units {
                TemperatureUnit::Celsius => ms_to_kmh(speed),
                TemperatureUnit::Fahrenheit => format_speed(speed),
            });
            if speed != 0.0 {
                record.wind_direction = currently.wind_bearing.map(|b| b.round() as i32).unwrap_or(0);
            }
        }
    }
}

fn apply_day(day: &FioDay, code: &mut i32, low: &mut Option<i32>, high: &mut Option<i32>) {
    *code = day.icon.as_deref().map(condition_code).unwrap_or(INVALID_CONDITION);
    *high = day.temperature_max.map(round_temperature);
    *low = day.temperature_min.map(round_temperature);
}

/// Map an icon name to a condition code.
pub fn condition_code(icon: &str) -> i32 {
    match icon {
        "clear-day" => 32,
        "clear-night" => 31,
        "rain" => 11,
        "snow" => 16,
        "sleet" => 18,
        "wind" => 24,
        "fog" => 20,
        "cloudy" => 26,
        "partly-cloudy-day" => 44,
        "partly-cloudy-night" => 29,
        "hail" => 17,
        "thunderstorm" => 4,
        "tornado" => 0,
        _ => INVALID_CONDITION,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FioCurrently {
    #[serde(deserialize_with = "lenient")]
    icon: Option<String>,
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    temperature: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    apparent_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    humidity: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    wind_speed: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    wind_bearing: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FioDay {
    #[serde(deserialize_with = "lenient")]
    icon: Option<String>,
    #[serde(deserialize_with = "lenient")]
    temperature_max: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    temperature_min: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FioDaily {
    #[serde(deserialize_with = "lenient")]
    data: Vec<FioDay>,
}

/// A section of the wrong shape reads as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FioResponse {
    #[serde(deserialize_with = "lenient")]
    currently: Option<FioCurrently>,
    #[serde(deserialize_with = "lenient")]
    daily: Option<FioDaily>,
}

#[async_trait]
impl WeatherProvider for ForecastIoProvider {
    async fn fetch_weather(&self, location: &LocationInfo) -> Result<WeatherRecord, WeatherError> {
        if let Some(record) = check_location(self.id(), location) {
            return Ok(record);
        }

        let url = format!(
            "{}/forecast/{}/{},{}",
            self.base_url, self.api_key, location.lat, location.lng
        );
        tracing::debug!("Requesting forecast for {},{}", location.lat, location.lng);

        let res = self
            .http
            .get(&url)
            .query(&[("units", self.unit_param())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Ok(api_error(
                self.id(),
                format!("request failed with status {status}: {}", truncate_body(&body)),
            ));
        }

        let parsed: FioResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(api_error(self.id(), format!("failed to parse JSON: {e}"))),
        };

        let Some(currently) = parsed.currently else {
            return Ok(api_error(self.id(), "response has no current conditions"));
        };
        let days = parsed.daily.map(|d| d.data).unwrap_or_default();
        let [today, tomorrow, ..] = days.as_slice() else {
            return Ok(api_error(self.id(), "response has fewer than two forecast days"));
        };

        let mut record = WeatherRecord::new();
        self.apply_currently(&currently, &mut record);
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
        ProviderId::ForecastIo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::UNKNOWN_LOCATION_NAME;
    use crate::model::{ErrorCode, INVALID_TEMPERATURE};
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        json!({
            "latitude": 48.85,
            "longitude": 2.35,
            "currently": {
                "summary": "Partly Cloudy",
                "icon": "partly-cloudy-day",
                "temperature": 7.6,
                "apparentTemperature": 4.4,
                "humidity": 0.876,
                "windSpeed": 5.0,
                "windBearing": 231
            },
            "daily": {
                "data": [
                    { "icon": "rain", "temperatureMin": 3.6, "temperatureMax": 8.4 },
                    { "icon": "clear-day", "temperatureMin": 1.2, "temperatureMax": 6.5 }
                ]
            }
        })
    }

    fn paris() -> LocationInfo {
        LocationInfo::new("615702", 48.85, 2.35).with_names("Paris", "Île-de-France")
    }

    async fn places_answering_name(server: &MockServer) -> PlacesClient {
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/places\.q"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<places><place><woeid>615702</woeid><name>Paris</name>
                <country>France</country><admin1>Île-de-France</admin1><admin2></admin2><admin3></admin3>
                <centroid><latitude>48.85</latitude><longitude>2.35</longitude></centroid></place></places>"#,
            ))
            .mount(server)
            .await;

        PlacesClient::with_base_url("APP".into(), None, &server.uri())
    }

    #[test]
    fn icon_table() {
        assert_eq!(condition_code("clear-day"), 32);
        assert_eq!(condition_code("clear-night"), 31);
        assert_eq!(condition_code("partly-cloudy-night"), 29);
        assert_eq!(condition_code("tornado"), 0);
        assert_eq!(condition_code("hail"), 17);
        assert_eq!(condition_code("meteor-shower"), INVALID_CONDITION);
    }

    #[tokio::test]
    async fn parses_current_and_two_days() {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        Mock::given(method("GET"))
            .and(path("/forecast/KEY/48.85,2.35"))
            .and(query_param("units", "si"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let provider = ForecastIoProvider::with_base_url(
            "KEY".into(),
            TemperatureUnit::Celsius,
            places,
            &server.uri(),
        );
        let record = provider.fetch_weather(&paris()).await.expect("fetch");

        assert_eq!(record.error_code, ErrorCode::None);
        assert_eq!(record.temperature, 8);
        assert_eq!(record.feels_like, 4);
        assert_eq!(record.condition_code, 44);
        assert_eq!(record.condition_text.as_deref(), Some("Partly Cloudy"));
        assert_eq!(record.humidity.as_deref(), Some("87"));
        assert_eq!(record.wind_speed.as_deref(), Some("18"));
        assert_eq!(record.wind_direction, 231);
        assert_eq!(record.today_forecast_condition_code, 11);
        assert_eq!(record.today_low, Some(4));
        assert_eq!(record.today_high, Some(8));
        assert_eq!(record.tomorrow_forecast_condition_code, 32);
        assert_eq!(record.tomorrow_low, Some(1));
        assert_eq!(record.tomorrow_high, Some(7));
        assert_eq!(record.location.as_deref(), Some("Paris, Île-de-France"));
    }

    #[tokio::test]
    async fn calm_wind_has_no_direction() {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        let mut body = sample_body();
        body["currently"]["windSpeed"] = json!(0);

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .and(query_param("units", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = ForecastIoProvider::with_base_url(
            "KEY".into(),
            TemperatureUnit::Fahrenheit,
            places,
            &server.uri(),
        );
        let record = provider.fetch_weather(&paris()).await.expect("fetch");

        assert_eq!(record.wind_speed.as_deref(), Some("0"));
        assert_eq!(record.wind_direction, 0);
    }

    #[tokio::test]
    async fn missing_forecast_section_is_api_error() {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        let mut body = sample_body();
        body.as_object_mut().expect("object").remove("daily");

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = ForecastIoProvider::with_base_url(
            "KEY".into(),
            TemperatureUnit::Celsius,
            places,
            &server.uri(),
        );
        let record = provider.fetch_weather(&paris()).await.expect("fetch");

        assert_eq!(record.error_code, ErrorCode::Api);
        assert!(!record.has_valid_temperature());
    }

    #[tokio::test]
    async fn single_forecast_day_is_api_error() {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        let mut body = sample_body();
        body["daily"]["data"] = json!([{ "icon": "rain" }]);

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = ForecastIoProvider::with_base_url(
            "KEY".into(),
            TemperatureUnit::Celsius,
            places,
            &server.uri(),
        );
        let record = provider.fetch_weather(&paris()).await.expect("fetch");
        assert_eq!(record.error_code, ErrorCode::Api);
    }

    #[tokio::test]
    async fn missing_fields_keep_sentinels() {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        let mut body = sample_body();
        body["currently"] = json!({ "icon": "fog" });

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = ForecastIoProvider::with_base_url(
            "KEY".into(),
            TemperatureUnit::Celsius,
            places,
            &server.uri(),
        );
        let record = provider.fetch_weather(&paris()).await.expect("fetch");

        assert_eq!(record.error_code, ErrorCode::None);
        assert_eq!(record.condition_code, 20);
        assert_eq!(record.temperature, INVALID_TEMPERATURE);
        assert_eq!(record.humidity, None);
        assert_eq!(record.wind_speed, None);
    }

    async fn fetch_with_body(body: serde_json::Value) -> WeatherRecord {
        let server = MockServer::start().await;
        let places = places_answering_name(&server).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        ForecastIoProvider::with_base_url("KEY".into(), TemperatureUnit::Celsius, places, &server.uri())
            .fetch_weather(&paris())
            .await
            .expect("fetch")
    }

    #[tokio::test]
    async fn wrong_typed_field_is_skipped() {
        let mut body = sample_body();
        body["currently"] = json!({ "icon": "rain", "temperature": 7.0, "humidity": "high" });
        body["daily"]["data"][1]["temperatureMax"] = json!("warm");

        let record = fetch_with_body(body).await;

        assert_eq!(record.error_code, ErrorCode::None);
        assert_eq!(record.temperature, 7);
        assert_eq!(record.condition_code, 11);
        assert_eq!(record.humidity, None);
        assert_eq!(record.tomorrow_low, Some(1));
        assert_eq!(record.tomorrow_high, None);
    }

    #[tokio::test]
    async fn wrong_typed_section_is_api_error() {
        let mut body = sample_body();
        body["currently"] = json!("sunny");

        let record = fetch_with_body(body).await;
        assert_eq!(record.error_code, ErrorCode::Api);
    }

    #[tokio::test]
    async fn negative_halves_round_up() {
        let mut body = sample_body();
        body["currently"]["temperature"] = json!(-0.5);
        body["currently"]["apparentTemperature"] = json!(-2.5);
        body["daily"]["data"][0]["temperatureMin"] = json!(-4.5);
        body["daily"]["data"][0]["temperatureMax"] = json!(-0.5);

        let record = fetch_with_body(body).await;

        assert_eq!(record.temperature, 0);
        assert_eq!(record.feels_like, -2);
        assert_eq!(record.today_low, Some(-4));
        assert_eq!(record.today_high, Some(0));
    }

    #[tokio::test]
    async fn feels_like_defaults_to_temperature() {
        let mut body = sample_body();
        body["currently"]
            .as_object_mut()
            .expect("object")
            .remove("apparentTemperature");

        let record = fetch_with_body(body).await;

        assert_eq!(record.temperature, 8);
        assert_eq!(record.feels_like, 8);
        assert_eq!(record.distinct_feels_like(), None);
    }

    #[tokio::test]
    async fn rejected_key_is_api_error_and_name_lookup_failure_is_na() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/forecast/"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let places = PlacesClient::with_base_url("APP".into(), None, &server.uri());
        let provider = ForecastIoProvider::with_base_url(
            "".into(),
            TemperatureUnit::Celsius,
            places.clone(),
            &server.uri(),
        );

        let record = provider.fetch_weather(&paris()).await.expect("fetch");
        assert_eq!(record.error_code, ErrorCode::Api);

        assert_eq!(places.location_name_from_coords(1.0, 2.0).await, UNKNOWN_LOCATION_NAME);
    }
}
