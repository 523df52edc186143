use async_trait::async_trait;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use reqwest::Client;
use std::collections::HashMap;

use crate::{
    error::WeatherError,
    model::{FEELS_LIKE_SUPPRESSED, LocationInfo, WeatherRecord},
    units::TemperatureUnit,
};

use super::{ProviderId, WeatherProvider, api_error, check_location, truncate_body};

const DEFAULT_BASE_URL: &str = "http://weather.yahooapis.com";

type Attributes = HashMap<String, String>;

/// Client for the legacy RSS weather feed, keyed by place identifier.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    http: Client,
    base_url: String,
    units: TemperatureUnit,
}

/// Elements of interest collected from one feed document.
///
/// The feed lists today's forecast first and tomorrow's second.
#[derive(Debug, Default)]
struct FeedElements {
    condition: Option<Attributes>,
    forecasts: Vec<Attributes>,
    wind: Option<Attributes>,
    atmosphere: Option<Attributes>,
    has_location: bool,
}

impl YahooProvider {
    pub fn new(units: TemperatureUnit) -> Self {
        Self::with_base_url(units, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(units: TemperatureUnit, base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units,
        }
    }

    fn build_record(&self, feed: FeedElements, location: &LocationInfo) -> WeatherRecord {
        let id = ProviderId::Yahoo;

        let Some(condition) = feed.condition else {
            return api_error(id, "feed has no current condition");
        };
        let Some(today) = feed.forecasts.first() else {
            return api_error(id, "feed has no forecast");
        };

        let mut record = WeatherRecord::new();

        if let Some(temp) = int_attribute(&condition, "temp") {
            record.temperature = temp;
        }
        if let Some(code) = int_attribute(&condition, "code") {
            record.condition_code = code;
        }
        record.condition_text = condition.get("text").cloned();

        if let Some(code) = int_attribute(today, "code") {
            record.today_forecast_condition_code = code;
        }
        record.today_low = int_attribute(today, "low");
        record.today_high = int_attribute(today, "high");

        if let Some(tomorrow) = feed.forecasts.get(1) {
            if let Some(code) = int_attribute(tomorrow, "code") {
                record.tomorrow_forecast_condition_code = code;
            }
            record.tomorrow_low = int_attribute(tomorrow, "low");
            record.tomorrow_high = int_attribute(tomorrow, "high");
        }

        if let Some(wind) = &feed.wind {
            match wind.get("chill").map(|s| s.trim()) {
                Some("") => record.feels_like = FEELS_LIKE_SUPPRESSED,
                Some(_) => {
                    if let Some(chill) = int_attribute(wind, "chill") {
                        record.feels_like = chill;
                    }
                }
                None => {}
            }

            match wind.get("direction").map(|s| s.trim()) {
                Some("") => record.wind_direction = 0,
                Some(_) => {
                    if let Some(direction) = int_attribute(wind, "direction") {
                        record.wind_direction = direction;
                    }
                }
                None => {}
            }

            record.wind_speed = wind.get("speed").cloned();
        }

        if let Some(atmosphere) = &feed.atmosphere {
            record.humidity = atmosphere.get("humidity").cloned();
        }

        if feed.has_location {
            record.location = Some(location.display_name.clone());
        }

        record
    }
}

/// Integer attribute, logging values that are present but unreadable.
fn int_attribute(attrs: &Attributes, name: &str) -> Option<i32> {
    let raw = attrs.get(name)?.trim();
    match raw.parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value.round() as i32),
            _ => {
                tracing::warn!("yahoo: unreadable '{name}' value '{raw}'");
                None
            }
        },
    }
}

fn read_attributes(element: &BytesStart<'_>) -> Result<Attributes, quick_xml::Error> {
    let mut attrs = Attributes::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        attrs.insert(key, attr.unescape_value()?.into_owned());
    }
    Ok(attrs)
}

/// Pull the weather elements out of a feed, matching on local names so the
/// namespace prefix does not matter.
fn parse_feed(xml: &str) -> Result<FeedElements, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = FeedElements::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"condition" => feed.condition = Some(read_attributes(&e)?),
                b"forecast" => feed.forecasts.push(read_attributes(&e)?),
                b"wind" => feed.wind = Some(read_attributes(&e)?),
                b"atmosphere" => feed.atmosphere = Some(read_attributes(&e)?),
                b"location" => feed.has_location = true,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(feed)
}

#[async_trait]
impl WeatherProvider for YahooProvider {
    async fn fetch_weather(&self, location: &LocationInfo) -> Result<WeatherRecord, WeatherError> {
        if let Some(record) = check_location(self.id(), location) {
            return Ok(record);
        }

        let url = format!("{}/forecastrss", self.base_url);
        tracing::debug!("Using URL: {url}?w={}&u={}", location.woeid, self.units);

        let res = self
            .http
            .get(&url)
            .query(&[("w", location.woeid.as_str()), ("u", self.units.as_str())])
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

        let feed = match parse_feed(&body) {
            Ok(feed) => feed,
            Err(e) => return Ok(api_error(self.id(), format!("error parsing weather feed: {e}"))),
        };

        Ok(self.build_record(feed, location))
    }

    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }
}
