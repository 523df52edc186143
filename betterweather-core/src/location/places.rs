//! Places-search client: coordinates to place identifiers, and name search.

use quick_xml::{Reader, events::Event};
use reqwest::Client;

use crate::{
    error::WeatherError,
    model::{LocationInfo, LocationSearchResult, join_display_name},
};

const DEFAULT_BASE_URL: &str = "http://where.yahooapis.com";

/// Upper bound on results returned by [`PlacesClient::search_by_prefix`].
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Name reported when a coordinate cannot be named.
pub const UNKNOWN_LOCATION_NAME: &str = "N/A";

/// One `<place>` element, with its name hierarchy ordered from most to
/// least specific: name, admin3, admin2, admin1, country.
#[derive(Debug, Clone, Default, PartialEq)]
struct Place {
    woeid: String,
    hierarchy: [String; 5],
    lat: String,
    lng: String,
}

impl Place {
    fn country(&self) -> &str {
        &self.hierarchy[4]
    }

    fn names(&self) -> (String, String) {
        reduce_hierarchy(&self.hierarchy)
    }

    fn into_location_info(self, lat: f64, lng: f64) -> LocationInfo {
        let (small, large) = self.names();
        LocationInfo::new(self.woeid, lat, lng).with_names(small, large)
    }
}

/// Pick the small and large parts of a display name.
///
/// Small is the first non-empty entry; large is the first later non-empty
/// entry that differs from small, or empty when there is none.
pub fn reduce_hierarchy<S: AsRef<str>>(hierarchy: &[S]) -> (String, String) {
    let mut entries = hierarchy
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty());

    let Some(small) = entries.next() else {
        return (String::new(), String::new());
    };
    let large = entries.find(|s| *s != small).unwrap_or_default();

    (small.to_string(), large.to_string())
}

fn hierarchy_slot(element: &[u8]) -> Option<usize> {
    match element {
        b"name" => Some(0),
        b"admin3" => Some(1),
        b"admin2" => Some(2),
        b"admin1" => Some(3),
        b"country" => Some(4),
        _ => None,
    }
}

/// Walk a places response and collect every `<place>`.
///
/// Children are only read in the context they belong to: identifier and
/// names directly under `<place>`, coordinates under `<centroid>`. The
/// bounding box repeats `latitude`/`longitude` and is ignored.
fn parse_places(xml: &str) -> Result<Vec<Place>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut places = Vec::new();
    let mut current: Option<Place> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"place" && current.is_none() {
                    current = Some(Place::default());
                }
                stack.push(name);
            }
            Event::End(e) => {
                stack.pop();
                if e.local_name().as_ref() == b"place" {
                    if let Some(place) = current.take() {
                        places.push(place);
                    }
                }
            }
            Event::Text(e) => {
                let Some(place) = current.as_mut() else {
                    continue;
                };
                let [.., parent, element] = stack.as_slice() else {
                    continue;
                };

                let text = e.unescape()?;
                match (parent.as_slice(), element.as_slice()) {
                    (b"place", b"woeid") => place.woeid.push_str(&text),
                    (b"place", other) => {
                        if let Some(slot) = hierarchy_slot(other) {
                            place.hierarchy[slot].push_str(&text);
                        }
                    }
                    (b"centroid", b"latitude") => place.lat.push_str(&text),
                    (b"centroid", b"longitude") => place.lng.push_str(&text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(places)
}

/// Keep letters, digits, underscores and spaces.
fn sanitize_query(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: Client,
    base_url: String,
    app_id: String,
    lang: Option<String>,
}

impl PlacesClient {
    pub fn new(app_id: String, lang: Option<String>) -> Self {
        Self::with_base_url(app_id, lang, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(app_id: String, lang: Option<String>, base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            lang,
        }
    }

    async fn fetch_places(&self, url: &str) -> Result<Vec<Place>, WeatherError> {
        tracing::debug!("Using places URL: {url}");

        let mut query = vec![("appid", self.app_id.as_str())];
        if let Some(lang) = self.lang.as_deref() {
            query.push(("lang", lang));
        }

        let res = self.http.get(url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::InvalidLocation(format!(
                "places service answered {status}"
            )));
        }

        Ok(parse_places(&body)?)
    }

    /// Resolve a coordinate to a place.
    ///
    /// Fails with [`WeatherError::InvalidLocation`] when the service returns
    /// no place identifier.
    pub async fn resolve(&self, lat: f64, lng: f64) -> Result<LocationInfo, WeatherError> {
        tracing::debug!("Resolving place for {lat}, {lng}");

        let url = format!("{}/v1/places.q('{lat},{lng}')", self.base_url);
        let place = self
            .fetch_places(&url)
            .await?
            .into_iter()
            .next()
            .filter(|p| !p.woeid.trim().is_empty())
            .ok_or_else(|| {
                WeatherError::InvalidLocation(format!("no place identifier for {lat}, {lng}"))
            })?;

        Ok(place.into_location_info(lat, lng))
    }

    /// Resolve a stored place identifier, e.g. from a legacy settings value.
    pub async fn resolve_woeid(&self, woeid: &str) -> Result<LocationInfo, WeatherError> {
        let url = format!("{}/v1/place/{}", self.base_url, woeid.trim());
        let place = self
            .fetch_places(&url)
            .await?
            .into_iter()
            .next()
            .filter(|p| !p.woeid.trim().is_empty())
            .ok_or_else(|| WeatherError::InvalidLocation(format!("unknown place {woeid}")))?;

        let lat = place.lat.trim().parse().unwrap_or(0.0);
        let lng = place.lng.trim().parse().unwrap_or(0.0);
        Ok(place.into_location_info(lat, lng))
    }

    /// Display name for a coordinate, or [`UNKNOWN_LOCATION_NAME`] on any failure.
    pub async fn location_name_from_coords(&self, lat: f64, lng: f64) -> String {
        match self.resolve(lat, lng).await {
            Ok(info) if !info.display_name.is_empty() => info.display_name,
            Ok(_) => UNKNOWN_LOCATION_NAME.to_string(),
            Err(e) => {
                tracing::warn!("Could not look up name for {lat}, {lng}: {e}");
                UNKNOWN_LOCATION_NAME.to_string()
            }
        }
    }

    /// Places whose name starts with `text`, in upstream order.
    ///
    /// Network and parse failures are logged and give an empty list.
    pub async fn search_by_prefix(&self, text: &str) -> Vec<LocationSearchResult> {
        let query = sanitize_query(text);
        if query.is_empty() {
            return Vec::new();
        }

        tracing::debug!("Autocompleting locations starting with '{query}'");

        let url = format!(
            "{}/v1/places.q('{query}');count={MAX_SEARCH_RESULTS}",
            self.base_url
        );

        let places = match self.fetch_places(&url).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!("Error reading place search results: {e}");
                return Vec::new();
            }
        };

        places
            .into_iter()
            .filter(|p| !p.woeid.trim().is_empty())
            .take(MAX_SEARCH_RESULTS)
            .map(|p| {
                let (small, large) = p.names();
                LocationSearchResult {
                    display_name: join_display_name(&small, &large),
                    country: p.country().to_string(),
                    woeid: p.woeid.trim().to_string(),
                    lat: p.lat.trim().to_string(),
                    lng: p.lng.trim().to_string(),
                }
            })
            .collect()
    }
}
