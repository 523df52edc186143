use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature sentinel meaning "no reading".
pub const INVALID_TEMPERATURE: i32 = i32::MIN;

/// Condition sentinel meaning "unknown / not available".
pub const INVALID_CONDITION: i32 = -1;

/// Feels-like value the legacy feed reports when it has no wind chill.
pub const FEELS_LIKE_SUPPRESSED: i32 = -1;

/// Outcome of a fetch cycle, carried on every [`WeatherRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCode {
    #[default]
    None,
    Unknown,
    Location,
    Internet,
    Api,
}

impl ErrorCode {
    pub fn is_error(&self) -> bool {
        *self != ErrorCode::None
    }

    /// Short title shown in place of the weather when a fetch failed.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::None => "",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::Location => "Location unavailable",
            ErrorCode::Internet => "No internet connection",
            ErrorCode::Api => "Weather service error",
        }
    }

    pub fn expanded_body(&self) -> &'static str {
        match self {
            ErrorCode::None => "",
            ErrorCode::Unknown => "Something went wrong while refreshing the weather.",
            ErrorCode::Location => {
                "Could not determine your location. Set one manually or enable location services."
            }
            ErrorCode::Internet => "Weather will refresh once a connection is available.",
            ErrorCode::Api => "The weather provider returned an unusable response. Try another provider.",
        }
    }
}

/// Canonical, provider-agnostic weather reading.
///
/// Temperatures are in the unit the provider was asked for. A record whose
/// `error_code` is not [`ErrorCode::None`] carries only sentinels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// [`INVALID_TEMPERATURE`] when absent.
    pub temperature: i32,
    /// Equal to `temperature` when the provider has no distinct apparent
    /// temperature; [`FEELS_LIKE_SUPPRESSED`] or [`INVALID_TEMPERATURE`] when
    /// it must not be shown.
    pub feels_like: i32,
    pub condition_code: i32,
    pub condition_text: Option<String>,
    /// Integer percentage, kept as the provider sent it.
    pub humidity: Option<String>,
    /// Decimal speed in the provider's native unit (km/h for metric, mph otherwise).
    pub wind_speed: Option<String>,
    /// Degrees, 0 = north.
    pub wind_direction: i32,
    pub today_forecast_condition_code: i32,
    pub today_low: Option<i32>,
    pub today_high: Option<i32>,
    pub tomorrow_forecast_condition_code: i32,
    pub tomorrow_low: Option<i32>,
    pub tomorrow_high: Option<i32>,
    pub location: Option<String>,
    pub error_code: ErrorCode,
    pub fetched_at: DateTime<Utc>,
}

impl Default for WeatherRecord {
    fn default() -> Self {
        Self {
            temperature: INVALID_TEMPERATURE,
            feels_like: INVALID_TEMPERATURE,
            condition_code: INVALID_CONDITION,
            condition_text: None,
            humidity: None,
            wind_speed: None,
            wind_direction: 0,
            today_forecast_condition_code: INVALID_CONDITION,
            today_low: None,
            today_high: None,
            tomorrow_forecast_condition_code: INVALID_CONDITION,
            tomorrow_low: None,
            tomorrow_high: None,
            location: None,
            error_code: ErrorCode::None,
            fetched_at: Utc::now(),
        }
    }
}

impl WeatherRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record that only reports `code`.
    pub fn error(code: ErrorCode) -> Self {
        Self {
            error_code: code,
            ..Self::default()
        }
    }

    pub fn has_valid_temperature(&self) -> bool {
        self.temperature > INVALID_TEMPERATURE
    }

    pub fn is_valid(&self) -> bool {
        !self.error_code.is_error()
    }

    /// Feels-like reading worth showing next to the ambient temperature.
    pub fn distinct_feels_like(&self) -> Option<i32> {
        let suppressed = self.feels_like == FEELS_LIKE_SUPPRESSED
            || self.feels_like == INVALID_TEMPERATURE
            || self.feels_like == self.temperature;
        (!suppressed && self.has_valid_temperature()).then_some(self.feels_like)
    }
}

/// A place the weather is requested for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Upstream place identifier; empty means the location is unusable.
    pub woeid: String,
    pub display_name: String,
    pub small_location: String,
    pub large_location: String,
    pub lat: f64,
    pub lng: f64,
}

impl LocationInfo {
    pub fn new(woeid: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            woeid: woeid.into(),
            lat,
            lng,
            ..Self::default()
        }
    }

    /// Attach a display name built from its small/large parts.
    pub fn with_names(mut self, small: impl Into<String>, large: impl Into<String>) -> Self {
        self.small_location = small.into();
        self.large_location = large.into();
        self.display_name = join_display_name(&self.small_location, &self.large_location);
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.woeid.trim().is_empty()
    }
}

/// One hit of an interactive place search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub woeid: String,
    pub display_name: String,
    pub country: String,
    pub lat: String,
    pub lng: String,
}

/// `"small, large"`, or whichever part is present.
pub fn join_display_name(small: &str, large: &str) -> String {
    match (small.is_empty(), large.is_empty()) {
        (false, false) => format!("{small}, {large}"),
        (false, true) => small.to_string(),
        (true, false) => large.to_string(),
        (true, true) => String::new(),
    }
}
