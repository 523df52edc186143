//! Codec for the location value kept in settings.
//!
//! Two formats exist in the wild:
//! - legacy: `"<id>,<name>"`
//! - current: `"<id>/<name>/<lat>/<lng>"`
//!
//! An empty value means the device location should be used.

use crate::model::{LocationInfo, LocationSearchResult};

/// Shown instead of a name when no location is stored.
pub const AUTOMATIC_DISPLAY_VALUE: &str = "Automatic";

const DEFAULT_COORDINATE: &str = "0";

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `\d+,[0-9a-zA-Z,. ]*`
fn is_legacy(value: &str) -> bool {
    let Some((id, name)) = value.split_once(',') else {
        return false;
    };
    is_digits(id)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | ' '))
}

/// `-?\d+[,.]?\d*`
fn is_coordinate(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let int_len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if int_len == 0 {
        return false;
    }

    let rest = &s[int_len..];
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(','))
        .unwrap_or(rest);
    rest.chars().all(|c| c.is_ascii_digit())
}

/// `\d+/[^/]*/<coordinate>/<coordinate>`
fn is_full(value: &str) -> bool {
    let parts: Vec<&str> = value.split('/').collect();
    matches!(
        parts.as_slice(),
        [id, _, lat, lng] if is_digits(id) && is_coordinate(lat) && is_coordinate(lng)
    )
}

fn field(value: &str, index: usize) -> Option<String> {
    value
        .split('/')
        .nth(index)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn woeid_from_value(value: &str) -> Option<String> {
    if value.is_empty() || !value.contains('/') {
        return is_legacy(value)
            .then(|| value.split_once(',').map(|(id, _)| id.to_string()))
            .flatten();
    }

    field(value, 0)
}

pub fn display_name_from_value(value: &str) -> Option<String> {
    if value.is_empty() || !value.contains('/') {
        return is_legacy(value)
            .then(|| value.split_once(',').map(|(_, name)| name.trim().to_string()))
            .flatten();
    }

    field(value, 1)
}

/// Latitude of a current-format value, `"0"` otherwise.
pub fn lat_from_value(value: &str) -> String {
    if !is_full(value) {
        return DEFAULT_COORDINATE.to_string();
    }
    field(value, 2).unwrap_or_else(|| DEFAULT_COORDINATE.to_string())
}

/// Longitude of a current-format value, `"0"` otherwise.
pub fn lng_from_value(value: &str) -> String {
    if !is_full(value) {
        return DEFAULT_COORDINATE.to_string();
    }
    field(value, 3).unwrap_or_else(|| DEFAULT_COORDINATE.to_string())
}

/// Label for the settings summary.
pub fn display_value(value: &str) -> String {
    if value.is_empty() || !value.contains('/') {
        return AUTOMATIC_DISPLAY_VALUE.to_string();
    }
    field(value, 1).unwrap_or_default()
}

fn parse_coordinate(s: &str) -> f64 {
    s.replace(',', ".").parse().unwrap_or(0.0)
}

/// Parsed form of a stored location value.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredLocation {
    Automatic,
    Legacy {
        woeid: String,
        name: String,
    },
    Full {
        woeid: String,
        name: String,
        lat: String,
        lng: String,
    },
}

impl StoredLocation {
    /// `None` when a non-empty value has no recognizable place identifier.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Some(StoredLocation::Automatic);
        }

        let woeid = woeid_from_value(value)?;
        let name = display_name_from_value(value).unwrap_or_default();

        if value.contains('/') {
            Some(StoredLocation::Full {
                woeid,
                name,
                lat: lat_from_value(value),
                lng: lng_from_value(value),
            })
        } else {
            Some(StoredLocation::Legacy { woeid, name })
        }
    }

    /// Encode in the current format; [`StoredLocation::Automatic`] is the empty string.
    pub fn encode(&self) -> String {
        match self {
            StoredLocation::Automatic => String::new(),
            StoredLocation::Legacy { woeid, name } => {
                format!("{woeid}/{}/{DEFAULT_COORDINATE}/{DEFAULT_COORDINATE}", clean_name(name))
            }
            StoredLocation::Full {
                woeid,
                name,
                lat,
                lng,
            } => format!("{woeid}/{}/{lat}/{lng}", clean_name(name)),
        }
    }

    pub fn from_search_result(result: &LocationSearchResult) -> Self {
        StoredLocation::Full {
            woeid: result.woeid.clone(),
            name: result.display_name.clone(),
            lat: non_empty_or_default(&result.lat),
            lng: non_empty_or_default(&result.lng),
        }
    }

    pub fn from_location_info(info: &LocationInfo) -> Self {
        StoredLocation::Full {
            woeid: info.woeid.clone(),
            name: info.display_name.clone(),
            lat: info.lat.to_string(),
            lng: info.lng.to_string(),
        }
    }

    /// Location to fetch weather for; `None` means the device position is needed.
    pub fn to_location_info(&self) -> Option<LocationInfo> {
        let (woeid, name, lat, lng) = match self {
            StoredLocation::Automatic => return None,
            StoredLocation::Legacy { woeid, name } => (woeid, name, 0.0, 0.0),
            StoredLocation::Full {
                woeid,
                name,
                lat,
                lng,
            } => (woeid, name, parse_coordinate(lat), parse_coordinate(lng)),
        };

        let (small, large) = name.split_once(", ").unwrap_or((name.as_str(), ""));
        let mut info = LocationInfo::new(woeid.clone(), lat, lng).with_names(small, large);
        info.display_name = name.clone();
        Some(info)
    }
}

fn clean_name(name: &str) -> String {
    name.replace('/', "-")
}

fn non_empty_or_default(s: &str) -> String {
    if s.trim().is_empty() {
        DEFAULT_COORDINATE.to_string()
    } else {
        s.trim().to_string()
    }
}
