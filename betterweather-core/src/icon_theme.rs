//! Icon themes: condition code to icon identifier.
//!
//! Each theme groups codes its own way, so every table is written out in
//! full rather than derived from another.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconTheme {
    #[default]
    Climacons,
    Weathercons,
    Chameleon,
    GoogleNow,
}

impl IconTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconTheme::Climacons => "climacons",
            IconTheme::Weathercons => "weathercons",
            IconTheme::Chameleon => "chameleon",
            IconTheme::GoogleNow => "googlenow",
        }
    }

    pub const fn all() -> &'static [IconTheme] {
        &[
            IconTheme::Climacons,
            IconTheme::Weathercons,
            IconTheme::Chameleon,
            IconTheme::GoogleNow,
        ]
    }

    /// Theme named by a settings value; unknown names fall back to climacons.
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "climacons" => IconTheme::Climacons,
            "weathercons" => IconTheme::Weathercons,
            "chameleon" => IconTheme::Chameleon,
            "googlenow" => IconTheme::GoogleNow,
            other => {
                tracing::debug!("Unknown icon theme '{other}', using climacons");
                IconTheme::Climacons
            }
        }
    }

    pub fn condition_icon(&self, code: i32) -> &'static str {
        match self {
            IconTheme::Climacons => climacons_icon(code),
            IconTheme::Weathercons => weathercons_icon(code),
            IconTheme::Chameleon => chameleon_icon(code),
            IconTheme::GoogleNow => googlenow_icon(code),
        }
    }
}

impl std::fmt::Display for IconTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn climacons_icon(code: i32) -> &'static str {
    match code {
        20 => "climacons_foggy",
        19 | 21 | 22 => "climacons_smoky",
        25 => "climacons_cold",
        26 => "climacons_cloudy",
        27 | 29 => "climacons_partly_cloudy_night",
        28 | 30 | 44 => "climacons_partly_cloudy",
        31 | 33 => "climacons_clear_night",
        23 | 32 | 34 | 36 => "climacons_sunny",
        0 | 1 | 2 | 24 => "climacons_windy",
        5 | 6 | 7 | 8 | 10 | 14 | 18 => "climacons_mixed_rain_and_snow",
        17 | 35 => "climacons_hail",
        9 => "climacons_drizzle",
        11 | 12 => "climacons_showers",
        40 => "climacons_scattered_showers",
        3 | 4 | 37 | 45 | 47 => "climacons_thunderstorms",
        38 | 39 => "climacons_scattered_thunderstorms",
        15 => "climacons_blowing_snow",
        13 | 16 | 41 | 42 | 43 | 46 => "climacons_heavy_snow",
        _ => "climacons_sunny",
    }
}

pub fn weathercons_icon(code: i32) -> &'static str {
    match code {
        20 => "weathercons_foggy",
        19 | 21 | 22 => "weathercons_smoky",
        25 => "weathercons_cold",
        26 => "weathercons_cloudy",
        27 => "weathercons_mostly_cloudy_night",
        29 => "weathercons_partly_cloudy_night",
        28 => "weathercons_mostly_cloudy",
        30 | 44 => "weathercons_partly_cloudy",
        31 | 33 => "weathercons_clear_night",
        23 | 32 | 34 | 36 => "weathercons_sunny",
        0 | 1 | 2 | 24 => "weathercons_windy",
        5 | 6 | 7 | 8 | 10 | 14 | 18 => "weathercons_mixed_rain_and_snow",
        17 | 35 => "weathercons_hail",
        9 => "weathercons_drizzle",
        11 | 12 => "weathercons_showers",
        40 => "weathercons_scattered_showers",
        3 | 4 | 37 | 45 | 47 => "weathercons_thundershowers",
        38 | 39 => "weathercons_scattered_thunderstorms",
        13 | 15 | 16 | 41 | 42 | 43 | 46 => "weathercons_heavy_snow",
        _ => "weathercons_sunny",
    }
}

pub fn chameleon_icon(code: i32) -> &'static str {
    match code {
        19 | 20 => "chameleon_foggy",
        21 => "chameleon_haze",
        26 => "chameleon_cloudy",
        27 => "chameleon_mostly_cloudy_night",
        29 => "chameleon_partly_cloudy_night",
        28 => "chameleon_mostly_cloudy",
        30 | 44 => "chameleon_partly_cloudy",
        31 | 33 => "chameleon_clear_night",
        23 | 32 | 34 | 36 => "chameleon_sunny",
        0 | 1 | 2 | 22 | 24 => "chameleon_windy",
        5 | 6 | 7 | 8 | 10 | 14 | 18 => "chameleon_mixed_rain_and_snow",
        17 | 35 => "chameleon_hail",
        9 => "chameleon_drizzle",
        11 | 12 | 40 => "chameleon_showers",
        4 | 37 => "chameleon_thunderstorms",
        45 | 47 => "chameleon_thundershowers",
        3 | 38 | 39 => "chameleon_scattered_thunderstorms",
        13 | 15 | 16 | 25 | 42 | 46 => "chameleon_cold",
        41 | 43 => "chameleon_heavy_snow",
        _ => "chameleon_sunny",
    }
}

pub fn googlenow_icon(code: i32) -> &'static str {
    match code {
        19 | 20 | 21 => "googlenow_foggy",
        26 => "googlenow_cloudy",
        27 => "googlenow_mostly_cloudy_night",
        29 => "googlenow_partly_cloudy_night",
        28 => "googlenow_mostly_cloudy",
        30 | 44 => "googlenow_partly_cloudy",
        31 | 33 => "googlenow_clear_night",
        23 | 32 | 34 | 36 => "googlenow_sunny",
        0 | 1 | 2 | 22 | 24 => "googlenow_windy",
        5 | 6 | 7 | 8 | 10 | 14 | 17 | 18 | 35 => "googlenow_mixed_rain_and_sleet",
        9 | 11 | 12 | 40 => "googlenow_rain",
        3 | 4 | 37 | 38 | 39 | 45 | 47 => "googlenow_storm",
        13 | 15 | 16 | 25 | 41 | 42 | 43 | 46 => "googlenow_snow",
        _ => "googlenow_unknown",
    }
}
