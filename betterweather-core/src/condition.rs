//! Condition code taxonomy and the lookups derived from it.
//!
//! Codes follow the legacy Yahoo! Weather table: 0 (tornado) to 47
//! (isolated thundershowers), with -1 for unknown. Several codes share a text
//! key, and the groupings are not contiguous.

use serde::{Deserialize, Serialize};

use crate::model::WeatherRecord;
use crate::units::TemperatureUnit;

/// Human-readable category for a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionText {
    Tornado,
    TropicalStorm,
    Hurricane,
    SevereThunderstorms,
    Thunderstorms,
    MixedRainAndSnow,
    MixedRainAndSleet,
    MixedSnowAndSleet,
    FreezingDrizzle,
    Drizzle,
    FreezingRain,
    Showers,
    SnowFlurries,
    LightSnowShowers,
    BlowingSnow,
    Snow,
    Hail,
    Sleet,
    Dust,
    Foggy,
    Haze,
    Smoky,
    Blustery,
    Windy,
    Cold,
    Cloudy,
    MostlyCloudy,
    PartlyCloudy,
    Clear,
    Sunny,
    Fair,
    MixedRainAndHail,
    Hot,
    IsolatedThunderstorms,
    ScatteredThunderstorms,
    ScatteredShowers,
    HeavySnow,
    ScatteredSnowShowers,
    Thundershowers,
    SnowShowers,
    IsolatedThundershowers,
    NotAvailable,
}

impl ConditionText {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tornado => "Tornado",
            Self::TropicalStorm => "Tropical storm",
            Self::Hurricane => "Hurricane",
            Self::SevereThunderstorms => "Severe thunderstorms",
            Self::Thunderstorms => "Thunderstorms",
            Self::MixedRainAndSnow => "Mixed rain and snow",
            Self::MixedRainAndSleet => "Mixed rain and sleet",
            Self::MixedSnowAndSleet => "Mixed snow and sleet",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Drizzle => "Drizzle",
            Self::FreezingRain => "Freezing rain",
            Self::Showers => "Showers",
            Self::SnowFlurries => "Snow flurries",
            Self::LightSnowShowers => "Light snow showers",
            Self::BlowingSnow => "Blowing snow",
            Self::Snow => "Snow",
            Self::Hail => "Hail",
            Self::Sleet => "Sleet",
            Self::Dust => "Dust",
            Self::Foggy => "Foggy",
            Self::Haze => "Haze",
            Self::Smoky => "Smoky",
            Self::Blustery => "Blustery",
            Self::Windy => "Windy",
            Self::Cold => "Cold",
            Self::Cloudy => "Cloudy",
            Self::MostlyCloudy => "Mostly cloudy",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Clear => "Clear",
            Self::Sunny => "Sunny",
            Self::Fair => "Fair",
            Self::MixedRainAndHail => "Mixed rain and hail",
            Self::Hot => "Hot",
            Self::IsolatedThunderstorms => "Isolated thunderstorms",
            Self::ScatteredThunderstorms => "Scattered thunderstorms",
            Self::ScatteredShowers => "Scattered showers",
            Self::HeavySnow => "Heavy snow",
            Self::ScatteredSnowShowers => "Scattered snow showers",
            Self::Thundershowers => "Thundershowers",
            Self::SnowShowers => "Snow showers",
            Self::IsolatedThundershowers => "Isolated thundershowers",
            Self::NotAvailable => "N/A",
        }
    }
}

impl std::fmt::Display for ConditionText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text key for `code`; anything outside the table is [`ConditionText::NotAvailable`].
pub fn status_text(code: i32) -> ConditionText {
    use ConditionText::*;

    match code {
        0 => Tornado,
        1 => TropicalStorm,
        2 => Hurricane,
        3 => SevereThunderstorms,
        4 => Thunderstorms,
        5 => MixedRainAndSnow,
        6 => MixedRainAndSleet,
        7 => MixedSnowAndSleet,
        8 => FreezingDrizzle,
        9 => Drizzle,
        10 => FreezingRain,
        11 | 12 => Showers,
        13 => SnowFlurries,
        14 => LightSnowShowers,
        15 => BlowingSnow,
        16 => Snow,
        17 => Hail,
        18 => Sleet,
        19 => Dust,
        20 => Foggy,
        21 => Haze,
        22 => Smoky,
        23 => Blustery,
        24 => Windy,
        25 => Cold,
        26 => Cloudy,
        27 | 28 => MostlyCloudy,
        29 | 30 | 44 => PartlyCloudy,
        31 => Clear,
        32 => Sunny,
        33 | 34 => Fair,
        35 => MixedRainAndHail,
        36 => Hot,
        37 => IsolatedThunderstorms,
        38 | 39 => ScatteredThunderstorms,
        40 => ScatteredShowers,
        41 | 43 => HeavySnow,
        42 => ScatteredSnowShowers,
        45 => Thundershowers,
        46 => SnowShowers,
        47 => IsolatedThundershowers,
        _ => NotAvailable,
    }
}

/// Eight-point compass sector of a wind direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl WindDirection {
    /// Sectors start at 23, 67, 113, 157, 203, 247, 293 and 337 degrees;
    /// they are not a uniform 45 degree split.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            23..=66 => Self::NorthEast,
            67..=112 => Self::East,
            113..=156 => Self::SouthEast,
            157..=202 => Self::South,
            203..=246 => Self::SouthWest,
            247..=292 => Self::West,
            293..=336 => Self::NorthWest,
            _ => Self::North,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }
}

/// Coarse icon bucket for small displays (wearables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompactIcon {
    Atmosphere = 0,
    Clear = 1,
    Clouds = 2,
    Drizzle = 3,
    Extreme = 4,
    Rain = 5,
    Snow = 6,
    Storm = 7,
    CloudsNight = 8,
    ClearNight = 9,
    Unknown = 10,
}

impl CompactIcon {
    /// Identifier sent over the wire to the device.
    pub fn id(self) -> u8 {
        self as u8
    }
}

pub fn compact_icon(code: i32) -> CompactIcon {
    match code {
        19..=22 | 24 => CompactIcon::Atmosphere,
        27 | 29 => CompactIcon::CloudsNight,
        26 | 28 | 30 | 44 => CompactIcon::Clouds,
        31 | 33 => CompactIcon::ClearNight,
        23 | 32 | 34 | 36 => CompactIcon::Clear,
        9 => CompactIcon::Drizzle,
        11 | 12 | 35 | 40 => CompactIcon::Rain,
        0..=2 => CompactIcon::Extreme,
        3 | 4 | 37..=39 | 45 | 47 => CompactIcon::Storm,
        5..=8 | 10 | 13..=18 | 25 | 41..=43 | 46 => CompactIcon::Snow,
        _ => CompactIcon::Unknown,
    }
}

/// Short temperature string for a wearable face, e.g. `"12°C"` or `"8*C"`.
///
/// The feels-like reading replaces the ambient one, marked with `*`, only
/// when it is lower and `show_feels_like` is set. A record without a reading
/// gives `"--"`.
pub fn compact_display_temperature(
    record: &WeatherRecord,
    units: TemperatureUnit,
    show_feels_like: bool,
) -> String {
    if !record.has_valid_temperature() {
        return "--".to_string();
    }

    let unit = units.as_str().to_uppercase();
    match record.distinct_feels_like() {
        Some(feels_like) if show_feels_like && feels_like < record.temperature => {
            format!("{feels_like}*{unit}")
        }
        _ => format!("{}°{unit}", record.temperature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_code_has_a_text() {
        for code in 0..=47 {
            assert_ne!(
                status_text(code),
                ConditionText::NotAvailable,
                "code {code} should be mapped"
            );
        }
    }

    #[test]
    fn full_status_table() {
        use ConditionText::*;

        let expected = [
            Tornado, TropicalStorm, Hurricane, SevereThunderstorms, // 0..=3
            Thunderstorms, MixedRainAndSnow, MixedRainAndSleet, MixedSnowAndSleet, // 4..=7
            FreezingDrizzle, Drizzle, FreezingRain, Showers, // 8..=11
            Showers, SnowFlurries, LightSnowShowers, BlowingSnow, // 12..=15
            Snow, Hail, Sleet, Dust, // 16..=19
            Foggy, Haze, Smoky, Blustery, // 20..=23
            Windy, Cold, Cloudy, MostlyCloudy, // 24..=27
            MostlyCloudy, PartlyCloudy, PartlyCloudy, Clear, // 28..=31
            Sunny, Fair, Fair, MixedRainAndHail, // 32..=35
            Hot, IsolatedThunderstorms, ScatteredThunderstorms, ScatteredThunderstorms, // 36..=39
            ScatteredShowers, HeavySnow, ScatteredSnowShowers, HeavySnow, // 40..=43
            PartlyCloudy, Thundershowers, SnowShowers, IsolatedThundershowers, // 44..=47
        ];

        for (code, text) in expected.into_iter().enumerate() {
            assert_eq!(status_text(code as i32), text, "code {code}");
        }
    }

    #[test]
    fn full_compact_icon_table() {
        use CompactIcon::*;

        let expected = [
            Extreme, Extreme, Extreme, Storm, Storm, Snow, // 0..=5
            Snow, Snow, Snow, Drizzle, Snow, Rain, // 6..=11
            Rain, Snow, Snow, Snow, Snow, Snow, // 12..=17
            Snow, Atmosphere, Atmosphere, Atmosphere, Atmosphere, Clear, // 18..=23
            Atmosphere, Snow, Clouds, CloudsNight, Clouds, CloudsNight, // 24..=29
            Clouds, ClearNight, Clear, ClearNight, Clear, Rain, // 30..=35
            Clear, Storm, Storm, Storm, Rain, Snow, // 36..=41
            Snow, Snow, Clouds, Storm, Snow, Storm, // 42..=47
        ];

        for (code, icon) in expected.into_iter().enumerate() {
            assert_eq!(compact_icon(code as i32), icon, "code {code}");
        }
    }

    #[test]
    fn unknown_codes_are_not_available() {
        for code in [-1, 48, 100, 3200, i32::MIN] {
            assert_eq!(status_text(code), ConditionText::NotAvailable);
        }
        assert_eq!(ConditionText::NotAvailable.as_str(), "N/A");
    }

    #[test]
    fn aliased_codes_share_a_text() {
        assert_eq!(status_text(11), ConditionText::Showers);
        assert_eq!(status_text(12), ConditionText::Showers);
        assert_eq!(status_text(27), status_text(28));
        assert_eq!(status_text(29), ConditionText::PartlyCloudy);
        assert_eq!(status_text(44), ConditionText::PartlyCloudy);
        assert_eq!(status_text(33), status_text(34));
        assert_eq!(status_text(38), status_text(39));
        assert_eq!(status_text(41), ConditionText::HeavySnow);
        assert_eq!(status_text(43), ConditionText::HeavySnow);
        // Neighbours are not aliases.
        assert_eq!(status_text(42), ConditionText::ScatteredSnowShowers);
        assert_eq!(status_text(31), ConditionText::Clear);
        assert_eq!(status_text(32), ConditionText::Sunny);
    }

    #[test]
    fn wind_direction_boundaries() {
        let cases = [
            (0, WindDirection::North),
            (22, WindDirection::North),
            (23, WindDirection::NorthEast),
            (66, WindDirection::NorthEast),
            (67, WindDirection::East),
            (112, WindDirection::East),
            (113, WindDirection::SouthEast),
            (157, WindDirection::South),
            (202, WindDirection::South),
            (203, WindDirection::SouthWest),
            (247, WindDirection::West),
            (293, WindDirection::NorthWest),
            (336, WindDirection::NorthWest),
            (337, WindDirection::North),
            (359, WindDirection::North),
        ];

        for (degrees, expected) in cases {
            assert_eq!(WindDirection::from_degrees(degrees), expected, "{degrees} degrees");
        }
    }

    #[test]
    fn wind_direction_is_total_over_a_full_turn() {
        let mut counts = std::collections::HashMap::new();
        for degrees in 0..360 {
            *counts.entry(WindDirection::from_degrees(degrees)).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 8);
        assert_eq!(counts[&WindDirection::North], 46);
        assert_eq!(counts[&WindDirection::NorthEast], 44);
        assert_eq!(counts[&WindDirection::East], 46);
    }

    #[test]
    fn compact_icons_cover_the_table() {
        for code in 0..=47 {
            assert_ne!(compact_icon(code), CompactIcon::Unknown, "code {code}");
        }
        assert_eq!(compact_icon(-1), CompactIcon::Unknown);
        assert_eq!(compact_icon(-1).id(), 10);
    }

    #[test]
    fn compact_icon_groups() {
        assert_eq!(compact_icon(24), CompactIcon::Atmosphere);
        assert_eq!(compact_icon(23), CompactIcon::Clear);
        assert_eq!(compact_icon(29), CompactIcon::CloudsNight);
        assert_eq!(compact_icon(33), CompactIcon::ClearNight);
        assert_eq!(compact_icon(35), CompactIcon::Rain);
        assert_eq!(compact_icon(17), CompactIcon::Snow);
        assert_eq!(compact_icon(25), CompactIcon::Snow);
        assert_eq!(compact_icon(2), CompactIcon::Extreme);
        assert_eq!(compact_icon(47), CompactIcon::Storm);
        assert_eq!(CompactIcon::Storm.id(), 7);
    }

    #[test]
    fn compact_temperature_prefers_lower_feels_like() {
        let mut record = WeatherRecord::new();
        record.temperature = 12;
        record.feels_like = 8;

        assert_eq!(compact_display_temperature(&record, TemperatureUnit::Celsius, true), "8*C");
        assert_eq!(compact_display_temperature(&record, TemperatureUnit::Celsius, false), "12°C");

        record.feels_like = 15;
        assert_eq!(
            compact_display_temperature(&record, TemperatureUnit::Fahrenheit, true),
            "12°F"
        );
    }

    #[test]
    fn compact_temperature_without_reading_is_placeholder() {
        let record = WeatherRecord::new();
        assert!(record.is_valid());

        assert_eq!(compact_display_temperature(&record, TemperatureUnit::Celsius, true), "--");
        assert_eq!(compact_display_temperature(&record, TemperatureUnit::Fahrenheit, false), "--");
    }
}
