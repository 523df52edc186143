//! Temperature/speed unit settings and wind speed helpers.

use serde::{Deserialize, Serialize};

const KMH_TO_MPH: f64 = 0.621371;
const MPH_TO_KMH: f64 = 1.609344;
const MPH_TO_MS: f64 = 0.44704;
const KMH_TO_MS: f64 = 1.0 / 3.6;

/// Unit system the providers are asked to answer in.
///
/// Celsius implies wind speeds in km/h, Fahrenheit implies mph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "c")]
    Celsius,
    #[default]
    #[serde(rename = "f")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "c",
            TemperatureUnit::Fahrenheit => "f",
        }
    }

    /// `"c"` selects Celsius; any other value means Fahrenheit.
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("c") {
            TemperatureUnit::Celsius
        } else {
            TemperatureUnit::Fahrenheit
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display unit for wind speed, stored in settings as an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum SpeedUnit {
    #[default]
    Mph,
    Kmh,
    Ms,
}

impl SpeedUnit {
    /// 0 = mph, 1 = km/h, 2 = m/s; anything else is mph.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => SpeedUnit::Kmh,
            2 => SpeedUnit::Ms,
            _ => SpeedUnit::Mph,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            SpeedUnit::Mph => 0,
            SpeedUnit::Kmh => 1,
            SpeedUnit::Ms => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Mph => "mph",
            SpeedUnit::Kmh => "km/h",
            SpeedUnit::Ms => "m/s",
        }
    }

    pub const fn all() -> &'static [SpeedUnit] {
        &[SpeedUnit::Mph, SpeedUnit::Kmh, SpeedUnit::Ms]
    }

    fn native(units: TemperatureUnit) -> Self {
        match units {
            TemperatureUnit::Celsius => SpeedUnit::Kmh,
            TemperatureUnit::Fahrenheit => SpeedUnit::Mph,
        }
    }
}

impl From<u8> for SpeedUnit {
    fn from(index: u8) -> Self {
        SpeedUnit::from_index(index)
    }
}

impl From<SpeedUnit> for u8 {
    fn from(unit: SpeedUnit) -> Self {
        unit.index()
    }
}

impl std::fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn parse_speed(speed: &str) -> Option<f64> {
    speed.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn convert(value: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
    match (from, to) {
        (SpeedUnit::Kmh, SpeedUnit::Mph) => value * KMH_TO_MPH,
        (SpeedUnit::Kmh, SpeedUnit::Ms) => value * KMH_TO_MS,
        (SpeedUnit::Mph, SpeedUnit::Kmh) => value * MPH_TO_KMH,
        (SpeedUnit::Mph, SpeedUnit::Ms) => value * MPH_TO_MS,
        _ => value,
    }
}

/// Convert a provider wind speed into `target`, rounded to a whole number.
///
/// `native` tells which unit `speed` is in. Empty or unparseable input gives `"0"`.
pub fn convert_speed(native: TemperatureUnit, speed: &str, target: SpeedUnit) -> String {
    let Some(value) = parse_speed(speed) else {
        return "0".to_string();
    };

    let converted = convert(value, SpeedUnit::native(native), target);
    format!("{}", converted.round() as i64)
}

/// Descriptive wind strength, on a Beaufort-like scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSpeedLabel {
    Calm,
    LightAir,
    LightBreeze,
    GentleBreeze,
    ModerateBreeze,
    FreshBreeze,
    StrongBreeze,
    NearGale,
    Gale,
    StrongGale,
    Storm,
    ViolentStorm,
    Hurricane,
    NotAvailable,
}

impl WindSpeedLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "Calm",
            Self::LightAir => "Light air",
            Self::LightBreeze => "Light breeze",
            Self::GentleBreeze => "Gentle breeze",
            Self::ModerateBreeze => "Moderate breeze",
            Self::FreshBreeze => "Fresh breeze",
            Self::StrongBreeze => "Strong breeze",
            Self::NearGale => "Near gale",
            Self::Gale => "Gale",
            Self::StrongGale => "Strong gale",
            Self::Storm => "Storm",
            Self::ViolentStorm => "Violent storm",
            Self::Hurricane => "Hurricane",
            Self::NotAvailable => "N/A",
        }
    }
}

impl std::fmt::Display for WindSpeedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds in mph of every label above [`WindSpeedLabel::Calm`].
const WIND_THRESHOLDS_MPH: [(f64, WindSpeedLabel); 12] = [
    (74.0, WindSpeedLabel::Hurricane),
    (64.0, WindSpeedLabel::ViolentStorm),
    (55.0, WindSpeedLabel::Storm),
    (47.0, WindSpeedLabel::StrongGale),
    (39.0, WindSpeedLabel::Gale),
    (31.0, WindSpeedLabel::NearGale),
    (25.0, WindSpeedLabel::StrongBreeze),
    (18.0, WindSpeedLabel::FreshBreeze),
    (13.0, WindSpeedLabel::ModerateBreeze),
    (8.0, WindSpeedLabel::GentleBreeze),
    (4.0, WindSpeedLabel::LightBreeze),
    (1.0, WindSpeedLabel::LightAir),
];

pub fn wind_speed_label(native: TemperatureUnit, speed: &str) -> WindSpeedLabel {
    let Some(value) = parse_speed(speed) else {
        return WindSpeedLabel::NotAvailable;
    };

    let mph = convert(value, SpeedUnit::native(native), SpeedUnit::Mph);
    WIND_THRESHOLDS_MPH
        .iter()
        .find(|(lower, _)| mph >= *lower)
        .map(|(_, label)| *label)
        .unwrap_or(WindSpeedLabel::Calm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_kmh_to_mph() {
        assert_eq!(convert_speed(TemperatureUnit::Celsius, "100", SpeedUnit::Mph), "62");
    }

    #[test]
    fn converts_mph_to_kmh() {
        assert_eq!(convert_speed(TemperatureUnit::Fahrenheit, "60", SpeedUnit::Kmh), "97");
    }

    #[test]
    fn converts_to_metres_per_second() {
        assert_eq!(convert_speed(TemperatureUnit::Celsius, "36", SpeedUnit::Ms), "10");
        assert_eq!(convert_speed(TemperatureUnit::Fahrenheit, "10", SpeedUnit::Ms), "4");
    }

    #[test]
    fn same_unit_only_rounds() {
        assert_eq!(convert_speed(TemperatureUnit::Celsius, "12.6", SpeedUnit::Kmh), "13");
        assert_eq!(convert_speed(TemperatureUnit::Fahrenheit, "7.2", SpeedUnit::Mph), "7");
    }

    #[test]
    fn missing_speed_is_zero() {
        for target in SpeedUnit::all() {
            assert_eq!(convert_speed(TemperatureUnit::Celsius, "", *target), "0");
            assert_eq!(convert_speed(TemperatureUnit::Fahrenheit, "fast", *target), "0");
        }
    }

    #[test]
    fn speed_unit_index_falls_back_to_mph() {
        assert_eq!(SpeedUnit::from_index(1), SpeedUnit::Kmh);
        assert_eq!(SpeedUnit::from_index(2), SpeedUnit::Ms);
        assert_eq!(SpeedUnit::from_index(7), SpeedUnit::Mph);
    }

    #[test]
    fn wind_label_extremes() {
        assert_eq!(wind_speed_label(TemperatureUnit::Fahrenheit, "0.5"), WindSpeedLabel::Calm);
        assert_eq!(wind_speed_label(TemperatureUnit::Fahrenheit, "75"), WindSpeedLabel::Hurricane);
        assert_eq!(wind_speed_label(TemperatureUnit::Fahrenheit, ""), WindSpeedLabel::NotAvailable);
    }

    #[test]
    fn wind_label_thresholds_are_half_open() {
        let f = TemperatureUnit::Fahrenheit;
        assert_eq!(wind_speed_label(f, "1"), WindSpeedLabel::LightAir);
        assert_eq!(wind_speed_label(f, "3.9"), WindSpeedLabel::LightAir);
        assert_eq!(wind_speed_label(f, "4"), WindSpeedLabel::LightBreeze);
        assert_eq!(wind_speed_label(f, "30.9"), WindSpeedLabel::StrongBreeze);
        assert_eq!(wind_speed_label(f, "31"), WindSpeedLabel::NearGale);
        assert_eq!(wind_speed_label(f, "73.9"), WindSpeedLabel::ViolentStorm);
        assert_eq!(wind_speed_label(f, "74"), WindSpeedLabel::Hurricane);
    }

    #[test]
    fn wind_label_normalizes_kmh_first() {
        // 20 km/h is about 12.4 mph
        assert_eq!(wind_speed_label(TemperatureUnit::Celsius, "20"), WindSpeedLabel::GentleBreeze);
        // 20 mph
        assert_eq!(wind_speed_label(TemperatureUnit::Fahrenheit, "20"), WindSpeedLabel::FreshBreeze);
    }

    #[test]
    fn temperature_unit_from_setting() {
        assert_eq!(TemperatureUnit::from_setting("c"), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::from_setting("C"), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::from_setting("f"), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::from_setting("kelvin"), TemperatureUnit::Fahrenheit);
    }
}
