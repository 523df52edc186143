//! Plain-text rendering of a weather record.

use betterweather_core::{
    Config, WeatherRecord,
    condition::{WindDirection, compact_display_temperature, status_text},
    units::{convert_speed, wind_speed_label},
};
use chrono::{DateTime, Local, Utc};

const NO_VALUE: &str = "--";

/// Everything the host shows for one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: String,
    pub expanded_title: String,
    pub expanded_body: String,
    pub icon: &'static str,
    /// Short form for a wearable face.
    pub compact: String,
}

impl std::fmt::Display for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.expanded_title)?;
        writeln!(f, "{}", "-".repeat(self.expanded_title.chars().count()))?;
        writeln!(f, "Status: {}", self.status.replace('\n', "  "))?;
        if !self.expanded_body.is_empty() {
            writeln!(f, "{}", self.expanded_body)?;
        }
        writeln!(f, "Icon:   {}", self.icon)?;
        write!(f, "Watch:  {}", self.compact)
    }
}

fn degrees(value: Option<i32>) -> String {
    value.map_or_else(|| NO_VALUE.to_string(), |v| format!("{v}°"))
}

fn low_high(cfg: &Config, low: Option<i32>, high: Option<i32>) -> String {
    if cfg.display.invert_high_low {
        format!("{} / {}", degrees(high), degrees(low))
    } else {
        format!("{} / {}", degrees(low), degrees(high))
    }
}

fn temperature(record: &WeatherRecord) -> String {
    if record.has_valid_temperature() {
        format!("{}°", record.temperature)
    } else {
        NO_VALUE.to_string()
    }
}

fn status(record: &WeatherRecord, cfg: &Config) -> String {
    let mut status = temperature(record);
    if cfg.display.show_high_low {
        status.push('\n');
        status.push_str(&low_high(cfg, record.today_low, record.today_high));
    }
    status
}

fn details_line(record: &WeatherRecord, cfg: &Config) -> Option<String> {
    let mut parts = Vec::new();

    if cfg.display.show_wind_details {
        if let Some(speed) = record.wind_speed.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!(
                "Wind: {} {} {} ({})",
                WindDirection::from_degrees(record.wind_direction).abbreviation(),
                convert_speed(cfg.units, speed, cfg.speed_units),
                cfg.speed_units.label(),
                wind_speed_label(cfg.units, speed),
            ));
        }
    }

    if cfg.display.show_humidity {
        parts.push(format!(
            "Humidity: {}%",
            record.humidity.as_deref().unwrap_or(NO_VALUE)
        ));
    }

    (!parts.is_empty()).then(|| parts.join(", "))
}

fn expanded_body(record: &WeatherRecord, cfg: &Config) -> String {
    let mut lines = Vec::new();

    if cfg.display.show_feels_like {
        if let Some(feels_like) = record.distinct_feels_like() {
            lines.push(format!("Feels like {feels_like}°"));
        }
    }

    lines.extend(details_line(record, cfg));

    if cfg.display.show_today_forecast {
        lines.push(format!(
            "Today: {}, {}",
            status_text(record.today_forecast_condition_code),
            low_high(cfg, record.today_low, record.today_high)
        ));
    }

    if cfg.display.show_tomorrow_forecast {
        lines.push(format!(
            "Tomorrow: {}, {}",
            status_text(record.tomorrow_forecast_condition_code),
            low_high(cfg, record.tomorrow_low, record.tomorrow_high)
        ));
    }

    if !cfg.display.hide_location_name {
        if let Some(location) = record.location.as_deref() {
            lines.push(location.to_string());
        }
    }

    lines.push(updated_stamp(record.fetched_at));

    lines.join("\n")
}

fn updated_stamp(at: DateTime<Utc>) -> String {
    format!("Updated {}", at.with_timezone(&Local).format("%H:%M"))
}

pub fn render(record: &WeatherRecord, cfg: &Config) -> Rendered {
    let icon = cfg.icon_theme().condition_icon(record.condition_code);

    if record.error_code.is_error() {
        return Rendered {
            status: "Error".to_string(),
            expanded_title: record.error_code.title().to_string(),
            expanded_body: record.error_code.expanded_body().to_string(),
            icon,
            compact: NO_VALUE.to_string(),
        };
    }

    let condition = record
        .condition_text
        .clone()
        .unwrap_or_else(|| status_text(record.condition_code).to_string());

    Rendered {
        status: status(record, cfg),
        expanded_title: format!(
            "{}{} - {condition}",
            temperature(record),
            cfg.units.as_str().to_uppercase()
        ),
        expanded_body: expanded_body(record, cfg),
        icon,
        compact: compact_display_temperature(record, cfg.units, cfg.display.show_feels_like),
    }
}
