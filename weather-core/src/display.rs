//! Render-ready projection of [`WidgetState`]. Pure; no I/O.

use chrono::TimeZone;
use serde::Serialize;
use std::fmt::Display;

use crate::{model::UnitSystem, store::WidgetState};

pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn/";

// Shown until the first successful current-weather lookup.
pub const TEMPERATURE_PLACEHOLDER: f64 = 31.0;
pub const HUMIDITY_PLACEHOLDER: u8 = 77;
pub const WIND_SPEED_PLACEHOLDER: f64 = 0.0;
pub const WIND_DEG_PLACEHOLDER: f64 = 0.0;
pub const MIN_MAX_PLACEHOLDER: &str = "--/--";

const MISSING: &str = "--";

pub fn icon_url(icon_code: &str) -> String {
    format!("{ICON_BASE_URL}{icon_code}.png")
}

/// 12-hour clock, e.g. `3:00 PM`.
pub fn format_hour<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%-I:%M %p").to_string(),
        None => MISSING.to_string(),
    }
}

/// Month and day, e.g. `October 17`.
pub fn format_day<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%B %-d").to_string(),
        None => MISSING.to_string(),
    }
}

/// Mean of min and max with exactly 2 decimal places. Rounds the exact
/// binary value, so `10.045` (stored just below) gives `10.04`.
pub fn average_temp(min: f64, max: f64) -> String {
    format!("{:.2}", (min + max) / 2.0)
}

pub fn format_temperature(value: f64, units: UnitSystem) -> String {
    format!("{value}{}", units.temperature_suffix())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyCard {
    pub time: String,
    pub icon_url: Option<String>,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCard {
    pub date: String,
    pub icon_url: Option<String>,
    pub description: String,
    /// Average of the day's min and max, two decimals, with unit suffix.
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub location: String,
    pub units: UnitSystem,
    pub temperature: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub min_max: String,
    pub hourly: Vec<HourlyCard>,
    pub daily: Vec<DailyCard>,
}

impl WidgetView {
    pub fn project<Tz>(state: &WidgetState, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let units = state.units;
        let current = state.current.as_ref();

        let temperature = current.map_or(TEMPERATURE_PLACEHOLDER, |c| c.temperature);
        let humidity = current.map_or(Some(HUMIDITY_PLACEHOLDER), |c| c.humidity);
        let wind_speed = current.map_or(Some(WIND_SPEED_PLACEHOLDER), |c| c.wind_speed);
        let wind_deg = current.map_or(Some(WIND_DEG_PLACEHOLDER), |c| c.wind_deg);

        let min_max = match state.min_max {
            Some(mm) => format!("{}/{}", mm.min, mm.max),
            None => MIN_MAX_PLACEHOLDER.to_string(),
        };

        let hourly = state
            .hourly
            .iter()
            .flatten()
            .map(|h| HourlyCard {
                time: format_hour(h.dt, tz),
                icon_url: h.icon.as_deref().map(icon_url),
                temperature: format_temperature(h.temperature, units),
            })
            .collect();

        let daily = state
            .daily
            .iter()
            .flatten()
            .map(|d| DailyCard {
                date: format_day(d.dt, tz),
                icon_url: d.icon.as_deref().map(icon_url),
                description: d.description.clone().unwrap_or_default(),
                temperature: format!(
                    "{}{}",
                    average_temp(d.min, d.max),
                    units.temperature_suffix()
                ),
            })
            .collect();

        Self {
            location: state.display_location.clone(),
            units,
            temperature: format_temperature(temperature, units),
            description: current.and_then(|c| c.description.clone()).unwrap_or_default(),
            icon_url: current.and_then(|c| c.icon.as_deref()).map(icon_url),
            humidity: humidity.map_or_else(|| MISSING.to_string(), |h| h.to_string()),
            wind_speed: wind_speed.map_or_else(
                || MISSING.to_string(),
                |s| format!("{s} {}", units.wind_speed_suffix()),
            ),
            wind_direction: wind_deg.map_or_else(|| MISSING.to_string(), |d| format!("{d}°")),
            min_max,
            hourly,
            daily,
        }
    }
}
