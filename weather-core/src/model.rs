use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Metric or imperial mode. Controls the `units` query parameter of every
/// request and the suffix shown next to temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value sent as `units=` to the API.
    pub fn as_query(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "° C",
            UnitSystem::Imperial => "° F",
        }
    }

    pub fn wind_speed_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown unit system '{0}'. Supported: metric, imperial.")]
pub struct ParseUnitSystemError(String);

impl FromStr for UnitSystem {
    type Err = ParseUnitSystemError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(UnitSystem::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(UnitSystem::Imperial),
            _ => Err(ParseUnitSystemError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Latest current-weather observation. Replaced wholesale on every
/// successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Canonical place name as returned by the API.
    pub name: String,
    pub temperature: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub humidity: Option<u8>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// Unix timestamp, seconds.
    pub dt: i64,
    pub temperature: f64,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Unix timestamp, seconds.
    pub dt: i64,
    pub min: f64,
    pub max: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxTemp {
    pub min: f64,
    pub max: f64,
}

impl From<&DailyEntry> for MinMaxTemp {
    fn from(day: &DailyEntry) -> Self {
        Self { min: day.min, max: day.max }
    }
}

/// Result of a current-weather call that reached the API.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentLookup {
    Found(CurrentWeather),
    /// The API does not know the queried place.
    NotFound,
}
