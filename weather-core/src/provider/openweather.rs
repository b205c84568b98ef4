use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::{Endpoint, FetchError, truncate_body},
    model::{Coordinates, CurrentLookup, CurrentWeather, DailyEntry, HourlyEntry, UnitSystem},
};

use super::WeatherProvider;

/// Sections left out of the hourly one-call request.
pub const HOURLY_EXCLUDE: &str = "current,minutely,daily,alerts";
/// Sections left out of the daily one-call request.
pub const DAILY_EXCLUDE: &str = "current,minutely,hourly,alerts";

const NOT_FOUND_MESSAGE: &str = "city not found";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` is the API root the versioned paths hang off, e.g.
    /// `https://api.openweathermap.org/data/`.
    pub fn new(api_key: String, base_url: String, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, String), FetchError> {
        tracing::debug!(%endpoint, path, "sending request");

        let res = self
            .http
            .get(self.url(path))
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        Ok((status, body))
    }

    async fn one_call(
        &self,
        endpoint: Endpoint,
        coordinates: Coordinates,
        exclude: &str,
        units: UnitSystem,
    ) -> Result<OwOneCall, FetchError> {
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();

        let (status, body) = self
            .get(
                endpoint,
                "3.0/onecall",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("exclude", exclude),
                    ("units", units.as_query()),
                ],
            )
            .await?;

        if !status.is_success() {
            return Err(status_error(endpoint, status, &body));
        }

        parse(endpoint, &body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, location: &str, units: UnitSystem) -> Result<CurrentLookup, FetchError> {
        let endpoint = Endpoint::Current;
        let (status, body) = self
            .get(endpoint, "2.5/weather", &[("q", location), ("units", units.as_query())])
            .await?;

        if status == StatusCode::NOT_FOUND && is_lookup_miss(&body) {
            return Ok(CurrentLookup::NotFound);
        }

        if !status.is_success() {
            return Err(status_error(endpoint, status, &body));
        }

        let parsed: OwCurrentResponse = parse(endpoint, &body)?;
        Ok(CurrentLookup::Found(parsed.into()))
    }

    async fn hourly(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<HourlyEntry>, FetchError> {
        let parsed = self.one_call(Endpoint::Hourly, coordinates, HOURLY_EXCLUDE, units).await?;

        Ok(parsed
            .hourly
            .unwrap_or_default()
            .into_iter()
            .map(|h| HourlyEntry {
                dt: h.dt,
                temperature: h.temp,
                icon: first_icon(&h.weather),
            })
            .collect())
    }

    async fn daily(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<DailyEntry>, FetchError> {
        let parsed = self.one_call(Endpoint::Daily, coordinates, DAILY_EXCLUDE, units).await?;

        Ok(parsed
            .daily
            .unwrap_or_default()
            .into_iter()
            .map(|d| DailyEntry {
                dt: d.dt,
                min: d.temp.min,
                max: d.temp.max,
                description: d.weather.first().map(|w| w.description.clone()),
                icon: first_icon(&d.weather),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    coord: Option<OwCoord>,
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(res: OwCurrentResponse) -> Self {
        let first = res.weather.into_iter().next();
        let wind = res.wind.unwrap_or(OwWind { speed: None, deg: None });

        CurrentWeather {
            name: res.name,
            temperature: res.main.temp,
            description: first.as_ref().map(|w| w.description.clone()),
            icon: first.and_then(|w| w.icon),
            humidity: res.main.humidity,
            wind_speed: wind.speed,
            wind_deg: wind.deg,
            coordinates: res.coord.map(|c| Coordinates { lat: c.lat, lon: c.lon }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwHourly {
    dt: i64,
    temp: f64,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    temp: OwDailyTemp,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwOneCall {
    hourly: Option<Vec<OwHourly>>,
    daily: Option<Vec<OwDaily>>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

fn is_lookup_miss(body: &str) -> bool {
    serde_json::from_str::<OwErrorBody>(body)
        .map(|e| e.message.eq_ignore_ascii_case(NOT_FOUND_MESSAGE))
        .unwrap_or(false)
}

fn first_icon(weather: &[OwWeather]) -> Option<String> {
    weather.first().and_then(|w| w.icon.clone())
}

fn parse<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Parse { endpoint, source })
}

fn status_error(endpoint: Endpoint, status: StatusCode, body: &str) -> FetchError {
    FetchError::Status {
        endpoint,
        status,
        body: truncate_body(body),
    }
}
