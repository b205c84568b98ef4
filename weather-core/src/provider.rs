use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, CurrentLookup, DailyEntry, HourlyEntry, UnitSystem},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The three remote calls the widget depends on.
///
/// Implementations return the upstream series untruncated; the store caps
/// them.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &str, units: UnitSystem) -> Result<CurrentLookup, FetchError>;

    async fn hourly(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<HourlyEntry>, FetchError>;

    async fn daily(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<DailyEntry>, FetchError>;
}

/// Construct the OpenWeather provider from config. Fails when no API key is
/// configured, so nothing is fetched without one.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `weather-widget configure` or set WEATHER_API_KEY."
        )
    })?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(provider))
}
