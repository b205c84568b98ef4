//! Core library for the weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - The widget state store and its fetch cascade (search, unit toggle,
//!   current weather -> hourly/daily forecasts)
//! - The display projection used by front-ends
//!
//! It is used by `weather-widget`, but can also be embedded in other front-ends.

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod observer;
pub mod provider;
pub mod store;
pub mod widget;

pub use config::Config;
pub use display::WidgetView;
pub use error::{Endpoint, FetchError};
pub use model::{CurrentLookup, CurrentWeather, DailyEntry, HourlyEntry, UnitSystem};
pub use observer::{TracingObserver, WidgetObserver};
pub use provider::{WeatherProvider, provider_from_config};
pub use store::{Action, Notification, WidgetState};
pub use widget::Widget;
