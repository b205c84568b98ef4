use std::{fmt, sync::Arc};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use weather_widget_core::{Config, UnitSystem, Widget, WidgetView, provider_from_config};

use crate::{notify::ConsoleObserver, render::render_view};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Weather widget for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, base URL, default location and units.
    Configure,

    /// Show current weather and forecasts once.
    Show {
        /// Location name; defaults to the configured default location.
        location: Option<String>,

        /// Unit system: "metric" or "imperial".
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// Run the widget interactively: search, toggle °C/°F, refresh.
    Interactive {
        /// Unit system to start with.
        #[arg(long)]
        units: Option<UnitSystem>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, units } => show(location, units).await,
            Command::Interactive { units } => interactive(units).await,
        }
    }
}

fn build_widget(
    config: &Config,
    location: Option<String>,
    units: Option<UnitSystem>,
) -> anyhow::Result<Widget> {
    let provider = provider_from_config(config)?;
    let location = location.unwrap_or_else(|| config.default_location.clone());
    let units = units.unwrap_or(config.units);
    tracing::debug!(%location, %units, base_url = %config.base_url, "starting widget");

    Ok(Widget::new(provider, Arc::new(ConsoleObserver::default()), location, units))
}

fn print_widget(widget: &Widget) -> anyhow::Result<()> {
    let mut text = String::new();
    render_view(&mut text, &WidgetView::project(widget.state(), &Local))
        .context("Failed to render widget")?;
    print!("{text}");
    Ok(())
}

async fn show(location: Option<String>, units: Option<UnitSystem>) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let mut widget = build_widget(&config, location, units)?;

    widget.load();
    widget.settle().await;
    print_widget(&widget)?;

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Search,
    ToggleUnits,
    Refresh,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 4] =
        [MenuItem::Search, MenuItem::ToggleUnits, MenuItem::Refresh, MenuItem::Quit];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuItem::Search => "Search for location",
            MenuItem::ToggleUnits => "Toggle °C/°F",
            MenuItem::Refresh => "Refresh",
            MenuItem::Quit => "Quit",
        })
    }
}

/// Esc and Ctrl-C end the session instead of failing it.
fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

async fn interactive(units: Option<UnitSystem>) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let mut widget = build_widget(&config, None, units)?;

    widget.load();
    widget.settle().await;

    loop {
        println!();
        print_widget(&widget)?;
        println!();

        let choice = match Select::new("What next?", MenuItem::ALL.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(err) if is_cancel(&err) => break,
            Err(err) => return Err(err).context("Failed to read menu choice"),
        };

        match choice {
            MenuItem::Search => {
                let input = match Text::new("Search for location:").prompt() {
                    Ok(input) => input,
                    Err(err) if is_cancel(&err) => continue,
                    Err(err) => return Err(err).context("Failed to read location"),
                };
                widget.edit_location(input);
                widget.search();
            }
            MenuItem::ToggleUnits => widget.toggle_units(),
            MenuItem::Refresh => widget.load(),
            MenuItem::Quit => break,
        }

        widget.settle().await;
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key_help = if config.api_key().is_some() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://openweathermap.org/api"
    };
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(key_help)
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let base_url = Text::new("API base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;
    config.base_url = base_url;

    let default_location = Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()
        .context("Failed to read default location")?;
    config.default_location = default_location;

    let units = UnitSystem::all();
    let cursor = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", units.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read units")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
