use std::fmt::{self, Write};

use weather_widget_core::{UnitSystem, WidgetView};

/// Plain-text layout of the widget: header, air conditions, today's hourly
/// forecast and the 7-day list.
pub fn render_view<W: Write>(out: &mut W, view: &WidgetView) -> fmt::Result {
    writeln!(out, "📍 {}", view.location)?;
    write!(out, "   {}", view.temperature)?;
    if !view.description.is_empty() {
        write!(out, "  {}", view.description)?;
    }
    writeln!(out)?;
    if let Some(icon) = &view.icon_url {
        writeln!(out, "   icon: {icon}")?;
    }

    writeln!(out)?;
    writeln!(out, "AIR CONDITIONS")?;
    writeln!(out, "  Humidity             {}", view.humidity)?;
    writeln!(out, "  Min/Max Temperature  {}", view.min_max)?;
    writeln!(out, "  Wind Speed           {}", view.wind_speed)?;
    writeln!(out, "  Wind Direction       {}", view.wind_direction)?;

    if !view.hourly.is_empty() {
        writeln!(out)?;
        writeln!(out, "TODAY'S FORECAST")?;
        for card in &view.hourly {
            writeln!(out, "  {:>8}  {}", card.time, card.temperature)?;
        }
    }

    if !view.daily.is_empty() {
        writeln!(out)?;
        writeln!(out, "7-DAY FORECAST")?;
        for card in &view.daily {
            writeln!(out, "  {:<12}  {:>10}  {}", card.date, card.temperature, card.description)?;
        }
    }

    writeln!(out)?;
    let (metric, imperial) = match view.units {
        UnitSystem::Metric => ("[°C]", " °F "),
        UnitSystem::Imperial => (" °C ", "[°F]"),
    };
    writeln!(out, "{metric} | {imperial}")?;

    Ok(())
}
