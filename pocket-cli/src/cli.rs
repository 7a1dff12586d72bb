use anyhow::Context;
use clap::{Parser, Subcommand};

use pocket_core::{
    Config, FetchRequest, ForecastSlot, GeoResolver, LocationQuery, ProviderId, Session, Units,
    ViewModel, provider_from_config,
};
use pocket_core::format::{degrees_to_cardinal, format_time};
use pocket_core::icon::map_icon;
use pocket_core::theme::resolve_theme;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pocket", version, about = "Weather Pocket dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, "standard" or "advanced".
        provider: String,
    },

    /// Show the weather dashboard for a location.
    Show {
        /// City name ("Paris, FR") or coordinates ("48.85,2.35").
        location: String,

        /// Provider to fetch with; defaults to the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Measurement system, "metric" or "imperial".
        #[arg(long)]
        units: Option<String>,
    },

    /// Print city-name suggestions for a partial query.
    Suggest {
        /// At least three characters of a city name.
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { location, provider, units } => {
                show(&location, provider.as_deref(), units.as_deref()).await
            }
            Command::Suggest { query } => suggest(&query).await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = inquire::Text::new(&format!("API key for '{id}':"))
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved API key for '{id}' to {}", Config::config_file_path()?.display());
    if id == ProviderId::Advanced && !config.is_provider_configured(ProviderId::Standard) {
        println!(
            "Note: the advanced provider also needs a standard API key \
             (geocoding and icons). Run `pocket configure standard` next."
        );
    }

    Ok(())
}

async fn show(location: &str, provider: Option<&str>, units: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;

    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    let units = match units {
        Some(name) => Units::try_from(name)?,
        None => config.default_units()?,
    };

    let provider = provider_from_config(id, &config)?;
    let session = Session::new();
    let request = FetchRequest { query: LocationQuery::parse(location), units };

    let view = session.fetch(provider.as_ref(), &request).await?;
    // A lone cycle cannot be superseded.
    let Some(view) = view else { return Ok(()) };

    render(&view, units);
    Ok(())
}

async fn suggest(query: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.provider_api_key(ProviderId::Standard).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider 'standard'.\n\
             Hint: run `pocket configure standard` and enter your API key."
        )
    })?;

    let geo = GeoResolver::new(api_key.to_owned());
    let suggestions = geo.suggestions(query).await;

    if suggestions.is_empty() {
        println!("No suggestions.");
    }
    for suggestion in suggestions {
        println!("{suggestion}");
    }

    Ok(())
}

fn render(view: &ViewModel, units: Units) {
    let (temp_unit, speed_unit) = match units {
        Units::Metric => ("°C", "m/s"),
        Units::Imperial => ("°F", "mph"),
    };
    let current = &view.current;
    let tz = current.timezone_offset;

    println!("{}", view.location.name);
    println!("theme: {}", resolve_theme(current).class_name());
    println!();
    println!(
        "  {:.0}{temp_unit}  {}  [{}]",
        current.temperature,
        current.description,
        icon_label(Some(current.icon_code.as_str())),
    );
    println!("  Feels like: {:.0}{temp_unit}", current.feels_like);
    println!("  Humidity:   {:.0}%", current.humidity);
    println!(
        "  Wind:       {:.1} {speed_unit} ({})",
        current.wind_speed,
        degrees_to_cardinal(current.wind_deg)
    );
    println!("  Pressure:   {:.0} hPa", current.pressure);
    match current.uv_index {
        Some(uvi) => println!("  UV Index:   {uvi}"),
        None => println!("  UV Index:   N/A"),
    }
    println!("  Sunrise:    {}", format_time(current.sunrise, tz));
    println!("  Sunset:     {}", format_time(current.sunset, tz));

    if !view.hourly.is_empty() {
        println!();
        println!("Hourly forecast");
        for slot in &view.hourly {
            println!("  {}", hourly_line(slot, tz, temp_unit));
        }
    }

    if !view.daily.is_empty() {
        println!();
        println!("{}-day forecast", view.daily.len());
        for slot in &view.daily {
            println!("  {}", daily_line(slot, temp_unit));
        }
    }

    for warning in &view.warnings {
        println!();
        println!("warning: {warning}");
    }
}

fn hourly_line(slot: &ForecastSlot, tz: i32, temp_unit: &str) -> String {
    let pop = match slot.precipitation_pct {
        Some(pct) if pct > 5.0 => format!("  {pct:.0}%"),
        _ => String::new(),
    };

    format!(
        "{}  {:>4.0}{temp_unit}  [{}]{pop}",
        format_time(slot.timestamp, tz),
        slot.temperature,
        icon_label(slot.icon_code.as_deref()),
    )
}

fn daily_line(slot: &ForecastSlot, temp_unit: &str) -> String {
    let day = chrono_weekday(slot.timestamp);
    let max = slot.temp_max.unwrap_or(slot.temperature);
    let min = slot.temp_min.unwrap_or(slot.temperature);

    format!(
        "{day}  {max:>4.0}{temp_unit} / {min:.0}{temp_unit}  [{}]",
        icon_label(slot.icon_code.as_deref()),
    )
}

fn chrono_weekday(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_else(|| "---".to_string())
}

fn icon_label(code: Option<&str>) -> String {
    match map_icon(code).asset_id() {
        Some(id) => format!("icon {id:02}"),
        None => "no icon".to_string(),
    }
}
