use serde::{Deserialize, Serialize};

/// A view model never carries more than this many hourly slots.
pub const MAX_HOURLY_SLOTS: usize = 16;
/// A view model never carries more than this many daily slots.
pub const MAX_DAILY_SLOTS: usize = 5;

/// Measurement system, passed through verbatim as the `units` query parameter
/// of both upstreams. All numeric values in a view model are in whichever
/// system was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Geographic point, WGS 84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Where the caller wants weather for. Resolved at most once per fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Point(Coordinates),
}

impl LocationQuery {
    /// `"48.85,2.35"` is taken as explicit coordinates, anything else as a
    /// city name ("Paris, FR" stays a city: "FR" is not a number).
    pub fn parse(input: &str) -> Self {
        let point = input.split_once(',').and_then(|(lat, lon)| {
            Some(Coordinates {
                lat: lat.trim().parse().ok()?,
                lon: lon.trim().parse().ok()?,
            })
        });

        match point {
            Some(coords) => LocationQuery::Point(coords),
            None => LocationQuery::City(input.trim().to_string()),
        }
    }
}

/// Canonical location a query resolved to, named from the standard provider's
/// current-conditions payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Provider-agnostic current conditions, fully reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub pressure: f64,
    pub uv_index: Option<f64>,
    /// Standard-provider icon code (e.g. "10d"); always present, borrowed
    /// from the companion payload when the advanced provider is active.
    pub icon_code: String,
    pub description: String,
    pub sunrise: i64,
    pub sunset: i64,
    pub timezone_offset: i32,
    /// Unix timestamp of the observation; drives theme resolution.
    pub observed_at: i64,
}

/// One hourly or daily forecast entry, fully reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSlot {
    pub timestamp: i64,
    pub temperature: f64,
    /// `None` when no standard-provider slot was available to borrow an icon
    /// from; the renderer shows a placeholder.
    pub icon_code: Option<String>,
    pub precipitation_pct: Option<f64>,
    pub is_daily: bool,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
}

/// Non-fatal degradation recorded during a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// The active provider's forecast call failed; hourly/daily are empty.
    ForecastUnavailable,
    /// The standard-provider forecast companion call failed on the advanced
    /// path; forecast slots fall back to placeholder icons.
    IconForecastUnavailable,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ForecastUnavailable => f.write_str("forecast data unavailable"),
            Warning::IconForecastUnavailable => {
                f.write_str("icon forecast unavailable, showing placeholders")
            }
        }
    }
}

/// The final data shape consumed by presentation. Constructed fresh on every
/// successful fetch cycle, never mutated incrementally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub location: ResolvedLocation,
    pub current: CurrentConditions,
    /// Chronological, at most [`MAX_HOURLY_SLOTS`] entries.
    pub hourly: Vec<ForecastSlot>,
    /// Chronological, at most [`MAX_DAILY_SLOTS`] entries.
    pub daily: Vec<ForecastSlot>,
    pub warnings: Vec<Warning>,
}

/// One fetch-cycle request as issued by the caller.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub query: LocationQuery,
    pub units: Units,
}

// --- Provider intermediate representation ---
//
// Each adapter converts its upstream's JSON into these shapes; the reconciler
// never sees raw payloads. The standard payload is present on both paths
// because the advanced path fetches it as an icon companion.

/// Normalized standard-provider current observation.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardCurrent {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub pressure: f64,
    pub uv_index: Option<f64>,
    pub icon_code: String,
    pub description: String,
    pub sunrise: i64,
    pub sunset: i64,
    pub timezone_offset: i32,
    pub observed_at: i64,
}

/// Normalized standard-provider 3-hourly forecast entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardSlot {
    pub timestamp: i64,
    pub temperature: f64,
    pub icon_code: String,
    /// Probability of precipitation as the upstream 0..=1 fraction.
    pub pop_fraction: f64,
}

/// Normalized advanced-provider realtime observation (numeric fields only;
/// the advanced upstream exposes no icon set the mapper understands).
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedCurrent {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub pressure: f64,
    pub uv_index: Option<f64>,
}

/// Normalized advanced-provider timeline entry (hourly or daily cadence).
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedSlot {
    pub timestamp: i64,
    pub temperature: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// Already a percentage on this upstream, unlike the standard fraction.
    pub precipitation_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedPayload {
    pub current: AdvancedCurrent,
    pub hourly: Vec<AdvancedSlot>,
    pub daily: Vec<AdvancedSlot>,
}

/// Everything one adapter fetch produced, ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderData {
    pub location: ResolvedLocation,
    pub standard_current: StandardCurrent,
    pub standard_forecast: Vec<StandardSlot>,
    pub advanced: Option<AdvancedPayload>,
    pub warnings: Vec<Warning>,
}
