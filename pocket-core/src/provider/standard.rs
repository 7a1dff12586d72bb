use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{
        FetchRequest, ProviderData, ResolvedLocation, StandardCurrent, StandardSlot, Units,
        Warning,
    },
    provider::location_params,
};

use super::{ProviderId, WeatherProvider};

const OWM_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// Adapter for the standard upstream (OpenWeatherMap-shaped REST API).
#[derive(Debug, Clone)]
pub struct StandardProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl StandardProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: OWM_API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different upstream base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch current conditions. Mandatory on every path; a failure here
    /// aborts the whole fetch cycle.
    pub(crate) async fn fetch_current(
        &self,
        location: &[(&'static str, String)],
        units: Units,
    ) -> Result<(StandardCurrent, ResolvedLocation), FetchError> {
        let body = self.get("weather", "current conditions", location, units).await?;

        let parsed: OwmCurrent =
            serde_json::from_str(&body).map_err(|err| FetchError::Decode {
                what: "current conditions",
                message: err.to_string(),
            })?;

        let (icon_code, description) = parsed
            .weather
            .first()
            .map(|w| (w.icon.clone(), w.description.clone()))
            .unwrap_or_else(|| (String::new(), "Unknown".to_string()));

        let location = ResolvedLocation {
            lat: parsed.coord.lat,
            lon: parsed.coord.lon,
            name: format!("{}, {}", parsed.name, parsed.sys.country),
        };

        let current = StandardCurrent {
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            wind_deg: parsed.wind.deg,
            pressure: parsed.main.pressure,
            uv_index: parsed.uvi,
            icon_code,
            description,
            sunrise: parsed.sys.sunrise,
            sunset: parsed.sys.sunset,
            timezone_offset: parsed.timezone,
            observed_at: parsed.dt,
        };

        Ok((current, location))
    }

    /// Fetch the 3-hourly forecast list. Optional everywhere: callers degrade
    /// to an empty list with a warning when this fails.
    pub(crate) async fn fetch_forecast(
        &self,
        location: &[(&'static str, String)],
        units: Units,
    ) -> Result<Vec<StandardSlot>, FetchError> {
        let body = self.get("forecast", "forecast", location, units).await?;

        let parsed: OwmForecast = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            what: "forecast",
            message: err.to_string(),
        })?;

        let slots = parsed
            .list
            .into_iter()
            .map(|entry| StandardSlot {
                timestamp: entry.dt,
                temperature: entry.main.temp,
                icon_code: entry
                    .weather
                    .first()
                    .map(|w| w.icon.clone())
                    .unwrap_or_default(),
                pop_fraction: entry.pop.unwrap_or(0.0),
            })
            .collect();

        Ok(slots)
    }

    async fn get(
        &self,
        endpoint: &str,
        what: &'static str,
        location: &[(&'static str, String)],
        units: Units,
    ) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut query: Vec<(&str, String)> = location.to_vec();
        query.push(("appid", self.api_key.clone()));
        query.push(("units", units.as_str().to_string()));

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Transport { what, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { what, source })?;

        if !status.is_success() {
            // Surface the upstream's own message when it sent one.
            return Err(FetchError::Upstream {
                what,
                message: upstream_message(&body)
                    .unwrap_or_else(|| format!("status {status}")),
            });
        }

        Ok(body)
    }
}

/// Error payloads carry `{"cod": ..., "message": "..."}`.
fn upstream_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body).ok().map(|e| e.message)
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    coord: OwmCoord,
    weather: Vec<OwmWeather>,
    main: OwmMain,
    wind: OwmWind,
    sys: OwmSys,
    dt: i64,
    name: String,
    timezone: i32,
    uvi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmForecastEntry {
    dt: i64,
    main: OwmForecastMain,
    weather: Vec<OwmWeather>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastEntry>,
}

#[async_trait]
impl WeatherProvider for StandardProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Standard
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<ProviderData, FetchError> {
        let params = location_params(&request.query);

        let (current_res, forecast_res) = tokio::join!(
            self.fetch_current(&params, request.units),
            self.fetch_forecast(&params, request.units),
        );

        let (standard_current, location) = current_res?;

        let mut warnings = Vec::new();
        let standard_forecast = match forecast_res {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!("standard forecast unavailable: {err}");
                warnings.push(Warning::ForecastUnavailable);
                Vec::new()
            }
        };

        Ok(ProviderData {
            location,
            standard_current,
            standard_forecast,
            advanced: None,
            warnings,
        })
    }
}
