use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    geocode::GeoResolver,
    model::{
        AdvancedCurrent, AdvancedPayload, AdvancedSlot, FetchRequest, LocationQuery, ProviderData,
        Units, Warning,
    },
    provider::{location_params, standard::StandardProvider},
};

use super::{ProviderId, WeatherProvider};

const TIO_API_BASE: &str = "https://api.tomorrow.io/v4/weather";

/// Adapter for the advanced upstream (Tomorrow.io-shaped REST API).
///
/// This upstream only accepts `lat,lon` locations and exposes no icon set the
/// mapper understands, so every fetch also runs the standard adapter at the
/// same coordinates as an iconography companion. All four requests go out in
/// parallel.
#[derive(Debug, Clone)]
pub struct AdvancedProvider {
    api_key: String,
    standard: StandardProvider,
    geo: GeoResolver,
    http: Client,
    base_url: String,
}

impl AdvancedProvider {
    pub fn new(api_key: String, standard: StandardProvider, geo: GeoResolver) -> Self {
        Self {
            api_key,
            standard,
            geo,
            http: Client::new(),
            base_url: TIO_API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different upstream base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_realtime(
        &self,
        location: &str,
        units: Units,
    ) -> Result<AdvancedCurrent, FetchError> {
        let body = self
            .get("realtime", "advanced realtime", location, units, &[])
            .await?;

        let parsed: TioRealtime = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            what: "advanced realtime",
            message: err.to_string(),
        })?;

        let values = parsed.data.values;
        Ok(AdvancedCurrent {
            temperature: values.temperature,
            feels_like: values.temperature_apparent,
            humidity: values.humidity,
            wind_speed: values.wind_speed,
            wind_deg: values.wind_direction,
            pressure: values.pressure_sea_level,
            uv_index: values.uv_index,
        })
    }

    /// One call returns both cadences via `timesteps=1h,1d`.
    async fn fetch_timelines(
        &self,
        location: &str,
        units: Units,
    ) -> Result<(Vec<AdvancedSlot>, Vec<AdvancedSlot>), FetchError> {
        let body = self
            .get(
                "forecast",
                "advanced forecast",
                location,
                units,
                &[("timesteps", "1h,1d")],
            )
            .await?;

        let parsed: TioForecast = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            what: "advanced forecast",
            message: err.to_string(),
        })?;

        let hourly = convert_timeline(parsed.timelines.hourly)?;
        let daily = convert_timeline(parsed.timelines.daily)?;
        Ok((hourly, daily))
    }

    async fn get(
        &self,
        endpoint: &str,
        what: &'static str,
        location: &str,
        units: Units,
        extra: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut query: Vec<(&str, &str)> = vec![
            ("location", location),
            ("apikey", self.api_key.as_str()),
            ("units", units.as_str()),
        ];
        query.extend_from_slice(extra);

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
            return Err(FetchError::Upstream {
                what,
                message: format!("status {status}"),
            });
        }

        Ok(body)
    }
}

fn convert_timeline(slots: Vec<TioSlot>) -> Result<Vec<AdvancedSlot>, FetchError> {
    slots
        .into_iter()
        .map(|slot| {
            let timestamp = DateTime::parse_from_rfc3339(&slot.time)
                .map_err(|err| FetchError::Decode {
                    what: "advanced forecast",
                    message: format!("bad timeline timestamp '{}': {err}", slot.time),
                })?
                .timestamp();

            Ok(AdvancedSlot {
                timestamp,
                temperature: slot.values.temperature,
                temp_min: slot.values.temperature_min,
                temp_max: slot.values.temperature_max,
                precipitation_pct: slot
                    .values
                    .precipitation_probability
                    .or(slot.values.precipitation_probability_avg),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TioRealtime {
    data: TioObservation,
}

#[derive(Debug, Deserialize)]
struct TioObservation {
    values: TioValues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TioValues {
    temperature: f64,
    temperature_apparent: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    pressure_sea_level: f64,
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TioForecast {
    timelines: TioTimelines,
}

#[derive(Debug, Deserialize)]
struct TioTimelines {
    hourly: Vec<TioSlot>,
    daily: Vec<TioSlot>,
}

#[derive(Debug, Deserialize)]
struct TioSlot {
    time: String,
    values: TioSlotValues,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TioSlotValues {
    temperature: Option<f64>,
    temperature_min: Option<f64>,
    temperature_max: Option<f64>,
    precipitation_probability: Option<f64>,
    precipitation_probability_avg: Option<f64>,
}

#[async_trait]
impl WeatherProvider for AdvancedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Advanced
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<ProviderData, FetchError> {
        // Free-text queries must be geocoded first; this upstream has no
        // native city search.
        let coords = self.geo.resolve(&request.query).await?;
        let point = LocationQuery::Point(coords);
        let companion_location = location_params(&point);
        let location = format!("{},{}", coords.lat, coords.lon);

        let (realtime_res, timelines_res, companion_current_res, companion_forecast_res) = tokio::join!(
            self.fetch_realtime(&location, request.units),
            self.fetch_timelines(&location, request.units),
            self.standard.fetch_current(&companion_location, request.units),
            self.standard.fetch_forecast(&companion_location, request.units),
        );

        let current = realtime_res?;
        let (hourly, daily) = timelines_res?;
        // Icons are mandatory on this path; without the companion current
        // payload there is nothing to render the conditions with.
        let (standard_current, resolved) = companion_current_res?;

        let mut warnings = Vec::new();
        let standard_forecast = match companion_forecast_res {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!("icon companion forecast unavailable: {err}");
                warnings.push(Warning::IconForecastUnavailable);
                Vec::new()
            }
        };

        Ok(ProviderData {
            location: resolved,
            standard_current,
            standard_forecast,
            advanced: Some(AdvancedPayload { current, hourly, daily }),
            warnings,
        })
    }
}
