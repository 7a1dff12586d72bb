//! Geocoding via the standard provider's direct-lookup endpoint.
//!
//! Used by the advanced adapter (its upstream has no free-text search) and
//! for city-name suggestions.

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinates, LocationQuery},
};

const GEO_API_BASE: &str = "https://api.openweathermap.org/geo/1.0";
const SUGGESTION_MIN_CHARS: usize = 3;
const SUGGESTION_LIMIT: &str = "5";

#[derive(Debug, Clone)]
pub struct GeoResolver {
    api_key: String,
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    state: Option<String>,
    country: String,
    lat: f64,
    lon: f64,
}

impl GeoEntry {
    fn label(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

impl GeoResolver {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: GEO_API_BASE.to_string(),
        }
    }

    /// Point the resolver at a different upstream base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a location query to coordinates. Explicit coordinates pass
    /// through without a network call; first geocoding match wins.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Coordinates, FetchError> {
        match query {
            LocationQuery::Point(coords) => Ok(*coords),
            LocationQuery::City(city) => self.lookup(city).await,
        }
    }

    async fn lookup(&self, city: &str) -> Result<Coordinates, FetchError> {
        let entries = self.direct(city, "1").await?;

        let first = entries
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound { query: city.to_string() })?;

        Ok(Coordinates { lat: first.lat, lon: first.lon })
    }

    /// City-name suggestions for autocomplete, deduplicated in ranking order.
    /// Best effort: every failure is absorbed into an empty list.
    pub async fn suggestions(&self, query: &str) -> Vec<String> {
        if query.chars().count() < SUGGESTION_MIN_CHARS {
            return Vec::new();
        }

        let entries = match self.direct(query, SUGGESTION_LIMIT).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!("city suggestions unavailable: {err}");
                return Vec::new();
            }
        };

        let mut labels: Vec<String> = Vec::new();
        for entry in &entries {
            let label = entry.label();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    async fn direct(&self, query: &str, limit: &str) -> Result<Vec<GeoEntry>, FetchError> {
        let url = format!("{}/direct", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", limit), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { what: "geocoding", source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { what: "geocoding", source })?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                what: "geocoding",
                message: format!("status {status}"),
            });
        }

        serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            what: "geocoding",
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_passes_explicit_coordinates_through() {
        // No server behind this resolver: a network call would fail the test.
        let geo = GeoResolver::new("KEY".into()).with_base_url("http://127.0.0.1:0");
        let coords = Coordinates { lat: 48.85, lon: 2.35 };

        let resolved = geo
            .resolve(&LocationQuery::Point(coords))
            .await
            .expect("passthrough must not touch the network");

        assert_eq!(resolved, coords);
    }

    #[tokio::test]
    async fn short_suggestion_query_skips_lookup() {
        let geo = GeoResolver::new("KEY".into()).with_base_url("http://127.0.0.1:0");
        assert!(geo.suggestions("pa").await.is_empty());
    }

    #[test]
    fn entry_label_includes_state_when_present() {
        let entry = GeoEntry {
            name: "Portland".into(),
            state: Some("Oregon".into()),
            country: "US".into(),
            lat: 45.5,
            lon: -122.7,
        };
        assert_eq!(entry.label(), "Portland, Oregon, US");

        let entry = GeoEntry {
            name: "Paris".into(),
            state: None,
            country: "FR".into(),
            lat: 48.85,
            lon: 2.35,
        };
        assert_eq!(entry.label(), "Paris, FR");
    }
}
