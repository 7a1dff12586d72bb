use crate::{
    Config,
    error::FetchError,
    geocode::GeoResolver,
    model::{FetchRequest, LocationQuery, ProviderData},
    provider::{advanced::AdvancedProvider, standard::StandardProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod advanced;
pub mod standard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Standard,
    Advanced,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Standard => "standard",
            ProviderId::Advanced => "advanced",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Standard, ProviderId::Advanced]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "standard" => Ok(ProviderId::Standard),
            "advanced" => Ok(ProviderId::Advanced),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: standard, advanced."
            )),
        }
    }
}

/// A weather source that can satisfy one fetch cycle.
///
/// One call issues every upstream request the active provider needs (in
/// parallel) and returns the normalized payload bundle for reconciliation.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, request: &FetchRequest) -> Result<ProviderData, FetchError>;
}

/// Transcribe a location query into upstream query parameters. The standard
/// upstream takes either `q=<city>` or `lat=<>&lon=<>`.
pub(crate) fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::City(city) => vec![("q", city.clone())],
        LocationQuery::Point(coords) => {
            vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
        }
    }
}

/// Construct a provider from config and explicit ProviderId.
///
/// The standard API key is required on both paths: the advanced path uses it
/// for geocoding and for the iconography companion calls.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let standard_key = config.provider_api_key(ProviderId::Standard).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider 'standard'.\n\
                 Hint: run `pocket configure standard` and enter your API key."
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Standard => Box::new(StandardProvider::new(standard_key.to_owned())),
        ProviderId::Advanced => {
            let advanced_key = config.provider_api_key(ProviderId::Advanced).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider 'advanced'.\n\
                         Hint: run `pocket configure advanced` and enter your API key."
                )
            })?;

            Box::new(AdvancedProvider::new(
                advanced_key.to_owned(),
                StandardProvider::new(standard_key.to_owned()),
                GeoResolver::new(standard_key.to_owned()),
            ))
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::Coordinates;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn location_params_for_city() {
        let params = location_params(&LocationQuery::City("Paris".into()));
        assert_eq!(params, vec![("q", "Paris".to_string())]);
    }

    #[test]
    fn location_params_for_point() {
        let params = location_params(&LocationQuery::Point(Coordinates { lat: 48.85, lon: 2.35 }));
        assert_eq!(
            params,
            vec![("lat", "48.85".to_string()), ("lon", "2.35".to_string())]
        );
    }

    #[test]
    fn provider_from_config_errors_when_missing_standard_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::Standard, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider 'standard'"));
    }

    #[test]
    fn advanced_provider_requires_both_keys() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Standard, "STD_KEY".to_string());

        let err = provider_from_config(ProviderId::Advanced, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider 'advanced'"));

        cfg.upsert_provider_api_key(ProviderId::Advanced, "ADV_KEY".to_string());
        assert!(provider_from_config(ProviderId::Advanced, &cfg).is_ok());
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `pocket configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Standard, "KEY".to_string());

        let provider = default_provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
