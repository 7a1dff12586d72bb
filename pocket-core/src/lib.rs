//! Core library for the Weather Pocket dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding and the abstraction over weather providers
//! - The reconciler that merges multi-provider payloads into one view model
//! - Fetch-cycle ordering (last request wins)
//! - Pure presentation helpers: icon mapping, theme derivation, time/wind formatting
//!
//! It is used by `pocket-cli`, but can also be reused by other frontends.

pub mod config;
pub mod error;
pub mod format;
pub mod geocode;
pub mod icon;
pub mod model;
pub mod provider;
pub mod reconcile;
pub mod session;
pub mod theme;

pub use config::{Config, ProviderConfig};
pub use error::FetchError;
pub use geocode::GeoResolver;
pub use model::{
    CurrentConditions, FetchRequest, ForecastSlot, LocationQuery, ResolvedLocation, Units,
    ViewModel, Warning,
};
pub use provider::{ProviderId, WeatherProvider, default_provider_from_config, provider_from_config};
pub use reconcile::build_view_model;
pub use session::Session;
