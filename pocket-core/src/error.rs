use thiserror::Error;

/// Failure of a fetch cycle.
///
/// Only mandatory upstream calls produce errors; optional companion calls
/// degrade into [`crate::model::Warning`]s instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Geocoding returned zero results for the query.
    #[error("no matching location found for '{query}'")]
    NotFound { query: String },

    /// A mandatory upstream call answered with a non-success status.
    #[error("{what} request failed: {message}")]
    Upstream { what: &'static str, message: String },

    /// A mandatory upstream call could not be completed at all.
    #[error("failed to reach {what}: {source}")]
    Transport {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered 2xx but the payload did not have the expected shape.
    #[error("failed to parse {what} response: {message}")]
    Decode { what: &'static str, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}
