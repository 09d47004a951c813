//! Endpoints and client settings for the remote collaborators.

use std::path::PathBuf;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Invalid service configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An endpoint is not an absolute `http(s)` URL with a path.
    #[error("invalid {field} URL {value:?}: {reason}")]
    InvalidUrl {
        /// Which setting was wrong.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Where to find the metadata and boundary services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Country metadata endpoint. The canonical name is appended as a
    /// path segment.
    pub metadata_url: String,

    /// Boundary search endpoint. The canonical name is sent as the
    /// `country` query parameter.
    pub boundary_url: String,

    /// `User-Agent` header sent by native clients. Browsers send their
    /// own.
    pub user_agent: String,

    /// Per-request timeout in seconds for native clients.
    pub timeout_secs: u64,

    /// JSON file holding the color memo (native front ends only).
    pub color_memo: Option<PathBuf>,
}

impl ServiceConfig {
    /// REST Countries v3.1 name search.
    pub const DEFAULT_METADATA_URL: &'static str = "https://restcountries.com/v3.1/name";

    /// Nominatim place search.
    pub const DEFAULT_BOUNDARY_URL: &'static str = "https://nominatim.openstreetmap.org/search";

    /// Identifies this client to the public services.
    pub const DEFAULT_USER_AGENT: &'static str = concat!("kuni/", env!("CARGO_PKG_VERSION"));

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Parse a configuration from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::InvalidUrl`] if an endpoint does not validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both endpoints are usable base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] naming the first bad endpoint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_endpoint("metadata", &self.metadata_url)?;
        parse_endpoint("boundary", &self.boundary_url)?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            metadata_url: Self::DEFAULT_METADATA_URL.to_owned(),
            boundary_url: Self::DEFAULT_BOUNDARY_URL.to_owned(),
            user_agent: Self::DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            color_memo: None,
        }
    }
}

/// Parse an endpoint that names can be appended to.
pub(crate) fn parse_endpoint(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_owned(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_owned()));
    }
    Ok(url)
}
