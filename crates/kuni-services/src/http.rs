//! HTTP implementations of the metadata and boundary collaborators.
//!
//! Metadata comes from REST Countries (`GET {metadata_url}/{name}`),
//! boundaries from Nominatim
//! (`GET {boundary_url}?country={name}&polygon_geojson=1&format=json`).
//! Both return JSON arrays; the parsing is split out into pure
//! functions so it can be tested without a network.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use kuni_core::{BoundaryRecord, BoundarySource, CountryDirectory, CountryRecord, Geometry, LatLng, LookupError};

use crate::config::{ConfigError, ServiceConfig, parse_endpoint};

/// One element of a REST Countries response.
#[derive(Debug, Deserialize)]
struct RestCountry {
    name: RestCountryName,
    #[serde(default)]
    latlng: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RestCountryName {
    common: String,
}

impl From<RestCountry> for CountryRecord {
    fn from(country: RestCountry) -> Self {
        let center = match country.latlng.as_slice() {
            [lat, lng, ..] => Some(LatLng::new(*lat, *lng)),
            _ => None,
        };
        Self {
            name: country.name.common,
            center,
        }
    }
}

/// One element of a Nominatim search response.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    geojson: Option<Geometry>,
}

impl From<NominatimPlace> for BoundaryRecord {
    fn from(place: NominatimPlace) -> Self {
        Self {
            label: place.display_name,
            geometry: place.geojson,
        }
    }
}

/// Decode a REST Countries response body.
///
/// # Errors
///
/// Returns [`LookupError::Decode`] if the body is not an array of
/// country objects.
pub fn parse_countries(body: &str) -> Result<Vec<CountryRecord>, LookupError> {
    let countries: Vec<RestCountry> =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    Ok(countries.into_iter().map(CountryRecord::from).collect())
}

/// Decode a Nominatim search response body.
///
/// # Errors
///
/// Returns [`LookupError::Decode`] if the body is not an array of place
/// objects.
pub fn parse_boundaries(body: &str) -> Result<Vec<BoundaryRecord>, LookupError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    Ok(places.into_iter().map(BoundaryRecord::from).collect())
}

/// Build a client honouring the configured user agent and timeout.
///
/// # Errors
///
/// Returns [`ConfigError::Client`] if the TLS backend cannot be set up.
pub fn build_client(config: &ServiceConfig) -> Result<Client, ConfigError> {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder
        .user_agent(config.user_agent.as_str())
        .timeout(std::time::Duration::from_secs(config.timeout_secs));
    #[cfg(target_arch = "wasm32")]
    let _ = config;
    Ok(builder.build()?)
}

/// GET `url` and return the body, or `None` for a 404.
async fn fetch(client: &Client, url: Url) -> Result<Option<String>, LookupError> {
    debug!(%url, "GET");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LookupError::Transport(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(LookupError::Status {
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| LookupError::Transport(e.to_string()))?;
    Ok(Some(body))
}

/// REST Countries metadata lookup.
#[derive(Debug, Clone)]
pub struct HttpCountryDirectory {
    client: Client,
    base: Url,
}

impl HttpCountryDirectory {
    /// Create a directory with its own client.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a bad endpoint or client setup.
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Self::with_client(build_client(config)?, config)
    }

    /// Create a directory sharing an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a bad endpoint.
    pub fn with_client(client: Client, config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            base: parse_endpoint("metadata", &config.metadata_url)?,
        })
    }

    /// The request URL for `name`; the name is percent-encoded as one
    /// path segment.
    #[must_use]
    pub fn url_for(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }
}

impl CountryDirectory for HttpCountryDirectory {
    /// A 404 (the service's answer for unknown names) is an empty result.
    async fn lookup(&self, name: &str) -> Result<Vec<CountryRecord>, LookupError> {
        match fetch(&self.client, self.url_for(name)).await? {
            Some(body) => parse_countries(&body),
            None => Ok(Vec::new()),
        }
    }
}

/// Nominatim boundary lookup.
#[derive(Debug, Clone)]
pub struct HttpBoundarySource {
    client: Client,
    base: Url,
}

impl HttpBoundarySource {
    /// Create a boundary source with its own client.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a bad endpoint or client setup.
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Self::with_client(build_client(config)?, config)
    }

    /// Create a boundary source sharing an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a bad endpoint.
    pub fn with_client(client: Client, config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            base: parse_endpoint("boundary", &config.boundary_url)?,
        })
    }

    /// The request URL for `name`.
    #[must_use]
    pub fn url_for(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("country", name)
            .append_pair("polygon_geojson", "1")
            .append_pair("format", "json");
        url
    }
}

impl BoundarySource for HttpBoundarySource {
    async fn boundary(&self, name: &str) -> Result<Vec<BoundaryRecord>, LookupError> {
        match fetch(&self.client, self.url_for(name)).await? {
            Some(body) => parse_boundaries(&body),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        ServiceConfig::default()
    }

    #[test]
    fn metadata_url_encodes_name_as_segment() {
        let directory = HttpCountryDirectory::with_client(Client::new(), &config()).unwrap();
        assert_eq!(
            directory.url_for("United States").as_str(),
            "https://restcountries.com/v3.1/name/United%20States"
        );
        assert_eq!(
            directory.url_for("a/b").as_str(),
            "https://restcountries.com/v3.1/name/a%2Fb"
        );
    }

    #[test]
    fn metadata_url_tolerates_trailing_slash() {
        let config = ServiceConfig {
            metadata_url: "http://localhost:8080/name/".to_owned(),
            ..config()
        };
        let directory = HttpCountryDirectory::with_client(Client::new(), &config).unwrap();
        assert_eq!(directory.url_for("Peru").as_str(), "http://localhost:8080/name/Peru");
    }

    #[test]
    fn boundary_url_has_search_parameters() {
        let source = HttpBoundarySource::with_client(Client::new(), &config()).unwrap();
        assert_eq!(
            source.url_for("Côte d'Ivoire").as_str(),
            "https://nominatim.openstreetmap.org/search?country=C%C3%B4te+d%27Ivoire&polygon_geojson=1&format=json"
        );
    }

    #[test]
    fn parses_rest_countries_response() {
        let body = r#"[
            {"name": {"common": "France", "official": "French Republic"},
             "latlng": [46.0, 2.0], "population": 67391582},
            {"name": {"common": "Nowhere"}}
        ]"#;
        let records = parse_countries(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "France");
        assert_eq!(records[0].center, Some(LatLng::new(46.0, 2.0)));
        assert!(records[1].center.is_none());
    }

    #[test]
    fn empty_array_is_no_records() {
        assert!(parse_countries("[]").unwrap().is_empty());
        assert!(parse_boundaries("[]").unwrap().is_empty());
    }

    #[test]
    fn error_object_is_a_decode_error() {
        let err = parse_countries(r#"{"status": 404, "message": "Not Found"}"#).unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn parses_nominatim_response() {
        let body = r#"[
            {"place_id": 1, "display_name": "France",
             "geojson": {"type": "MultiPolygon", "coordinates": [[[[2.0, 48.0], [3.0, 48.0], [3.0, 49.0], [2.0, 48.0]]]]}},
            {"place_id": 2, "display_name": "France, Texas"}
        ]"#;
        let records = parse_boundaries(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label.as_deref(), Some("France"));
        assert_eq!(records[0].geometry.as_ref().map(Geometry::kind), Some("MultiPolygon"));
        assert!(records[1].geometry.is_none());
    }

    #[test]
    fn point_geometry_is_kept_as_other() {
        let body = r#"[{"display_name": "Monaco", "geojson": {"type": "Point", "coordinates": [7.4, 43.7]}}]"#;
        let records = parse_boundaries(body).unwrap();
        assert_eq!(records[0].geometry.as_ref().map(Geometry::kind), Some("Point"));
    }
}
