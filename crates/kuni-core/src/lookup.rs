//! Interfaces to the two remote collaborators a submission consults.
//!
//! The core never performs I/O itself. A front end supplies a
//! [`CountryDirectory`] (canonical identity and center point) and a
//! [`BoundarySource`] (raw boundary geometry); the session awaits them
//! at its two suspend points.

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::types::LatLng;

/// One match returned by the country metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Display name as reported by the service.
    pub name: String,
    /// Approximate center of the country, if the service reports one.
    #[serde(default)]
    pub center: Option<LatLng>,
}

/// One match returned by the boundary geometry service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    /// Label the service gave this match, if any.
    #[serde(default)]
    pub label: Option<String>,
    /// Boundary geometry, if the match carries one.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Failure talking to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request never produced a response (DNS, connection, CORS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Country metadata lookup by canonical name.
///
/// An empty vector means the service knows no such country. Errors are
/// reserved for transport and protocol failures.
#[allow(async_fn_in_trait)]
pub trait CountryDirectory {
    /// Look up `name` and return every matching record.
    async fn lookup(&self, name: &str) -> Result<Vec<CountryRecord>, LookupError>;
}

/// Boundary geometry lookup by canonical name.
///
/// Only the first record is consulted by the session.
#[allow(async_fn_in_trait)]
pub trait BoundarySource {
    /// Fetch boundary records for `name`.
    async fn boundary(&self, name: &str) -> Result<Vec<BoundaryRecord>, LookupError>;
}

impl<T: CountryDirectory + ?Sized> CountryDirectory for &T {
    async fn lookup(&self, name: &str) -> Result<Vec<CountryRecord>, LookupError> {
        (**self).lookup(name).await
    }
}

impl<T: BoundarySource + ?Sized> BoundarySource for &T {
    async fn boundary(&self, name: &str) -> Result<Vec<BoundaryRecord>, LookupError> {
        (**self).boundary(name).await
    }
}
