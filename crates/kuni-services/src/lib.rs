//! kuni-services: network collaborators and native persistence.
//!
//! Implements the [`kuni_core::CountryDirectory`] and
//! [`kuni_core::BoundarySource`] traits over HTTP with `reqwest` (which
//! uses `fetch` on wasm32), plus a JSON-file [`kuni_core::ColorStore`]
//! for native front ends.

pub mod config;
pub mod http;
#[cfg(not(target_arch = "wasm32"))]
pub mod memo;

pub use config::{ConfigError, ServiceConfig};
pub use http::{
    HttpBoundarySource, HttpCountryDirectory, build_client, parse_boundaries, parse_countries,
};
#[cfg(not(target_arch = "wasm32"))]
pub use memo::JsonFileColorStore;
