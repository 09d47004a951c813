//! kuni-core: country quiz engine (sans-IO).
//!
//! Turns free-text guesses into scored, colored country outlines:
//! alias canonicalization -> duplicate check -> metadata lookup ->
//! boundary lookup -> geometry normalization -> simplification.
//!
//! This crate has **no I/O dependencies**. The metadata and boundary
//! services are reached through the [`CountryDirectory`] and
//! [`BoundarySource`] traits, and the color memo through
//! [`ColorStore`]. HTTP clients live in `kuni-services`, browser
//! storage and UI in `kuni-io`.

pub mod alias;
pub mod color;
pub mod geometry;
pub mod lookup;
pub mod session;
pub mod simplify;
pub mod types;

pub use alias::{AliasTable, canonicalize};
pub use color::{
    ColorAllocator, ColorError, ColorStore, CountryColors, MemoryColorStore, PALETTE, Rgb,
    StoreError,
};
pub use geometry::{Geometry, normalize};
pub use lookup::{BoundaryRecord, BoundarySource, CountryDirectory, CountryRecord, LookupError};
pub use session::{
    AfterMetadata, Begin, BoundaryLookup, Failure, GameSession, GameSnapshot, GuessedCountry,
    MetadataLookup, Outcome, Phase, PolygonSummary, Rejection,
};
pub use simplify::simplify;
pub use types::{CountryShape, GameConfig, LatLng, MapFocus, Ring, combined_bounds};
