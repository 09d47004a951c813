//! kuni-export: Pure format serializers (sans-IO)
//!
//! Renders the guessed-country map. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, ViewBox, build_ring_data, project, to_svg};
