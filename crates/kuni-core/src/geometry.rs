//! Boundary geometry normalization.
//!
//! Boundary services return GeoJSON geometry objects of varying shape.
//! Only two kinds are drawn:
//!
//! - `Polygon`: the outer ring (the first ring); holes are ignored.
//! - `MultiPolygon`: the outer ring of every member polygon, in order;
//!   holes of every member are ignored.
//!
//! Normalization is two explicit steps:
//!
//! 1. [`outer_rings`] reorders every position from GeoJSON's
//!    `[longitude, latitude]` to [`LatLng`] (latitude first).
//! 2. [`crate::simplify::simplify`] thins each ring with a fixed
//!    tolerance.
//!
//! Any other geometry kind, and missing or malformed coordinates, yield
//! no rings. Callers treat "no rings" as "nothing to draw", never as a
//! failure.

use serde::{Deserialize, Serialize};

use crate::simplify::simplify;
use crate::types::{LatLng, Ring};

/// A GeoJSON position: `[longitude, latitude]` with an optional altitude.
pub type Position = Vec<f64>;

/// A GeoJSON geometry, reduced to the kinds the map can draw.
///
/// Deserializes from any GeoJSON geometry object. Kinds other than
/// `Polygon` and `MultiPolygon`, and drawable kinds whose coordinates
/// do not have the expected nesting, become [`Geometry::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Rings of a single polygon; the first is the outer boundary.
    Polygon(Vec<Vec<Position>>),
    /// Member polygons, each a list of rings.
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    /// Anything else (`Point`, `LineString`, malformed coordinates...).
    Other {
        /// The GeoJSON `type` member as received.
        kind: String,
    },
}

impl Geometry {
    /// The GeoJSON `type` name of this geometry.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::Other { kind } => kind,
        }
    }
}

/// Serde-compatible proxy for [`Geometry`].
///
/// Coordinates are held as raw JSON so that an unexpected nesting depth
/// degrades to [`Geometry::Other`] instead of failing the whole
/// boundary response.
#[derive(Serialize, Deserialize)]
struct GeometryProxy {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinates: Option<serde_json::Value>,
}

impl Serialize for Geometry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let coordinates = match self {
            Self::Polygon(rings) => Some(serde_json::to_value(rings)),
            Self::MultiPolygon(polygons) => Some(serde_json::to_value(polygons)),
            Self::Other { .. } => None,
        }
        .transpose()
        .map_err(serde::ser::Error::custom)?;
        GeometryProxy {
            kind: self.kind().to_owned(),
            coordinates,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = GeometryProxy::deserialize(deserializer)?;
        let coordinates = match proxy.coordinates {
            None | Some(serde_json::Value::Null) => serde_json::Value::Array(Vec::new()),
            Some(value) => value,
        };
        let geometry = match proxy.kind.as_str() {
            "Polygon" => serde_json::from_value(coordinates).map(Self::Polygon).ok(),
            "MultiPolygon" => serde_json::from_value(coordinates)
                .map(Self::MultiPolygon)
                .ok(),
            _ => None,
        };
        Ok(geometry.unwrap_or(Self::Other { kind: proxy.kind }))
    }
}

/// Convert one GeoJSON position (`[lng, lat, ...]`) to a [`LatLng`].
///
/// Returns `None` for positions with fewer than two numbers.
#[must_use]
pub fn to_lat_lng(position: &[f64]) -> Option<LatLng> {
    match position {
        [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
        _ => None,
    }
}

/// Reorder one GeoJSON ring into latitude-first order.
///
/// Positions with fewer than two numbers are skipped.
#[must_use]
pub fn ring_to_lat_lng(ring: &[Position]) -> Ring {
    ring.iter().filter_map(|p| to_lat_lng(p)).collect()
}

/// Outer rings of a drawable geometry, latitude-first, not simplified.
///
/// Polygons without rings and outer rings without usable positions
/// contribute nothing.
#[must_use]
pub fn outer_rings(geometry: &Geometry) -> Vec<Ring> {
    let polygons: Vec<&Vec<Vec<Position>>> = match geometry {
        Geometry::Polygon(rings) => vec![rings],
        Geometry::MultiPolygon(polygons) => polygons.iter().collect(),
        Geometry::Other { .. } => Vec::new(),
    };

    polygons
        .into_iter()
        .filter_map(|rings| rings.first())
        .map(|outer| ring_to_lat_lng(outer))
        .filter(|ring| !ring.is_empty())
        .collect()
}

/// Normalize a boundary geometry into simplified, latitude-first rings.
///
/// This is [`outer_rings`] followed by
/// [`simplify`](crate::simplify::simplify) with `tolerance` on each
/// ring. Unsupported kinds and empty coordinates produce an empty
/// vector.
#[must_use]
pub fn normalize(geometry: &Geometry, tolerance: f64) -> Vec<Ring> {
    outer_rings(geometry)
        .iter()
        .map(|ring| simplify(ring, tolerance))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Geometry {
        serde_json::from_str(json).unwrap()
    }

    fn ring(points: &[(f64, f64)]) -> Ring {
        points.iter().map(|&(lat, lng)| LatLng::new(lat, lng)).collect()
    }

    #[test]
    fn position_axis_swap() {
        assert_eq!(to_lat_lng(&[2.35, 48.85]), Some(LatLng::new(48.85, 2.35)));
    }

    #[test]
    fn position_altitude_ignored() {
        assert_eq!(
            to_lat_lng(&[-70.0, -33.0, 520.0]),
            Some(LatLng::new(-33.0, -70.0))
        );
    }

    #[test]
    fn short_position_rejected() {
        assert_eq!(to_lat_lng(&[1.0]), None);
        assert_eq!(to_lat_lng(&[]), None);
    }

    #[test]
    fn polygon_outer_ring_in_lat_lng_order() {
        let geometry = parse(r#"{"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}"#);
        let rings = outer_rings(&geometry);
        assert_eq!(rings.len(), 1);
        assert_eq!(
            rings[0],
            ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
        );
    }

    #[test]
    fn polygon_normalizes_to_one_ring() {
        let geometry = parse(r#"{"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}"#);
        let rings = normalize(&geometry, 0.01);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn polygon_holes_ignored() {
        let geometry = parse(
            r#"{"type":"Polygon","coordinates":[
                [[0,0],[0,10],[10,10],[10,0],[0,0]],
                [[2,2],[2,3],[3,3],[3,2],[2,2]]
            ]}"#,
        );
        let rings = normalize(&geometry, 0.01);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].first(), Some(&LatLng::new(0.0, 0.0)));
        assert_eq!(rings[0].points()[1], LatLng::new(10.0, 0.0));
    }

    #[test]
    fn multipolygon_one_ring_per_member_in_order() {
        let geometry = parse(
            r#"{"type":"MultiPolygon","coordinates":[
                [[[0,0],[0,1],[1,1],[0,0]], [[0.2,0.2],[0.2,0.3],[0.3,0.3],[0.2,0.2]]],
                [[[10,20],[10,21],[11,21],[10,20]]]
            ]}"#,
        );
        let rings = normalize(&geometry, 0.01);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].first(), Some(&LatLng::new(0.0, 0.0)));
        assert_eq!(rings[1].first(), Some(&LatLng::new(20.0, 10.0)));
    }

    #[test]
    fn other_kinds_yield_nothing() {
        for json in [
            r#"{"type":"Point","coordinates":[2.35,48.85]}"#,
            r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#,
            r#"{"type":"GeometryCollection","geometries":[]}"#,
        ] {
            let geometry = parse(json);
            assert!(matches!(geometry, Geometry::Other { .. }), "{json}");
            assert!(normalize(&geometry, 0.01).is_empty(), "{json}");
        }
    }

    #[test]
    fn missing_coordinates_yield_nothing() {
        let geometry = parse(r#"{"type":"Polygon"}"#);
        assert_eq!(geometry, Geometry::Polygon(vec![]));
        assert!(normalize(&geometry, 0.01).is_empty());
    }

    #[test]
    fn empty_coordinates_yield_nothing() {
        assert!(normalize(&parse(r#"{"type":"Polygon","coordinates":[]}"#), 0.01).is_empty());
        assert!(normalize(&parse(r#"{"type":"Polygon","coordinates":[[]]}"#), 0.01).is_empty());
        assert!(normalize(&parse(r#"{"type":"MultiPolygon","coordinates":[[]]}"#), 0.01).is_empty());
    }

    #[test]
    fn wrong_nesting_degrades_to_other() {
        // MultiPolygon coordinates given with Polygon depth.
        let geometry = parse(r#"{"type":"MultiPolygon","coordinates":[[[0,0],[0,1],[1,1]]]}"#);
        assert_eq!(
            geometry,
            Geometry::Other {
                kind: "MultiPolygon".to_owned()
            }
        );
        assert!(normalize(&geometry, 0.01).is_empty());
    }

    #[test]
    fn serialize_keeps_geojson_shape() {
        let geometry = Geometry::Polygon(vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]]]);
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Polygon", "coordinates": [[[1.0, 2.0], [3.0, 4.0]]]})
        );
        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, geometry);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Geometry::Polygon(vec![]).kind(), "Polygon");
        assert_eq!(Geometry::MultiPolygon(vec![]).kind(), "MultiPolygon");
        assert_eq!(
            Geometry::Other {
                kind: "Point".to_owned()
            }
            .kind(),
            "Point"
        );
    }
}
