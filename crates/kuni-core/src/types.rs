//! Shared types for the kuni quiz core.

use geo::{BoundingRect, Coord, LineString, MultiLineString, Rect};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A geographic position in map (consumer) axis order.
///
/// Source GeoJSON stores positions as `[longitude, latitude]`; everything
/// downstream of [`crate::geometry`] works with this latitude-first type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Degrees north of the equator.
    pub lat: f64,
    /// Degrees east of the prime meridian.
    pub lng: f64,
}

impl LatLng {
    /// Create a new position.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Squared planar distance to another position, in square degrees.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        dlat.mul_add(dlat, dlng * dlng)
    }

    /// Planar distance to another position, in degrees.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Self {
        Self { x: p.lng, y: p.lat }
    }
}

/// An ordered boundary loop of positions.
///
/// The first point is not required to equal the last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring(Vec<LatLng>);

impl Ring {
    /// Create a ring from a vector of positions.
    #[must_use]
    pub const fn new(points: Vec<LatLng>) -> Self {
        Self(points)
    }

    /// Returns `true` if the ring has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the ring.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&LatLng> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&LatLng> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[LatLng] {
        &self.0
    }

    /// Consumes the ring and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<LatLng> {
        self.0
    }

    /// The ring as a `geo` line string (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn to_line_string(&self) -> LineString<f64> {
        self.0.iter().copied().map(Coord::from).collect()
    }
}

impl FromIterator<LatLng> for Ring {
    fn from_iter<I: IntoIterator<Item = LatLng>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The rendered outline of one guessed country plus its style.
///
/// This is what the map renderer consumes: a list of rings and the
/// fill/stroke pair resolved by the color allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryShape {
    /// Canonical name of the country these rings belong to.
    pub country: String,
    /// Fill color.
    pub fill: Rgb,
    /// Outline color, derived from `fill`.
    pub stroke: Rgb,
    /// Simplified outer rings, latitude-first.
    pub rings: Vec<Ring>,
}

impl CountryShape {
    /// Total number of points across all rings.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }

    /// Axis-aligned bounds of every ring (`x` = longitude, `y` = latitude).
    ///
    /// Returns `None` when the shape has no points.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        MultiLineString::new(self.rings.iter().map(Ring::to_line_string).collect()).bounding_rect()
    }
}

/// Bounds enclosing every shape in `shapes`, or `None` if none has points.
#[must_use]
pub fn combined_bounds(shapes: &[CountryShape]) -> Option<Rect<f64>> {
    shapes
        .iter()
        .filter_map(CountryShape::bounding_rect)
        .reduce(|a, b| {
            Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                },
            )
        })
}

/// Where the map should look after a successful guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFocus {
    /// Center reported by the country metadata service.
    pub center: LatLng,
    /// Zoom level in web-map tile terms (2 = whole world, 5 = one country).
    pub zoom: u8,
}

/// Configuration for a quiz session.
///
/// Fixed for the lifetime of a session; the player cannot change it
/// mid-game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ramer-Douglas-Peucker tolerance for boundary rings, in degrees.
    /// Higher values remove more points, producing coarser outlines.
    pub simplify_tolerance: f64,

    /// Zoom level recorded in [`MapFocus`] after a successful guess.
    pub focus_zoom: u8,
}

impl GameConfig {
    /// Default simplification tolerance (about 1 km at the equator).
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.01;

    /// Default zoom level for the post-guess map focus.
    pub const DEFAULT_FOCUS_ZOOM: u8 = 5;

    /// Zoom level showing the whole world.
    pub const WORLD_ZOOM: u8 = 2;
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: Self::DEFAULT_SIMPLIFY_TOLERANCE,
            focus_zoom: Self::DEFAULT_FOCUS_ZOOM,
        }
    }
}
