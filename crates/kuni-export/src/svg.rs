//! SVG export serializer.
//!
//! Converts guessed-country shapes into an SVG string using the [`svg`]
//! crate for document construction, XML escaping, and path data
//! formatting.
//!
//! Positions are drawn in an equirectangular projection: longitude maps
//! linearly to x and latitude to y (north up), at
//! [`PIXELS_PER_DEGREE`] user units per degree. The whole world spans
//! `0 0 720 360`.
//!
//! Each country becomes a `<g>` carrying its fill and stroke, with one
//! closed `<path>` per ring.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use geo::Rect;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use kuni_core::{CountryShape, GameConfig, LatLng, MapFocus, Ring, combined_bounds};

/// User units per degree of longitude or latitude.
pub const PIXELS_PER_DEGREE: f64 = 2.0;

/// Width of the full world in user units.
pub const WORLD_WIDTH: f64 = 360.0 * PIXELS_PER_DEGREE;

/// Height of the full world in user units.
pub const WORLD_HEIGHT: f64 = 180.0 * PIXELS_PER_DEGREE;

/// Opacity applied to every country fill.
pub const FILL_OPACITY: f64 = 0.35;

/// Outline width in user units.
pub const STROKE_WIDTH: f64 = 1.0;

/// Rendered document width in pixels; height follows the view's aspect.
const DOCUMENT_WIDTH_PX: f64 = 720.0;

/// Padding around fitted bounds, as a fraction of the larger side.
const FIT_MARGIN: f64 = 0.1;

/// Ocean background color.
const OCEAN: &str = "#E8F1F8";

/// Metadata to embed in the SVG document.
///
/// Every field is optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the score and the date of the session.
    pub description: Option<&'a str>,

    /// Session snapshot JSON, emitted inside a `<metadata>` element
    /// wrapped in a namespaced `<kuni:session>` element.
    pub session_json: Option<&'a str>,
}

/// Project a position into world user units.
#[must_use]
pub fn project(p: LatLng) -> (f64, f64) {
    (
        (p.lng + 180.0) * PIXELS_PER_DEGREE,
        (90.0 - p.lat) * PIXELS_PER_DEGREE,
    )
}

/// The visible rectangle of the map, in projected user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewBox {
    /// The whole world.
    #[must_use]
    pub const fn world() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }

    /// A view centered on `focus`.
    ///
    /// Each zoom level above [`GameConfig::WORLD_ZOOM`] halves the span.
    /// Levels at or below it show the whole world.
    #[must_use]
    pub fn around(focus: MapFocus) -> Self {
        let levels = focus.zoom.saturating_sub(GameConfig::WORLD_ZOOM);
        if levels == 0 {
            return Self::world();
        }
        let scale = f64::from(1_u32 << levels.min(20));
        let width = WORLD_WIDTH / scale;
        let height = WORLD_HEIGHT / scale;
        let (cx, cy) = project(focus.center);
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// A view enclosing `bounds` (`x` = longitude, `y` = latitude) with a
    /// margin, keeping the world's 2:1 aspect.
    #[must_use]
    pub fn fit(bounds: Rect<f64>) -> Self {
        let (left, top) = project(LatLng::new(bounds.max().y, bounds.min().x));
        let (right, bottom) = project(LatLng::new(bounds.min().y, bounds.max().x));
        let (w, h) = (right - left, bottom - top);

        let span = w.max(h * 2.0).max(PIXELS_PER_DEGREE) * (1.0 + 2.0 * FIT_MARGIN);
        let (width, height) = (span, span / 2.0);
        Self {
            x: left + w / 2.0 - width / 2.0,
            y: top + h / 2.0 - height / 2.0,
            width,
            height,
        }
    }

    /// Fit every shape, or the world when nothing has been drawn.
    #[must_use]
    pub fn for_shapes(shapes: &[CountryShape]) -> Self {
        combined_bounds(shapes).map_or_else(Self::world, Self::fit)
    }

    /// The `viewBox` attribute value.
    #[must_use]
    pub fn to_attribute(self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Build an SVG path `d` attribute string for one ring.
///
/// The path starts with `M`, continues with `L`, and is closed. Returns
/// an empty string for rings with fewer than 2 points.
///
/// Coordinates are formatted by the [`svg`] crate using `f32` precision.
///
/// # Examples
///
/// ```
/// use kuni_core::{LatLng, Ring};
/// use kuni_export::build_ring_data;
///
/// let ring = Ring::new(vec![LatLng::new(0.0, 0.0), LatLng::new(10.0, 20.0)]);
/// let d = build_ring_data(&ring);
/// assert!(d.starts_with("M360,180 L400,160"));
/// ```
#[must_use]
pub fn build_ring_data(ring: &Ring) -> String {
    let points = ring.points();
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(project(*first));
    for &p in rest {
        data = data.line_to(project(p));
    }
    String::from(Value::from(data.close()))
}

/// Serialize country shapes into an SVG document string.
///
/// Each [`CountryShape`] becomes a `<g>` with `fill`, `fill-opacity`,
/// `stroke` and `stroke-width` set, holding one `<path>` per ring with
/// 2 or more points. Shapes with no drawable ring are skipped.
///
/// `view` selects the visible area; `None` fits all shapes (or the
/// whole world when there are none).
///
/// # Examples
///
/// ```
/// use kuni_core::{CountryShape, LatLng, Rgb, Ring};
/// use kuni_export::{SvgMetadata, ViewBox, to_svg};
///
/// let fill = Rgb::new(0x33, 0x57, 0xFF);
/// let shapes = vec![CountryShape {
///     country: "Testland".into(),
///     fill,
///     stroke: fill.stroke(),
///     rings: vec![Ring::new(vec![
///         LatLng::new(0.0, 0.0),
///         LatLng::new(1.0, 0.0),
///         LatLng::new(1.0, 1.0),
///     ])],
/// }];
/// let metadata = SvgMetadata {
///     title: Some("kuni"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&shapes, &metadata, Some(ViewBox::world()));
/// assert!(svg.contains("<title>kuni</title>"));
/// assert!(svg.contains(r##"fill="#3357FF""##));
/// ```
#[must_use]
pub fn to_svg(shapes: &[CountryShape], metadata: &SvgMetadata<'_>, view: Option<ViewBox>) -> String {
    let view = view.unwrap_or_else(|| ViewBox::for_shapes(shapes));
    let height_px = DOCUMENT_WIDTH_PX * view.height / view.width;

    let mut doc = Document::new()
        .set("width", DOCUMENT_WIDTH_PX)
        .set("height", height_px)
        .set("viewBox", view.to_attribute())
        .set("preserveAspectRatio", "xMidYMid meet");

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(session_json) = metadata.session_json {
        let mut session_el = Element::new("kuni:session");
        session_el.assign("xmlns:kuni", "https://kuni.quiz/ns/1");
        session_el.append(Text::new(session_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(session_el);
        doc = doc.add(metadata_el);
    }

    doc = doc.add(
        Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", WORLD_WIDTH)
            .set("height", WORLD_HEIGHT)
            .set("fill", OCEAN),
    );

    for shape in shapes {
        if let Some(group) = country_group(shape) {
            doc = doc.add(group);
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// One `<g>` per country, or `None` when no ring is drawable.
fn country_group(shape: &CountryShape) -> Option<Group> {
    let paths: Vec<Path> = shape
        .rings
        .iter()
        .map(build_ring_data)
        .filter(|d| !d.is_empty())
        .map(|d| Path::new().set("d", d))
        .collect();
    if paths.is_empty() {
        return None;
    }

    let mut group = Group::new()
        .set("id", format!("polygon-{}", shape.country))
        .set("data-country", shape.country.as_str())
        .set("fill", shape.fill.to_hex())
        .set("fill-opacity", FILL_OPACITY)
        .set("stroke", shape.stroke.to_hex())
        .set("stroke-width", STROKE_WIDTH);
    for path in paths {
        group = group.add(path);
    }
    Some(group)
}
