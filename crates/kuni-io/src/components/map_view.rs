//! Inline SVG world map with one filled region per guessed country.

use dioxus::prelude::*;
use kuni_core::{CountryShape, MapFocus};
use kuni_export::svg::{FILL_OPACITY, STROKE_WIDTH, WORLD_HEIGHT, WORLD_WIDTH};
use kuni_export::{ViewBox, build_ring_data};

/// The computed view cannot be drawn.
#[derive(Debug, thiserror::Error)]
#[error("map view box is not finite: {0}")]
pub struct MapViewError(String);

/// Props for the [`MapView`] component.
#[derive(Props, Clone, PartialEq)]
pub struct MapViewProps {
    /// Shapes to draw, in arrival order.
    shapes: Vec<CountryShape>,
    /// Where the last accepted guess asked the map to look.
    focus: Option<MapFocus>,
}

/// Pick the visible area: the focus if following guesses, otherwise the
/// whole world.
///
/// # Errors
///
/// Returns [`MapViewError`] if the view box has a non-finite or
/// non-positive component.
pub fn compute_view_box(focus: Option<MapFocus>, follow: bool) -> Result<ViewBox, MapViewError> {
    let view = match focus {
        Some(focus) if follow => ViewBox::around(focus),
        _ => ViewBox::world(),
    };
    let finite = [view.x, view.y, view.width, view.height]
        .iter()
        .all(|v| v.is_finite());
    if finite && view.width > 0.0 && view.height > 0.0 {
        Ok(view)
    } else {
        Err(MapViewError(view.to_attribute()))
    }
}

/// Renders guessed countries on an equirectangular world map.
///
/// Follows the latest focus by default; a toggle switches to the whole
/// world.
#[component]
pub fn MapView(props: MapViewProps) -> Element {
    let mut follow = use_signal(|| true);
    let view_box = compute_view_box(props.focus, follow())?.to_attribute();
    let toggle_label = if follow() { "Whole world" } else { "Follow guesses" };

    rsx! {
        div { class: "map-view", "data-testid": "map",
            svg {
                xmlns: "http://www.w3.org/2000/svg",
                view_box: "{view_box}",
                class: "map-canvas",
                "preserveAspectRatio": "xMidYMid meet",

                rect {
                    x: "0",
                    y: "0",
                    width: "{WORLD_WIDTH}",
                    height: "{WORLD_HEIGHT}",
                    class: "ocean",
                }

                for shape in props.shapes.iter() {
                    g {
                        key: "{shape.country}",
                        "data-testid": "polygon-{shape.country}",
                        fill: "{shape.fill}",
                        fill_opacity: "{FILL_OPACITY}",
                        stroke: "{shape.stroke}",
                        stroke_width: "{STROKE_WIDTH}",
                        for d in shape.rings.iter().map(build_ring_data).filter(|d| !d.is_empty()) {
                            path { d: "{d}" }
                        }
                    }
                }
            }

            if props.focus.is_some() {
                button {
                    class: "map-toggle",
                    onclick: move |_| follow.toggle(),
                    "{toggle_label}"
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kuni_core::LatLng;

    use super::*;

    fn focus(zoom: u8) -> MapFocus {
        MapFocus {
            center: LatLng::new(46.0, 2.0),
            zoom,
        }
    }

    #[test]
    fn no_focus_shows_world() {
        assert_eq!(compute_view_box(None, true).unwrap(), ViewBox::world());
    }

    #[test]
    fn follow_uses_focus() {
        let view = compute_view_box(Some(focus(5)), true).unwrap();
        assert_eq!(view, ViewBox::around(focus(5)));
    }

    #[test]
    fn not_following_shows_world() {
        assert_eq!(compute_view_box(Some(focus(5)), false).unwrap(), ViewBox::world());
    }

    #[test]
    fn non_finite_focus_is_an_error() {
        let bad = MapFocus {
            center: LatLng::new(f64::NAN, 0.0),
            zoom: 5,
        };
        assert!(compute_view_box(Some(bad), true).is_err());
    }
}
