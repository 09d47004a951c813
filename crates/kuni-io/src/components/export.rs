//! Map export button.

use dioxus::prelude::*;
use kuni_core::CountryShape;

use crate::download;

/// File name offered for the exported map.
const MAP_FILENAME: &str = "kuni-map.svg";

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ExportPanelProps {
    /// Shapes to export. Empty disables the button.
    shapes: Vec<CountryShape>,
    /// Current score, written into the SVG description.
    score: usize,
}

/// Download the current map as SVG.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let mut export_error = use_signal(|| Option::<String>::None);
    let has_shapes = !props.shapes.is_empty();

    let on_click = move |_| {
        match download::download_map(&props.shapes, props.score, MAP_FILENAME) {
            Ok(()) => export_error.set(None),
            Err(e) => export_error.set(Some(format!("Download failed: {e}"))),
        }
    };

    rsx! {
        div { class: "export-panel",
            button {
                class: "export-button",
                disabled: !has_shapes,
                onclick: on_click,
                "Download map (SVG)"
            }
            if let Some(ref err) = export_error() {
                p { class: "error", "{err}" }
            }
        }
    }
}
