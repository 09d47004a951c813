//! Map download via Blob URLs.
//!
//! Dioxus has no built-in file download API, so the exported map is
//! wrapped in a `Blob`, given an object URL, and fetched by clicking a
//! temporary `<a download>` element.
//!
//! Everything except [`map_svg`] requires a browser environment.

use kuni_core::CountryShape;
use kuni_export::SvgMetadata;
use wasm_bindgen::{JsCast, JsValue};

/// MIME type of the exported map.
pub const SVG_MIME: &str = "image/svg+xml";

/// Errors that can occur when triggering a download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    Js(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

/// Render the guessed countries as a standalone SVG document.
#[must_use]
pub fn map_svg(shapes: &[CountryShape], score: usize) -> String {
    let description = format!("Score: {score}");
    let metadata = SvgMetadata {
        title: Some("kuni"),
        description: Some(&description),
        ..SvgMetadata::default()
    };
    kuni_export::to_svg(shapes, &metadata, None)
}

/// Offer `shapes` to the user as `filename`.
///
/// # Errors
///
/// Returns [`DownloadError::Js`] if any browser API call fails.
pub fn download_map(shapes: &[CountryShape], score: usize, filename: &str) -> Result<(), DownloadError> {
    trigger_download(&map_svg(shapes, score), filename, SVG_MIME)
}

/// Offer `data` to the user as a file named `filename`.
///
/// The object URL is revoked once the click has been dispatched.
///
/// # Errors
///
/// Returns [`DownloadError::Js`] if any browser API call fails.
pub fn trigger_download(data: &str, filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| DownloadError::Js("no document".into()))?;
    let body = document
        .body()
        .ok_or_else(|| DownloadError::Js("no document body".into()))?;

    let url = object_url(data, mime_type)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::Js(format!("not an anchor: {e:?}")))?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    body.append_child(&anchor)?;
    anchor.click();

    // The download has started; cleanup failures are not reported.
    let _ = body.remove_child(&anchor);
    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

fn object_url(data: &str, mime_type: &str) -> Result<String, DownloadError> {
    let parts = js_sys::Array::of1(&JsValue::from_str(data));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

#[cfg(test)]
mod tests {
    use kuni_core::{LatLng, Rgb, Ring};

    use super::*;

    #[test]
    fn map_svg_describes_score() {
        let fill = Rgb::new(0x33, 0xA1, 0xFF);
        let shapes = vec![CountryShape {
            country: "Peru".into(),
            fill,
            stroke: fill.stroke(),
            rings: vec![Ring::new(vec![
                LatLng::new(-5.0, -80.0),
                LatLng::new(-18.0, -70.0),
                LatLng::new(-10.0, -75.0),
            ])],
        }];
        let svg = map_svg(&shapes, 1);
        assert!(svg.contains("<title>kuni</title>"));
        assert!(svg.contains("<desc>Score: 1</desc>"));
        assert!(svg.contains(r#"id="polygon-Peru""#));
    }
}
