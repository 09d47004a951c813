//! kuni-io: Browser I/O and Dioxus component library.
//!
//! Handles the `localStorage` color memo, SVG map downloads, and
//! provides the UI components of the kuni web app.

pub mod components;
pub mod download;
pub mod storage;

pub use components::{CountryList, ExportPanel, GuessForm, MapView, ScoreDisplay};
pub use storage::{LocalStorageColorStore, StorageError};
