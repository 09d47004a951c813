//! Dioxus UI components for kuni.
//!
//! Provides the guess form, score display, country list, map view and
//! export panel.

mod export;
mod guess_form;
mod map_view;
mod score_board;

pub use export::ExportPanel;
pub use guess_form::GuessForm;
pub use map_view::{MapView, MapViewError, compute_view_box};
pub use score_board::{CountryList, ScoreDisplay};
