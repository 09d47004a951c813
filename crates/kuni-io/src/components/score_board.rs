//! Score display and alphabetical list of guessed countries.

use dioxus::prelude::*;
use kuni_core::GuessedCountry;

/// Props for the [`ScoreDisplay`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ScoreDisplayProps {
    score: usize,
}

/// `Score: N`.
#[component]
pub fn ScoreDisplay(props: ScoreDisplayProps) -> Element {
    rsx! {
        p { class: "score", "data-testid": "score-display", "Score: {props.score}" }
    }
}

/// Props for the [`CountryList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CountryListProps {
    /// Guessed countries, already alphabetical.
    guessed: Vec<GuessedCountry>,
}

/// One swatch-labelled entry per guessed country, scrollable.
#[component]
pub fn CountryList(props: CountryListProps) -> Element {
    rsx! {
        div { class: "country-list", "data-testid": "country-list",
            ul {
                for (i, country) in props.guessed.iter().enumerate() {
                    li {
                        key: "{country.name}",
                        class: "country-item",
                        "data-testid": "country-item-{i}",
                        span {
                            class: "swatch",
                            style: "background: {country.fill}; border-color: {country.stroke};",
                        }
                        "{country.name}"
                    }
                }
            }
        }
    }
}
