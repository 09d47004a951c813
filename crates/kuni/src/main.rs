use std::rc::Rc;

use dioxus::prelude::*;
use kuni_core::{
    AfterMetadata, AliasTable, Begin, BoundarySource, ColorAllocator, CountryDirectory,
    GameConfig, GameSession, LookupError,
};
use kuni_io::{CountryList, ExportPanel, GuessForm, LocalStorageColorStore, MapView, ScoreDisplay};
use kuni_services::{
    ConfigError, HttpBoundarySource, HttpCountryDirectory, ServiceConfig, build_client,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Session = GameSession<LocalStorageColorStore, StdRng>;

/// The two remote collaborators, sharing one HTTP client.
struct Services {
    directory: HttpCountryDirectory,
    boundaries: HttpBoundarySource,
}

impl Services {
    fn connect(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let client = build_client(config)?;
        Ok(Self {
            directory: HttpCountryDirectory::with_client(client.clone(), config)?,
            boundaries: HttpBoundarySource::with_client(client, config)?,
        })
    }
}

fn new_session() -> Session {
    let colors = ColorAllocator::new(LocalStorageColorStore, StdRng::from_entropy());
    GameSession::new(GameConfig::default(), AliasTable::builtin(), colors)
}

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the game session in a signal and drives each submission through
/// its lookup phases on a spawned task, writing back to the signal after
/// every phase so the score and the country list update before the
/// boundary arrives.
fn app() -> Element {
    let mut session = use_signal(new_session);
    let services = use_hook(|| {
        Services::connect(&ServiceConfig::default())
            .map(Rc::new)
            .map_err(|e| e.to_string())
    });

    // --- Input handler ---
    let on_input = move |value: String| session.write().set_input(value);

    // --- Submission handler ---
    let on_submit = move |()| {
        let lookup = match session.write().begin() {
            Begin::Ignored | Begin::Finished(_) => return,
            Begin::Lookup(lookup) => lookup,
        };
        let services = services.clone();

        spawn(async move {
            let services = match services {
                Ok(services) => services,
                Err(e) => {
                    let failed = session
                        .write()
                        .resolve_metadata(lookup, Err(LookupError::Transport(e)));
                    if let AfterMetadata::Finished(outcome) = failed {
                        tracing::warn!(%outcome, "services unavailable");
                    }
                    return;
                }
            };

            let result = services.directory.lookup(lookup.country()).await;
            let AfterMetadata::Boundary(lookup) = session.write().resolve_metadata(lookup, result)
            else {
                return;
            };

            let result = services.boundaries.boundary(lookup.country()).await;
            let outcome = session.write().resolve_boundary(lookup, result);
            tracing::debug!(%outcome, "submission settled");
        });
    };

    let (score, guessed, shapes, focus, input, busy, message) = {
        let s = session.read();
        (
            s.score(),
            s.guessed().to_vec(),
            s.shapes().to_vec(),
            s.focus(),
            s.pending_input().to_owned(),
            s.is_busy(),
            s.status_message().to_owned(),
        )
    };

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/style.css") }

        div { class: "app",
            header { class: "app-header",
                h1 { "Country Game" }
                ScoreDisplay { score }
            }

            div { class: "app-body",
                // Quiz panel
                div { class: "quiz-panel",
                    GuessForm {
                        input,
                        busy,
                        message,
                        on_input,
                        on_submit,
                    }
                    CountryList { guessed }
                    ExportPanel { shapes: shapes.clone(), score }
                }

                // Map
                div { class: "map-panel",
                    ErrorBoundary {
                        handle_error: |_: ErrorContext| rsx! {
                            div { class: "error", "data-testid": "map-error", "Error loading map" }
                        },
                        MapView { shapes, focus }
                    }
                }
            }
        }
    }
}
