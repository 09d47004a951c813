//! Submission state machine for one quiz session.
//!
//! A submission runs `Idle → Validating → (accepted | rejected | failed)
//! → Idle`. The two collaborator calls are suspend points, so the flow
//! is split into phases the caller drives:
//!
//! ```text
//! begin()            canonicalize, dedupe     -> Begin::Lookup(MetadataLookup)
//! resolve_metadata() commit guess, score, msg -> AfterMetadata::Boundary(BoundaryLookup)
//! resolve_boundary() normalize rings, finish  -> Outcome
//! ```
//!
//! Each phase returns a move-only token naming the lookup the caller
//! must perform next, and the next phase consumes it. Between
//! [`resolve_metadata`](GameSession::resolve_metadata) and
//! [`resolve_boundary`](GameSession::resolve_boundary) the guess is
//! already committed and visible through the accessors, while the
//! session still reports [`is_busy`](GameSession::is_busy).
//!
//! [`GameSession::submit`] runs all phases against a
//! [`CountryDirectory`] and a [`BoundarySource`] for callers that do not
//! need to render in between.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::color::{ColorAllocator, ColorStore, CountryColors, Rgb};
use crate::geometry::normalize;
use crate::lookup::{BoundaryRecord, BoundarySource, CountryDirectory, CountryRecord, LookupError};
use crate::types::{CountryShape, GameConfig, MapFocus};

/// A country the player has named correctly.
///
/// Created once per country and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessedCountry {
    /// Canonical name.
    pub name: String,
    /// Fill color assigned by the color allocator.
    pub fill: Rgb,
    /// Outline color derived from `fill`.
    pub stroke: Rgb,
}

/// Where the session is in the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for input.
    Idle,
    /// Canonicalized and waiting on the metadata lookup.
    Validating,
    /// Guess committed; waiting on the boundary lookup.
    AwaitingBoundary,
}

/// A user-correctable reason a submission was turned down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The input matches no known country name or alias.
    #[error("Invalid country name: \"{input}\". Try again!")]
    InvalidName {
        /// The input as submitted, without surrounding whitespace.
        input: String,
    },

    /// The country was already guessed this session.
    #[error("You already entered this country!")]
    Duplicate,
}

/// The metadata lookup could not confirm the country.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// The service answered but found nothing.
    #[error("No response from the country service. Please try again.")]
    NoResponse,

    /// The service could not be reached or answered with an error.
    #[error("Error occurred: {0}. Please try again.")]
    Lookup(#[from] LookupError),
}

/// Terminal result of one submission.
///
/// The `Display` form is the status message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The guess was accepted and scored.
    Accepted {
        /// Canonical name of the country.
        country: String,
        /// Number of boundary rings added to the map (0 if the boundary
        /// service had nothing usable).
        rings: usize,
    },
    /// Rejected before any lookup.
    Rejected(Rejection),
    /// The metadata lookup failed; nothing changed.
    Failed(Failure),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Accepted`].
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { country, .. } => write!(f, "{}", accepted_message(country)),
            Self::Rejected(rejection) => fmt::Display::fmt(rejection, f),
            Self::Failed(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

fn accepted_message(country: &str) -> String {
    format!("Correct! {country} added.")
}

// ───────────────────────── Step tokens ───────────────────────────────

/// Result of [`GameSession::begin`].
#[derive(Debug)]
#[must_use = "a started submission keeps the session busy until it is resolved"]
pub enum Begin {
    /// Empty input, or a submission is already in flight. Nothing changed.
    Ignored,
    /// Settled without any lookup (invalid name or duplicate).
    Finished(Outcome),
    /// Canonical name found; query the metadata service next.
    Lookup(MetadataLookup),
}

/// A pending metadata lookup.
///
/// Produced by [`GameSession::begin`]; consumed by
/// [`GameSession::resolve_metadata`].
#[derive(Debug)]
#[must_use = "call .resolve_metadata() with the lookup result to continue"]
pub struct MetadataLookup {
    country: String,
}

impl MetadataLookup {
    /// Canonical name to look up.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

/// Result of [`GameSession::resolve_metadata`].
#[derive(Debug)]
#[must_use = "an accepted guess keeps the session busy until the boundary is resolved"]
pub enum AfterMetadata {
    /// The lookup failed; the submission is over.
    Finished(Outcome),
    /// The guess is committed; query the boundary service next.
    Boundary(BoundaryLookup),
}

/// A pending boundary lookup for a committed guess.
#[derive(Debug)]
#[must_use = "call .resolve_boundary() with the lookup result to finish"]
pub struct BoundaryLookup {
    country: String,
    colors: CountryColors,
}

impl BoundaryLookup {
    /// Canonical name to look up.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

// ───────────────────────── Session ───────────────────────────────────

/// All state for one quiz session.
///
/// Owns the guessed list, the polygon collection and the color
/// allocator. Only the submission flow mutates them. The score is the
/// number of guessed countries.
#[derive(Debug)]
pub struct GameSession<S, R> {
    config: GameConfig,
    aliases: Arc<AliasTable>,
    colors: ColorAllocator<S, R>,
    guessed: Vec<GuessedCountry>,
    shapes: Vec<CountryShape>,
    pending_input: String,
    status_message: String,
    phase: Phase,
    focus: Option<MapFocus>,
}

impl<S: ColorStore, R: Rng> GameSession<S, R> {
    /// Create an idle session with nothing guessed.
    pub fn new(config: GameConfig, aliases: Arc<AliasTable>, colors: ColorAllocator<S, R>) -> Self {
        Self {
            config,
            aliases,
            colors,
            guessed: Vec::new(),
            shapes: Vec::new(),
            pending_input: String::new(),
            status_message: String::new(),
            phase: Phase::Idle,
            focus: None,
        }
    }

    /// Replace the text in the input field.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    /// Start submitting the current input.
    ///
    /// Does nothing while a submission is in flight or when the trimmed
    /// input is empty. Otherwise clears the status message, marks the
    /// session busy and canonicalizes. Invalid names and duplicates
    /// settle immediately without any lookup.
    pub fn begin(&mut self) -> Begin {
        let input = self.pending_input.trim().to_owned();
        if input.is_empty() || self.is_busy() {
            return Begin::Ignored;
        }

        self.phase = Phase::Validating;
        self.status_message.clear();

        let Some(country) = self.aliases.canonicalize(&input).map(str::to_owned) else {
            tracing::debug!(%input, "no alias match");
            return Begin::Finished(self.finish(Outcome::Rejected(Rejection::InvalidName { input })));
        };

        if self.is_guessed(&country) {
            tracing::debug!(%country, "duplicate guess");
            return Begin::Finished(self.finish(Outcome::Rejected(Rejection::Duplicate)));
        }

        tracing::debug!(%country, "awaiting metadata");
        Begin::Lookup(MetadataLookup { country })
    }

    /// Apply the metadata lookup result.
    ///
    /// An error or an empty record list ends the submission without
    /// touching the score. Otherwise the guess is committed: the country
    /// joins the guessed list (kept alphabetical), receives its colors,
    /// the status message announces it, and the map focus moves to the
    /// first record's center if it has one.
    pub fn resolve_metadata(
        &mut self,
        lookup: MetadataLookup,
        result: Result<Vec<CountryRecord>, LookupError>,
    ) -> AfterMetadata {
        let MetadataLookup { country } = lookup;

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(%country, error = %e, "metadata lookup failed");
                return AfterMetadata::Finished(self.finish(Outcome::Failed(e.into())));
            }
        };
        let Some(record) = records.first() else {
            tracing::warn!(%country, "metadata lookup returned no records");
            return AfterMetadata::Finished(self.finish(Outcome::Failed(Failure::NoResponse)));
        };

        if let Some(center) = record.center {
            self.focus = Some(MapFocus {
                center,
                zoom: self.config.focus_zoom,
            });
        }

        let colors = self.colors.color_for(&country);
        let entry = GuessedCountry {
            name: country.clone(),
            fill: colors.fill,
            stroke: colors.stroke,
        };
        let at = self
            .guessed
            .binary_search_by(|g| g.name.as_str().cmp(&country))
            .unwrap_or_else(|at| at);
        self.guessed.insert(at, entry);

        self.status_message = accepted_message(&country);
        self.phase = Phase::AwaitingBoundary;
        tracing::info!(%country, score = self.score(), "guess accepted");

        AfterMetadata::Boundary(BoundaryLookup { country, colors })
    }

    /// Apply the boundary lookup result and finish the submission.
    ///
    /// Usable geometry from the first record is normalized and added to
    /// the polygon collection. Errors, missing geometry and geometry that
    /// yields no rings are logged and otherwise ignored: the guess stays
    /// committed.
    pub fn resolve_boundary(
        &mut self,
        lookup: BoundaryLookup,
        result: Result<Vec<BoundaryRecord>, LookupError>,
    ) -> Outcome {
        let BoundaryLookup { country, colors } = lookup;

        let geometry = match result {
            Ok(records) => records.into_iter().next().and_then(|r| r.geometry),
            Err(e) => {
                tracing::warn!(%country, error = %e, "boundary lookup failed");
                None
            }
        };

        let rings = geometry
            .map(|g| normalize(&g, self.config.simplify_tolerance))
            .unwrap_or_default();
        let ring_count = rings.len();

        if rings.is_empty() {
            tracing::warn!(%country, "no boundary to draw");
        } else {
            tracing::debug!(%country, rings = ring_count, "boundary added");
            self.shapes.push(CountryShape {
                country: country.clone(),
                fill: colors.fill,
                stroke: colors.stroke,
                rings,
            });
        }

        self.finish(Outcome::Accepted {
            country,
            rings: ring_count,
        })
    }

    /// Run a whole submission of `input` against the given collaborators.
    ///
    /// `on_commit` is called once the guess is committed and before the
    /// boundary lookup starts, so a caller can publish the updated score.
    /// Returns `None` if the submission was ignored.
    pub async fn submit<D, B>(
        &mut self,
        input: &str,
        directory: &D,
        boundaries: &B,
        mut on_commit: impl FnMut(&Self),
    ) -> Option<Outcome>
    where
        D: CountryDirectory + ?Sized,
        B: BoundarySource + ?Sized,
    {
        self.set_input(input);
        let lookup = match self.begin() {
            Begin::Ignored => return None,
            Begin::Finished(outcome) => return Some(outcome),
            Begin::Lookup(lookup) => lookup,
        };

        let result = directory.lookup(lookup.country()).await;
        let lookup = match self.resolve_metadata(lookup, result) {
            AfterMetadata::Finished(outcome) => return Some(outcome),
            AfterMetadata::Boundary(lookup) => lookup,
        };
        on_commit(self);

        let result = boundaries.boundary(lookup.country()).await;
        Some(self.resolve_boundary(lookup, result))
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.status_message = outcome.to_string();
        self.pending_input.clear();
        self.phase = Phase::Idle;
        tracing::debug!(status = %self.status_message, "submission finished");
        outcome
    }

    fn is_guessed(&self, country: &str) -> bool {
        self.guessed
            .binary_search_by(|g| g.name.as_str().cmp(country))
            .is_ok()
    }

    /// Number of countries guessed so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.guessed.len()
    }

    /// Guessed countries in alphabetical order.
    #[must_use]
    pub fn guessed(&self) -> &[GuessedCountry] {
        &self.guessed
    }

    /// Shapes to draw, in the order their boundaries arrived.
    #[must_use]
    pub fn shapes(&self) -> &[CountryShape] {
        &self.shapes
    }

    /// Current contents of the input field.
    #[must_use]
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Single-line feedback for the player; empty before the first
    /// submission and while validating.
    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` while a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Where the map should look, if any guess carried a center.
    #[must_use]
    pub const fn focus(&self) -> Option<MapFocus> {
        self.focus
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The color allocator, for inspecting its backing store.
    #[must_use]
    pub const fn colors(&self) -> &ColorAllocator<S, R> {
        &self.colors
    }

    /// Serializable summary of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            score: self.score(),
            guessed: self.guessed.clone(),
            polygons: self
                .shapes
                .iter()
                .map(|s| PolygonSummary {
                    country: s.country.clone(),
                    rings: s.rings.len(),
                    points: s.point_count(),
                })
                .collect(),
            status_message: self.status_message.clone(),
            busy: self.is_busy(),
            focus: self.focus,
        }
    }
}

/// Point-in-time summary of a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Number of guessed countries.
    pub score: usize,
    /// Guessed countries, alphabetical.
    pub guessed: Vec<GuessedCountry>,
    /// One entry per drawn country.
    pub polygons: Vec<PolygonSummary>,
    /// Current status message.
    pub status_message: String,
    /// Whether a submission is in flight.
    pub busy: bool,
    /// Current map focus.
    pub focus: Option<MapFocus>,
}

/// Size of one drawn country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonSummary {
    /// Canonical name.
    pub country: String,
    /// Number of rings.
    pub rings: usize,
    /// Total points after simplification.
    pub points: usize,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::color::MemoryColorStore;

    fn session() -> GameSession<MemoryColorStore, StdRng> {
        GameSession::new(
            GameConfig::default(),
            AliasTable::builtin(),
            ColorAllocator::new(MemoryColorStore::new(), StdRng::seed_from_u64(7)),
        )
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut s = session();
        s.set_input("   ");
        assert!(matches!(s.begin(), Begin::Ignored));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.pending_input(), "   ");
    }

    #[test]
    fn begin_while_busy_is_ignored() {
        let mut s = session();
        s.set_input("peru");
        let Begin::Lookup(lookup) = s.begin() else {
            unreachable!("peru is a known country");
        };
        assert_eq!(lookup.country(), "Peru");
        assert!(s.is_busy());

        s.set_input("chile");
        assert!(matches!(s.begin(), Begin::Ignored));
        assert_eq!(s.phase(), Phase::Validating);
    }

    #[test]
    fn failed_metadata_lookup_finishes_the_submission() {
        let mut s = session();
        s.set_input("peru");
        let Begin::Lookup(lookup) = s.begin() else {
            unreachable!("peru is a known country");
        };
        let after = s.resolve_metadata(lookup, Err(LookupError::Transport("offline".into())));
        let AfterMetadata::Finished(outcome) = after else {
            unreachable!("a failed lookup never reaches the boundary phase");
        };
        assert_eq!(
            outcome.to_string(),
            "Error occurred: request failed: offline. Please try again."
        );
        assert!(!s.is_busy());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn begin_clears_previous_message() {
        let mut s = session();
        s.set_input("atlantis");
        let _ = s.begin();
        assert!(!s.status_message().is_empty());

        s.set_input("peru");
        let _ = s.begin();
        assert_eq!(s.status_message(), "");
    }

    #[test]
    fn invalid_name_echoes_trimmed_input() {
        let mut s = session();
        s.set_input("  Atlantis ");
        let Begin::Finished(outcome) = s.begin() else {
            unreachable!("atlantis is not a country");
        };
        assert_eq!(outcome.to_string(), "Invalid country name: \"Atlantis\". Try again!");
        assert_eq!(s.status_message(), outcome.to_string());
        assert_eq!(s.pending_input(), "");
        assert!(!s.is_busy());
    }

    #[test]
    fn commit_happens_before_boundary() {
        let mut s = session();
        s.set_input("Japan");
        let Begin::Lookup(lookup) = s.begin() else {
            unreachable!("japan is a known country");
        };
        let records = vec![CountryRecord {
            name: "Japan".into(),
            center: None,
        }];
        let AfterMetadata::Boundary(lookup) = s.resolve_metadata(lookup, Ok(records)) else {
            unreachable!("one record commits the guess");
        };

        assert_eq!(s.score(), 1);
        assert_eq!(s.status_message(), "Correct! Japan added.");
        assert_eq!(s.phase(), Phase::AwaitingBoundary);
        assert!(s.focus().is_none());

        let outcome = s.resolve_boundary(lookup, Ok(vec![]));
        assert_eq!(
            outcome,
            Outcome::Accepted {
                country: "Japan".into(),
                rings: 0
            }
        );
        assert!(s.shapes().is_empty());
        assert_eq!(s.score(), 1);
        assert!(!s.is_busy());
    }

    #[test]
    fn failure_messages() {
        assert_eq!(
            Outcome::Failed(Failure::NoResponse).to_string(),
            "No response from the country service. Please try again."
        );
        assert_eq!(
            Outcome::Failed(Failure::Lookup(LookupError::Status { status: 500 })).to_string(),
            "Error occurred: service responded with status 500. Please try again."
        );
        assert_eq!(
            Outcome::Rejected(Rejection::Duplicate).to_string(),
            "You already entered this country!"
        );
    }
}
