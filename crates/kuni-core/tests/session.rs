//! Integration tests: drive whole submissions against in-memory
//! collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::HashMap;

use kuni_core::{
    AliasTable, BoundaryRecord, BoundarySource, ColorAllocator, CountryDirectory, CountryRecord,
    Failure, GameConfig, GameSession, Geometry, LatLng, LookupError, MemoryColorStore, Outcome,
    Rejection,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Session = GameSession<MemoryColorStore, StdRng>;

fn session_with(store: MemoryColorStore, seed: u64) -> Session {
    GameSession::new(
        GameConfig::default(),
        AliasTable::builtin(),
        ColorAllocator::new(store, StdRng::seed_from_u64(seed)),
    )
}

fn session() -> Session {
    session_with(MemoryColorStore::new(), 42)
}

/// Knows every country it is asked about unless told otherwise.
#[derive(Default)]
struct FakeDirectory {
    overrides: HashMap<String, Result<Vec<CountryRecord>, LookupError>>,
    calls: RefCell<Vec<String>>,
}

impl FakeDirectory {
    fn with(mut self, name: &str, result: Result<Vec<CountryRecord>, LookupError>) -> Self {
        self.overrides.insert(name.to_owned(), result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CountryDirectory for FakeDirectory {
    async fn lookup(&self, name: &str) -> Result<Vec<CountryRecord>, LookupError> {
        self.calls.borrow_mut().push(name.to_owned());
        self.overrides.get(name).cloned().unwrap_or_else(|| {
            Ok(vec![CountryRecord {
                name: name.to_owned(),
                center: Some(LatLng::new(46.0, 2.0)),
            }])
        })
    }
}

/// Returns a unit square for every country unless told otherwise.
#[derive(Default)]
struct FakeBoundaries {
    overrides: HashMap<String, Result<Vec<BoundaryRecord>, LookupError>>,
    calls: RefCell<Vec<String>>,
}

impl FakeBoundaries {
    fn with(mut self, name: &str, result: Result<Vec<BoundaryRecord>, LookupError>) -> Self {
        self.overrides.insert(name.to_owned(), result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl BoundarySource for FakeBoundaries {
    async fn boundary(&self, name: &str) -> Result<Vec<BoundaryRecord>, LookupError> {
        self.calls.borrow_mut().push(name.to_owned());
        self.overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(vec![record(unit_square())]))
    }
}

fn unit_square() -> Geometry {
    Geometry::Polygon(vec![vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 1.0],
        vec![1.0, 0.0],
        vec![0.0, 0.0],
    ]])
}

fn record(geometry: Geometry) -> BoundaryRecord {
    BoundaryRecord {
        label: None,
        geometry: Some(geometry),
    }
}

fn names(session: &Session) -> Vec<&str> {
    session.guessed().iter().map(|g| g.name.as_str()).collect()
}

#[tokio::test]
async fn france_is_accepted_and_drawn() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    let outcome = s.submit("france", &directory, &boundaries, |_| {}).await;

    assert_eq!(
        outcome,
        Some(Outcome::Accepted {
            country: "France".into(),
            rings: 1
        })
    );
    assert_eq!(s.status_message(), "Correct! France added.");
    assert_eq!(s.score(), 1);
    assert_eq!(names(&s), ["France"]);
    assert_eq!(s.shapes().len(), 1);
    assert_eq!(s.shapes()[0].country, "France");
    assert_eq!(s.shapes()[0].fill, s.guessed()[0].fill);
    assert_eq!(s.pending_input(), "");
    assert!(!s.is_busy());

    let focus = s.focus().unwrap();
    assert_eq!(focus.center, LatLng::new(46.0, 2.0));
    assert_eq!(focus.zoom, GameConfig::DEFAULT_FOCUS_ZOOM);

    assert_eq!(directory.calls(), ["France"]);
    assert_eq!(boundaries.calls(), ["France"]);
}

#[tokio::test]
async fn second_submission_is_a_duplicate() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    s.submit("France", &directory, &boundaries, |_| {}).await;
    let outcome = s.submit("  FRANCE ", &directory, &boundaries, |_| {}).await;

    assert_eq!(outcome, Some(Outcome::Rejected(Rejection::Duplicate)));
    assert_eq!(s.status_message(), "You already entered this country!");
    assert_eq!(s.score(), 1);
    assert_eq!(s.shapes().len(), 1);
    assert_eq!(directory.calls().len(), 1);
}

#[tokio::test]
async fn alias_of_guessed_country_is_a_duplicate() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    s.submit("Holland", &directory, &boundaries, |_| {}).await;
    let outcome = s.submit("the netherlands", &directory, &boundaries, |_| {}).await;

    assert_eq!(names(&s), ["Netherlands"]);
    assert_eq!(outcome, Some(Outcome::Rejected(Rejection::Duplicate)));
    assert_eq!(directory.calls(), ["Netherlands"]);
}

#[tokio::test]
async fn invalid_name_makes_no_calls() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    let outcome = s.submit("xyzzy", &directory, &boundaries, |_| {}).await;

    assert_eq!(
        outcome,
        Some(Outcome::Rejected(Rejection::InvalidName {
            input: "xyzzy".into()
        }))
    );
    assert_eq!(s.status_message(), "Invalid country name: \"xyzzy\". Try again!");
    assert_eq!(s.score(), 0);
    assert!(directory.calls().is_empty());
    assert!(boundaries.calls().is_empty());
}

#[tokio::test]
async fn repeated_invalid_name_is_never_a_duplicate() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    s.submit("xyzzy", &directory, &boundaries, |_| {}).await;
    let outcome = s.submit("xyzzy", &directory, &boundaries, |_| {}).await;

    assert!(matches!(
        outcome,
        Some(Outcome::Rejected(Rejection::InvalidName { .. }))
    ));
}

#[tokio::test]
async fn empty_input_is_ignored() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    let outcome = s.submit("   ", &directory, &boundaries, |_| {}).await;

    assert_eq!(outcome, None);
    assert_eq!(s.status_message(), "");
    assert!(directory.calls().is_empty());
}

#[tokio::test]
async fn empty_metadata_is_no_response() {
    let mut s = session();
    let directory = FakeDirectory::default().with("Peru", Ok(vec![]));
    let boundaries = FakeBoundaries::default();

    let outcome = s.submit("peru", &directory, &boundaries, |_| {}).await;

    assert_eq!(outcome, Some(Outcome::Failed(Failure::NoResponse)));
    assert!(s.status_message().contains("No response"));
    assert_eq!(s.score(), 0);
    assert!(s.guessed().is_empty());
    assert!(boundaries.calls().is_empty());
    assert_eq!(s.pending_input(), "");
    assert!(!s.is_busy());
}

#[tokio::test]
async fn transport_error_is_reported_with_cause() {
    let mut s = session();
    let directory = FakeDirectory::default().with(
        "Chile",
        Err(LookupError::Transport("connection reset".into())),
    );
    let boundaries = FakeBoundaries::default();

    let outcome = s.submit("Chile", &directory, &boundaries, |_| {}).await;

    assert!(matches!(outcome, Some(Outcome::Failed(Failure::Lookup(_)))));
    assert_eq!(
        s.status_message(),
        "Error occurred: request failed: connection reset. Please try again."
    );
    assert_eq!(s.score(), 0);
    assert!(s.focus().is_none());
    assert!(boundaries.calls().is_empty());
}

#[tokio::test]
async fn failed_lookup_can_be_retried() {
    let mut s = session();
    let failing = FakeDirectory::default().with("Chile", Err(LookupError::Status { status: 502 }));
    let working = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    s.submit("Chile", &failing, &boundaries, |_| {}).await;
    let outcome = s.submit("Chile", &working, &boundaries, |_| {}).await;

    assert!(outcome.unwrap().is_accepted());
    assert_eq!(s.score(), 1);
}

#[tokio::test]
async fn boundary_failure_keeps_the_guess() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries =
        FakeBoundaries::default().with("Japan", Err(LookupError::Status { status: 429 }));

    let outcome = s.submit("japan", &directory, &boundaries, |_| {}).await;

    assert_eq!(
        outcome,
        Some(Outcome::Accepted {
            country: "Japan".into(),
            rings: 0
        })
    );
    assert_eq!(s.status_message(), "Correct! Japan added.");
    assert_eq!(s.score(), 1);
    assert!(s.shapes().is_empty());
}

#[tokio::test]
async fn unsupported_geometry_keeps_the_guess() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let point = Geometry::Other {
        kind: "Point".into(),
    };
    let boundaries = FakeBoundaries::default().with("Malta", Ok(vec![record(point)]));

    s.submit("malta", &directory, &boundaries, |_| {}).await;

    assert_eq!(s.score(), 1);
    assert!(s.shapes().is_empty());
}

#[tokio::test]
async fn only_first_boundary_record_is_used() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default().with(
        "Cuba",
        Ok(vec![BoundaryRecord::default(), record(unit_square())]),
    );

    let outcome = s.submit("cuba", &directory, &boundaries, |_| {}).await;

    assert_eq!(
        outcome,
        Some(Outcome::Accepted {
            country: "Cuba".into(),
            rings: 0
        })
    );
    assert!(s.shapes().is_empty());
}

#[tokio::test]
async fn multipolygon_adds_one_ring_per_member() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let islands = Geometry::MultiPolygon(vec![
        vec![vec![
            vec![120.0, 22.0],
            vec![121.0, 22.0],
            vec![121.0, 25.0],
            vec![120.0, 22.0],
        ]],
        vec![vec![
            vec![119.5, 23.5],
            vec![119.7, 23.5],
            vec![119.7, 23.7],
            vec![119.5, 23.5],
        ]],
    ]);
    let boundaries = FakeBoundaries::default().with("Taiwan", Ok(vec![record(islands)]));

    s.submit("taiwan", &directory, &boundaries, |_| {}).await;

    assert_eq!(s.shapes().len(), 1);
    assert_eq!(s.shapes()[0].rings.len(), 2);
    assert_eq!(
        s.shapes()[0].rings[0].first(),
        Some(&LatLng::new(22.0, 120.0))
    );
}

#[tokio::test]
async fn guess_is_visible_before_boundary_lookup() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();
    let mut seen = None;

    s.submit("kenya", &directory, &boundaries, |s| seen = Some(s.snapshot()))
        .await;

    let seen = seen.unwrap();
    assert_eq!(seen.score, 1);
    assert_eq!(seen.status_message, "Correct! Kenya added.");
    assert!(seen.busy);
    assert!(seen.polygons.is_empty());
    assert_eq!(s.snapshot().polygons.len(), 1);
    assert!(!s.snapshot().busy);
}

#[tokio::test]
async fn guessed_list_is_alphabetical() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    for input in ["peru", "usa", "Chile", "argentina"] {
        s.submit(input, &directory, &boundaries, |_| {}).await;
    }

    assert_eq!(names(&s), ["Argentina", "Chile", "Peru", "United States"]);
    assert_eq!(s.score(), 4);
    // Shapes keep arrival order.
    assert_eq!(s.shapes()[1].country, "United States");
}

#[tokio::test]
async fn colors_survive_a_new_session() {
    let store = MemoryColorStore::new();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    let mut first = session_with(store.clone(), 1);
    first.submit("Brazil", &directory, &boundaries, |_| {}).await;
    let original = first.guessed()[0].clone();

    let mut second = session_with(store, 2);
    second.submit("brasil", &directory, &boundaries, |_| {}).await;

    assert_eq!(second.guessed()[0], original);
    assert_eq!(second.shapes()[0].stroke, original.stroke);
}

#[tokio::test]
async fn snapshot_serializes() {
    let mut s = session();
    let directory = FakeDirectory::default();
    let boundaries = FakeBoundaries::default();

    s.submit("Egypt", &directory, &boundaries, |_| {}).await;

    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["score"], 1);
    assert_eq!(json["guessed"][0]["name"], "Egypt");
    assert_eq!(json["polygons"][0]["rings"], 1);
    assert_eq!(json["polygons"][0]["points"], 5);
    assert!(json["guessed"][0]["fill"].as_str().unwrap().starts_with('#'));
}
