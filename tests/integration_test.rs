use kinograph::services::gateway::{FactGateway, SearchFilter};
use kinograph::services::profile::ProfileStore;
use kinograph::services::report::NullReporter;
use kinograph::{AppState, Config, NormalizedTitle, TitleFacts};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Canned gateway: property lookups keyed by the (pre-clean) title
/// argument, searches keyed by the filter label.
#[derive(Default)]
struct StubGateway {
    facts: HashMap<String, TitleFacts>,
    searches: HashMap<String, Vec<String>>,
}

#[async_trait::async_trait]
impl FactGateway for StubGateway {
    async fn title_facts(&self, title: &str) -> TitleFacts {
        self.facts.get(title).cloned().unwrap_or_default()
    }

    async fn search_titles(&self, filter: &SearchFilter) -> HashSet<String> {
        self.searches
            .get(&filter.label())
            .map(|titles| titles.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn fixture_config() -> Config {
    let mut config = Config::default();
    config.datasets.movies = PathBuf::from("tests/data/movies.csv");
    config.datasets.tags = PathBuf::from("tests/data/tags.csv");
    config.datasets.ratings = PathBuf::from("tests/data/ratings.csv");
    config
}

fn state_with(gateway: StubGateway, seed: u64) -> AppState {
    AppState::with_parts(
        fixture_config(),
        Arc::new(gateway),
        Arc::new(NullReporter),
        Some(seed),
    )
    .expect("state")
}

#[test]
fn test_profile_store_skips_malformed_rows() {
    let config = fixture_config();
    let store = ProfileStore::load(&config.datasets, &config.profile);

    // The broken movies row and the junk rating are dropped individually.
    assert!(store.movie(5).is_none());
    assert_eq!(store.movie(1).unwrap().title, "Toy Story (1995)");

    let mut liked: Vec<u32> = store.liked().iter().copied().collect();
    liked.sort_unstable();
    assert_eq!(liked, vec![1, 3]);

    assert_eq!(store.target_rating(1), Some(5.0));
    assert_eq!(store.target_rating(4), None);
    assert_eq!(store.rating_row_count(), 4);
}

#[test]
fn test_title_resolution_is_case_insensitive() {
    let config = fixture_config();
    let store = ProfileStore::load(&config.datasets, &config.profile);

    let id = store.resolve_title(&NormalizedTitle::new("toy story"));
    assert_eq!(id, Some(1));
    assert_eq!(store.resolve_title(&NormalizedTitle::new("No Such Film")), None);
}

#[tokio::test]
async fn test_rating_path_scores_perfect_match() {
    // The only candidate resolves to the five-star liked movie.
    let mut gateway = StubGateway::default();
    gateway.searches.insert(
        "Action".to_string(),
        vec!["\"Toy Story (1995)\"@en".to_string()],
    );

    let state = state_with(gateway, 7);
    let summary = state.recommendation_service.run().await;

    let recommendation = summary.recommendation.expect("single candidate wins");
    assert_eq!(recommendation.title.as_str(), "Toy Story");
    assert!((recommendation.probability - 1.0).abs() < 1e-9);
    assert_eq!(summary.entity_error, Some(0.0));
}

#[tokio::test]
async fn test_taste_profile_derivation() {
    let mut gateway = StubGateway::default();
    gateway.facts.insert(
        "Heat".to_string(),
        TitleFacts {
            actors: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
            directors: vec!["Michael Mann".to_string()],
        },
    );
    gateway.facts.insert(
        "Toy Story".to_string(),
        TitleFacts {
            actors: vec!["Tom Hanks".to_string()],
            directors: vec!["John Lasseter".to_string()],
        },
    );

    let state = state_with(gateway, 7);
    let summary = state.recommendation_service.run().await;
    let taste = &summary.taste;

    // Liked movies are Toy Story and Heat; every genre counts once, so the
    // lexicographic tie-break decides the top three.
    assert_eq!(taste.genres, vec!["Action", "Adventure", "Animation"]);
    assert_eq!(taste.tags, vec!["animation", "heist", "pixar"]);
    assert_eq!(taste.actors, vec!["Al Pacino", "Robert De Niro", "Tom Hanks"]);
    assert_eq!(taste.directors, vec!["John Lasseter", "Michael Mann"]);
    assert_eq!(taste.years, vec![1995]);
}

#[tokio::test]
async fn test_no_candidates_yields_sentinel() {
    let state = state_with(StubGateway::default(), 7);
    let summary = state.recommendation_service.run().await;

    assert!(summary.recommendation.is_none());
    assert!(summary.distribution.entries.is_empty());
    assert_eq!(summary.entity_error, None);
}

#[tokio::test]
async fn test_unresolved_title_falls_back_to_aspect_map() {
    // A film the local feeds have never seen, surfaced by two probes.
    let mut gateway = StubGateway::default();
    gateway.searches.insert(
        "Action".to_string(),
        vec!["Phantom Film".to_string()],
    );
    gateway.searches.insert(
        "animation".to_string(),
        vec!["Phantom Film".to_string()],
    );

    let state = state_with(gateway, 7);
    let summary = state.recommendation_service.run().await;

    let recommendation = summary.recommendation.expect("phantom film wins");
    assert_eq!(recommendation.title.as_str(), "Phantom Film");
    assert_eq!(recommendation.aspects.len(), 2);
    // Two satisfied aspects out of the five kinds.
    assert_eq!(summary.entity_error, Some(1.0 - 2.0 / 5.0));
}

#[tokio::test]
async fn test_distribution_mass_and_entity_error_bounds() {
    let mut gateway = StubGateway::default();
    gateway.searches.insert(
        "Action".to_string(),
        vec![
            "Phantom Film".to_string(),
            "Heat (1995)".to_string(),
            "Speed (1994)".to_string(),
        ],
    );
    gateway.searches.insert(
        "heist".to_string(),
        vec!["Heat".to_string()],
    );

    let state = state_with(gateway, 3);
    let summary = state.recommendation_service.run().await;

    assert!((summary.distribution.total_mass() - 1.0).abs() < 1e-9);
    let error = summary.entity_error.expect("candidate picked");
    assert!((0.0..=1.0).contains(&error));
}

#[tokio::test]
async fn test_same_seed_reproduces_the_pick() {
    let build = || {
        let mut gateway = StubGateway::default();
        gateway.searches.insert(
            "Action".to_string(),
            vec![
                "Heat (1995)".to_string(),
                "Speed (1994)".to_string(),
                "Ronin (1998)".to_string(),
            ],
        );
        state_with(gateway, 99)
    };

    let first = build().recommendation_service.run().await;
    let second = build().recommendation_service.run().await;

    assert_eq!(
        first.recommendation.map(|r| r.title),
        second.recommendation.map(|r| r.title)
    );
}
