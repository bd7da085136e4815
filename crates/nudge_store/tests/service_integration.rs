//! End-to-end tests for GenreSelectionService against real store backends.

use nudge_bandit::{GaussianInitializer, GradientBandit};
use nudge_core::{Genre, NudgeConfig, NudgeError, PreferenceVector};
use nudge_store::{score_key, GenreSelectionService, MemoryScoreStore, ScoreStore, SqliteScoreStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn seeded(store: Arc<dyn ScoreStore>, seed: u64) -> GenreSelectionService {
    GenreSelectionService::with_parts(
        store,
        GradientBandit::new(),
        GaussianInitializer::new(),
        StdRng::seed_from_u64(seed),
    )
}

#[tokio::test]
async fn test_cold_start_persists_vector() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = seeded(store.clone(), 1);

    let _ = service.select_genre("alice").await;

    let stored = store
        .load(&score_key("alice"))
        .await
        .unwrap()
        .expect("cold start should persist");
    assert_eq!(stored.genres(), Genre::ALL);

    // Second call reads the stored vector instead of re-initializing
    let again = service.preferences("alice").await;
    assert_eq!(again, stored);
}

#[tokio::test]
async fn test_reinforce_from_uniform() {
    let store = Arc::new(MemoryScoreStore::new());
    store
        .save(&score_key("u"), &PreferenceVector::zeroed())
        .await
        .unwrap();
    let service = seeded(store.clone(), 7);

    let updated = service.reinforce_genre("u", Genre::Move).await.unwrap();

    assert!((updated.score(Genre::Move).unwrap() - 0.0375).abs() < 1e-12);
    for g in [Genre::Relax, Genre::Creative, Genre::Music] {
        assert!((updated.score(g).unwrap() + 0.0125).abs() < 1e-12);
    }

    let stored = store.load(&score_key("u")).await.unwrap().unwrap();
    assert_eq!(stored, updated);

    let probs = service.probabilities("u").await;
    assert!(probs.probability(Genre::Move) > 0.25);
    assert!((probs.sum() - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_repeated_reinforcement_raises_probability() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = seeded(store, 11);

    let mut last = service.probabilities("bob").await.probability(Genre::Creative);
    for _ in 0..10 {
        service.reinforce_genre("bob", Genre::Creative).await.unwrap();
        let p = service.probabilities("bob").await.probability(Genre::Creative);
        assert!(p > last, "probability should rise: {} -> {}", last, p);
        last = p;
    }
}

#[tokio::test]
async fn test_malformed_state_behaves_like_cold_start() {
    let broken = Arc::new(MemoryScoreStore::new());
    broken
        .insert_raw(
            &score_key("carol"),
            r#"[{"genre":"RELAX","score":0.1},{"genre":"MOVE","score":0.2},{"genre":"MUSIC","score":0.3}]"#,
        )
        .await;
    let empty = Arc::new(MemoryScoreStore::new());

    let a = seeded(broken.clone(), 99);
    let b = seeded(empty, 99);

    assert_eq!(a.preferences("carol").await, b.preferences("carol").await);

    // The malformed payload has been overwritten with a whole vector
    assert!(broken.load(&score_key("carol")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_malformed_state_selects_like_cold_start() {
    let broken = Arc::new(MemoryScoreStore::new());
    broken
        .insert_raw(&score_key("carol"), r#"{"genre":"RELAX","score":"high"}"#)
        .await;
    let empty = Arc::new(MemoryScoreStore::new());

    let a = seeded(broken, 1234);
    let b = seeded(empty, 1234);

    let mut picks_a = Vec::new();
    let mut picks_b = Vec::new();
    for _ in 0..100 {
        picks_a.push(a.select_genre("carol").await);
        picks_b.push(b.select_genre("carol").await);
    }
    assert_eq!(picks_a, picks_b);
}

#[tokio::test]
async fn test_unavailable_store_never_fails() {
    let store = SqliteScoreStore::new(":memory:").await.unwrap();
    store.close().await;
    let service = seeded(Arc::new(store), 3);

    let genre = service.select_genre("dave").await;
    assert!(Genre::ALL.contains(&genre));

    let updated = service.reinforce_genre("dave", Genre::Music).await.unwrap();
    assert_eq!(updated.genres(), Genre::ALL);
}

#[tokio::test]
async fn test_reinforce_named_rejects_unknown_genre() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = seeded(store.clone(), 5);

    let err = service.reinforce_named("erin", "DANCE").await.unwrap_err();
    assert_eq!(err, NudgeError::UnknownGenre("DANCE".to_string()));
    assert!(store.is_empty().await);

    let updated = service.reinforce_named("erin", "relax").await.unwrap();
    assert!(updated.score(Genre::Relax).is_some());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_invalid_learning_rate_rejected_before_state() {
    let store = Arc::new(MemoryScoreStore::new());
    let bandit = GradientBandit {
        learning_rate: -1.0,
        ..GradientBandit::new()
    };
    let service = GenreSelectionService::with_parts(
        store.clone(),
        bandit,
        GaussianInitializer::new(),
        StdRng::seed_from_u64(0),
    );

    let err = service.reinforce_genre("frank", Genre::Move).await.unwrap_err();
    assert!(matches!(err, NudgeError::InvalidParameter { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_reset_forgets_state() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = seeded(store.clone(), 8);

    service.reinforce_genre("gina", Genre::Relax).await.unwrap();
    assert_eq!(store.len().await, 1);

    service.reset("gina").await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_users_are_independent() {
    let store = Arc::new(MemoryScoreStore::new());
    store
        .save(&score_key("a"), &PreferenceVector::zeroed())
        .await
        .unwrap();
    store
        .save(&score_key("b"), &PreferenceVector::zeroed())
        .await
        .unwrap();
    let service = seeded(store.clone(), 2);

    service.reinforce_genre("a", Genre::Move).await.unwrap();

    assert_eq!(
        store.load(&score_key("b")).await.unwrap(),
        Some(PreferenceVector::zeroed())
    );
}

#[tokio::test]
async fn test_seeded_service_is_deterministic() {
    let mut config = NudgeConfig::default();
    config.rng_seed = Some(2024);

    let a = GenreSelectionService::from_config(Arc::new(MemoryScoreStore::new()), &config).unwrap();
    let b = GenreSelectionService::from_config(Arc::new(MemoryScoreStore::new()), &config).unwrap();

    let mut picks_a = Vec::new();
    let mut picks_b = Vec::new();
    for _ in 0..50 {
        picks_a.push(a.select_genre("henry").await);
        picks_b.push(b.select_genre("henry").await);
    }
    assert_eq!(picks_a, picks_b);
}

#[tokio::test]
async fn test_sqlite_backed_service_roundtrip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nudge.db");

    let after_first = {
        let store = SqliteScoreStore::new(&path).await.unwrap();
        let service = seeded(Arc::new(store), 4);
        service.reinforce_genre("ivy", Genre::Music).await.unwrap()
    };

    let store = SqliteScoreStore::new(&path).await.unwrap();
    let service = seeded(Arc::new(store), 999);
    assert_eq!(service.preferences("ivy").await, after_first);
}
