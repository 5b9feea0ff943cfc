//! Integration tests for the recommendation pipeline.
//!
//! These tests run full queries (neighbor selection, matrix, gates, ranking)
//! against small in-memory stores.

use data_loader::RatingStore;
use pipeline::{
    anti_recommendations, build_query_context, recommend, QueryContext, RecommendConfig,
    Recommender,
};
use similarity::{NeighborSet, SimilarityScore};

fn create_test_store() -> RatingStore {
    let mut store = RatingStore::new();
    let ratings: &[(&str, &[(&str, f64)])] = &[
        (
            "Anna",
            &[("Matrix", 9.0), ("Titanic", 2.0), ("Alien", 8.0), ("Heat", 7.0)],
        ),
        (
            "Bartek",
            &[("Matrix", 8.0), ("Titanic", 3.0), ("Alien", 9.0), ("Jaws", 8.0), ("Dune", 7.0)],
        ),
        (
            "Celina",
            &[("Matrix", 2.0), ("Titanic", 9.0), ("Alien", 3.0), ("Jaws", 2.0), ("Amelie", 9.0)],
        ),
        (
            "Darek",
            &[("Matrix", 7.0), ("Alien", 7.0), ("Heat", 6.0), ("Dune", 9.0), ("Jaws", 7.0)],
        ),
        (
            "Ewa",
            &[
                ("Matrix", 6.0),
                ("Titanic", 4.0),
                ("Alien", 7.0),
                ("Heat", 5.0),
                ("Jaws", 8.0),
                ("Dune", 3.0),
                ("Amelie", 2.0),
            ],
        ),
    ];
    for (user, items) in ratings {
        for (item, rating) in items.iter() {
            store.insert_rating(*user, *item, *rating).unwrap();
        }
    }
    store.insert_user("Newbie");
    store
}

#[test]
fn test_never_recommends_rated_items() {
    let store = create_test_store();
    let config = RecommendConfig::default().with_min_weight_sum(0.0);

    for user in store.user_ids() {
        let rated = store.get_user_ratings(user).unwrap();
        let rows = recommend(&store, user, &config).unwrap();
        for row in &rows {
            assert!(
                !rated.contains(&row.item_id),
                "{} was recommended {} which they already rated",
                user,
                row.item_id
            );
        }
    }
}

#[test]
fn test_recommend_is_idempotent() {
    let store = create_test_store();
    let recommender = Recommender::new(RecommendConfig::default());

    let first = recommender.recommend(&store, "Anna").unwrap();
    let second = recommender.recommend(&store, "Anna").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rows_are_ranked_and_anti_is_ascending() {
    let store = create_test_store();
    let rows = recommend(&store, "Anna", &RecommendConfig::default()).unwrap();
    assert!(!rows.is_empty());

    for pair in rows.windows(2) {
        assert!(pair[0].predicted_score >= pair[1].predicted_score);
    }
    for row in &rows {
        assert!(row.weight_sum >= 1.0);
        assert!(row.supporting_users >= 1);
        assert!((row.predicted_score - row.weighted_rating_sum / row.weight_sum).abs() < 1e-12);
    }

    let anti = anti_recommendations(&rows);
    assert_eq!(anti.len(), rows.len());
    for pair in anti.windows(2) {
        assert!(pair[0].predicted_score <= pair[1].predicted_score);
    }
}

#[test]
fn test_target_who_rated_everything_gets_nothing() {
    let store = create_test_store();
    let rows = recommend(&store, "Ewa", &RecommendConfig::default()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_single_weak_neighbor_is_not_enough() {
    let store = create_test_store();

    // Only Celina, weight 0.5: every candidate has weight_sum 0.5 < 1
    let mut context = QueryContext::new("Anna");
    context.rated_items = store
        .get_user_ratings("Anna")
        .unwrap()
        .items()
        .cloned()
        .collect();
    context.neighbors = NeighborSet::new(vec![SimilarityScore::new("Celina", 0.5)]);

    let recommender = Recommender::new(RecommendConfig::default());
    assert!(recommender.recommend_with_context(&store, &context).is_empty());

    // The gate is on similarity, not on centered ratings: lowering it lets
    // the same evidence through
    let lenient = Recommender::new(RecommendConfig::default().with_min_weight_sum(0.5));
    let rows = lenient.recommend_with_context(&store, &context);
    let ids: Vec<&str> = rows.iter().map(|r| r.item_id.as_str()).collect();
    assert_eq!(ids, vec!["Amelie", "Jaws"]);
}

#[test]
fn test_negative_neighbor_low_rating_pushes_item_up() {
    let mut store = RatingStore::new();
    for (item, rating) in [("A", 9.0), ("B", 2.0), ("C", 8.0)] {
        store.insert_rating("Target", item, rating).unwrap();
    }
    // Mirror image of the target, and hated D
    for (item, rating) in [("A", 2.0), ("B", 9.0), ("C", 3.0), ("D", 1.0)] {
        store.insert_rating("Foe", item, rating).unwrap();
    }

    let context = build_query_context(&store, "Target", &RecommendConfig::default()).unwrap();
    let weight = context.neighbors.weight_of("Foe").unwrap();
    assert!(weight < -0.99);

    let config = RecommendConfig::default().with_min_weight_sum(0.5);
    let rows = recommend(&store, "Target", &config).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_id, "D");
    // (1 - 5.5) * weight / |weight| = 4.5
    assert!((rows[0].predicted_score - 4.5).abs() < 1e-9);
}

#[test]
fn test_support_threshold() {
    let store = create_test_store();
    let config = RecommendConfig::default()
        .with_min_weight_sum(0.0)
        .with_min_supporting_users(2);

    let rows = recommend(&store, "Anna", &config).unwrap();
    assert!(rows.iter().all(|r| r.supporting_users >= 2));
    // Amelie is rated by Celina and Ewa only; Jaws and Dune by more
    assert!(rows.iter().any(|r| r.item_id == "Jaws"));
}

#[test]
fn test_user_without_ratings() {
    let store = create_test_store();

    let context = build_query_context(&store, "Newbie", &RecommendConfig::default()).unwrap();
    assert!(context.rated_items.is_empty());

    // Every correlation is 0, so no item can collect any weight
    let rows = recommend(&store, "Newbie", &RecommendConfig::default()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_unknown_user_fails_before_computing() {
    let store = create_test_store();
    let err = recommend(&store, "Zenon", &RecommendConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Cannot find user 'Zenon' in the dataset");
}
