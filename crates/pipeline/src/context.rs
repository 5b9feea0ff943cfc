//! Per-query context for the target user
//!
//! Everything the aggregator needs to know about the target is gathered once
//! up front:
//! - the items they already rated (never recommended back)
//! - the neighbors selected by |Pearson correlation|

use crate::config::RecommendConfig;
use data_loader::{ItemId, RatingStore, UnknownUserError, UserId};
use similarity::{select_neighbors, NeighborSet, PearsonScore};
use std::collections::HashSet;

/// The target user and their selected neighbors
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub user_id: UserId,
    /// Items the target has rated; excluded from candidates
    pub rated_items: HashSet<ItemId>,
    /// Neighbors ranked by squared correlation, weights are signed
    pub neighbors: NeighborSet,
}

impl QueryContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            rated_items: HashSet::new(),
            neighbors: NeighborSet::default(),
        }
    }
}

/// Build a QueryContext for `user_id`
///
/// A user with no ratings is valid: the exclusion set is empty and every
/// correlation is 0.0.
pub fn build_query_context(
    store: &RatingStore,
    user_id: &str,
    config: &RecommendConfig,
) -> Result<QueryContext, UnknownUserError> {
    let ratings = store.require_user(user_id)?;

    let metric = PearsonScore::new(config.min_common_ratings);
    let neighbors = select_neighbors(store, user_id, config.neighbor_count, &metric)?;

    Ok(QueryContext {
        user_id: user_id.to_string(),
        rated_items: ratings.items().cloned().collect(),
        neighbors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> RatingStore {
        let mut store = RatingStore::new();
        store.insert_rating("Anna", "Matrix", 9.0).unwrap();
        store.insert_rating("Anna", "Titanic", 2.0).unwrap();
        store.insert_rating("Bartek", "Matrix", 8.0).unwrap();
        store.insert_rating("Bartek", "Titanic", 3.0).unwrap();
        store.insert_rating("Bartek", "Alien", 7.0).unwrap();
        store.insert_user("Celina");
        store
    }

    #[test]
    fn test_build_query_context() {
        let store = create_test_store();
        let context = build_query_context(&store, "Anna", &RecommendConfig::default()).unwrap();

        assert_eq!(context.user_id, "Anna");
        assert_eq!(context.rated_items.len(), 2);
        assert!(context.rated_items.contains("Matrix"));
        assert_eq!(context.neighbors.len(), 2);
        assert!((context.neighbors.weight_of("Bartek").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(context.neighbors.weight_of("Celina"), Some(0.0));
    }

    #[test]
    fn test_neighbor_count_respected() {
        let store = create_test_store();
        let config = RecommendConfig::default().with_neighbor_count(1);
        let context = build_query_context(&store, "Anna", &config).unwrap();

        assert_eq!(context.neighbors.len(), 1);
        assert!(context.neighbors.contains("Bartek"));
    }

    #[test]
    fn test_user_with_no_ratings() {
        let store = create_test_store();
        let context = build_query_context(&store, "Celina", &RecommendConfig::default()).unwrap();

        assert!(context.rated_items.is_empty());
        assert!(context.neighbors.iter().all(|n| n.score == 0.0));
    }

    #[test]
    fn test_user_not_found() {
        let store = create_test_store();
        let result = build_query_context(&store, "Nobody", &RecommendConfig::default());
        assert_eq!(result.unwrap_err().user_id, "Nobody");
    }
}
