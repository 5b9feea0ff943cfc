//! # Recommendation Engine
//!
//! This module coordinates a full query against one loaded rating store:
//! 1. Look up the target user
//! 2. Select neighbors (magnitude ranking, Pearson)
//! 3. Aggregate neighbor ratings into scored rows
//! 4. Rank and truncate
//!
//! The store is shared behind an `Arc` and never mutated, so the engine is
//! cheap to clone and every query is independent. `recommend_many` exploits
//! that by spreading users over the rayon thread pool.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use data_loader::{RatingStore, UnknownUserError, UserId};
use pipeline::{
    anti_recommendations, build_query_context, RecommendConfig, RecommendationRow, Recommender,
};
use similarity::{most_similar_users, select_neighbors, NeighborSet, PearsonScore, SimilarityMetric};

/// Support threshold used by the per-user report
pub const REPORT_MIN_SUPPORTING_USERS: usize = 2;

/// Everything shown for one user: who they resemble, what to watch, what to skip
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub user_id: UserId,
    /// Selected neighbors, re-sorted by signed score for display
    pub similar_users: NeighborSet,
    pub recommendations: Vec<RecommendationRow>,
    pub anti_recommendations: Vec<RecommendationRow>,
}

/// Facade over a loaded store and a recommender configuration
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<RatingStore>,
    recommender: Arc<Recommender>,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("config", self.recommender.config())
            .finish_non_exhaustive()
    }
}

impl RecommendationEngine {
    /// Create an engine over an already-loaded store
    pub fn new(store: Arc<RatingStore>, config: RecommendConfig) -> Self {
        Self {
            store,
            recommender: Arc::new(Recommender::new(config)),
        }
    }

    /// Load a ratings document and build an engine over it
    pub fn load(path: &Path, config: RecommendConfig) -> Result<Self> {
        let start = Instant::now();
        let store = RatingStore::load_from_file(path)
            .with_context(|| format!("Failed to load ratings from {}", path.display()))?;
        info!("Ratings loaded in {:.2?}", start.elapsed());
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn config(&self) -> &RecommendConfig {
        self.recommender.config()
    }

    /// Same store, different configuration
    pub fn with_config(&self, config: RecommendConfig) -> Self {
        Self::new(self.store.clone(), config)
    }

    /// Users most similar to `user_id`, signed score descending
    #[instrument(skip(self, metric), fields(metric = metric.name()))]
    pub fn similar_users(
        &self,
        user_id: &str,
        count: usize,
        metric: &dyn SimilarityMetric,
    ) -> Result<NeighborSet> {
        Ok(most_similar_users(&self.store, user_id, count, metric)?)
    }

    /// The neighbors a recommendation query for `user_id` would aggregate over
    pub fn neighbors(&self, user_id: &str) -> Result<NeighborSet> {
        let config = self.config();
        let metric = PearsonScore::new(config.min_common_ratings);
        Ok(select_neighbors(
            &self.store,
            user_id,
            config.neighbor_count,
            &metric,
        )?)
    }

    /// Similarity of two users under `metric`
    pub fn score(&self, user_a: &str, user_b: &str, metric: &dyn SimilarityMetric) -> Result<f64> {
        Ok(metric.score(&self.store, user_a, user_b)?)
    }

    /// Top `limit` recommendations for `user_id`
    #[instrument(skip(self))]
    pub fn recommend(&self, user_id: &str, limit: usize) -> Result<Vec<RecommendationRow>> {
        let start = Instant::now();
        let mut rows = self.recommender.recommend(&self.store, user_id)?;
        let total = rows.len();
        rows.truncate(limit);

        info!(
            "Recommended {} of {} items for {} in {:.2?}",
            rows.len(),
            total,
            user_id,
            start.elapsed()
        );
        Ok(rows)
    }

    /// The `limit` items `user_id` is predicted to like least
    #[instrument(skip(self))]
    pub fn anti_recommend(&self, user_id: &str, limit: usize) -> Result<Vec<RecommendationRow>> {
        let rows = self.recommender.recommend(&self.store, user_id)?;
        let mut anti = anti_recommendations(&rows);
        anti.truncate(limit);
        Ok(anti)
    }

    /// Similar users, recommendations and anti-recommendations in one pass.
    ///
    /// Recommendations need at least `REPORT_MIN_SUPPORTING_USERS` neighbors
    /// behind them regardless of the configured threshold.
    #[instrument(skip(self))]
    pub fn report(&self, user_id: &str, limit: usize) -> Result<UserReport> {
        let config = self.config().clone().with_min_supporting_users(
            self.config().min_supporting_users.max(REPORT_MIN_SUPPORTING_USERS),
        );

        let context = build_query_context(&self.store, user_id, &config)
            .with_context(|| format!("Failed to build report for {}", user_id))?;
        let similar_users = context.neighbors.sorted_for_display();

        let rows = Recommender::new(config).recommend_with_context(&self.store, &context);
        let mut anti = anti_recommendations(&rows);
        anti.truncate(limit);

        let mut recommendations = rows;
        recommendations.truncate(limit);

        Ok(UserReport {
            user_id: user_id.to_string(),
            similar_users,
            recommendations,
            anti_recommendations: anti,
        })
    }

    /// Recommendations for many users at once, in input order.
    ///
    /// Each user is an independent query run on the rayon pool; an unknown
    /// user fails only its own slot.
    pub fn recommend_many(
        &self,
        user_ids: &[UserId],
        limit: usize,
    ) -> Vec<Result<Vec<RecommendationRow>, UnknownUserError>> {
        let start = Instant::now();
        let results: Vec<_> = user_ids
            .par_iter()
            .map(|user_id| {
                self.recommender
                    .recommend(&self.store, user_id)
                    .map(|mut rows| {
                        rows.truncate(limit);
                        rows
                    })
            })
            .collect();

        info!(
            "Batch of {} users finished in {:.2?}",
            user_ids.len(),
            start.elapsed()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similarity::EuclideanScore;

    fn build_test_engine() -> RecommendationEngine {
        let mut store = RatingStore::new();
        for (item, rating) in [("Matrix", 9.0), ("Titanic", 2.0), ("Alien", 8.0)] {
            store.insert_rating("Anna", item, rating).unwrap();
        }
        for (item, rating) in [("Matrix", 8.0), ("Titanic", 3.0), ("Alien", 9.0), ("Jaws", 8.0)] {
            store.insert_rating("Bartek", item, rating).unwrap();
        }
        for (item, rating) in [("Matrix", 2.0), ("Titanic", 9.0), ("Alien", 3.0), ("Jaws", 3.0)] {
            store.insert_rating("Celina", item, rating).unwrap();
        }
        RecommendationEngine::new(Arc::new(store), RecommendConfig::default())
    }

    #[test]
    fn test_similar_users_signed_order() {
        let engine = build_test_engine();
        let similar = engine.similar_users("Anna", 8, &PearsonScore::default()).unwrap();

        let ids: Vec<&str> = similar.iter().map(|n| n.user_id.as_str()).collect();
        assert_eq!(ids, vec!["Bartek", "Celina"]);
    }

    #[test]
    fn test_score_with_either_metric() {
        let engine = build_test_engine();
        let pearson = engine.score("Anna", "Celina", &PearsonScore::default()).unwrap();
        let euclidean = engine.score("Anna", "Celina", &EuclideanScore::default()).unwrap();

        assert!(pearson < -0.99);
        assert!(euclidean > 0.0 && euclidean < 0.1);
    }

    #[test]
    fn test_recommend_limit() {
        let engine = build_test_engine();
        let rows = engine.recommend("Anna", 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, "Jaws");
        assert_eq!(rows[0].supporting_users, 2);

        assert!(engine.recommend("Anna", 0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_user_message() {
        let engine = build_test_engine();
        let err = engine.recommend("Ghost", 10).unwrap_err();
        assert!(err.to_string().contains("Cannot find user 'Ghost'"));
    }

    #[test]
    fn test_report_sections() {
        let engine = build_test_engine();
        let report = engine.report("Anna", 10).unwrap();

        assert_eq!(report.user_id, "Anna");
        assert_eq!(report.similar_users.len(), 2);
        assert_eq!(report.similar_users.as_slice()[0].user_id, "Bartek");
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.anti_recommendations.len(), 1);
    }

    #[test]
    fn test_recommend_many_keeps_order() {
        let engine = build_test_engine();
        let users: Vec<UserId> = vec!["Celina".into(), "Ghost".into(), "Anna".into()];
        let results = engine.recommend_many(&users, 5);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err().user_id, "Ghost");
        assert_eq!(
            results[2].as_ref().unwrap(),
            &engine.recommend("Anna", 5).unwrap()
        );
    }
}
