//! Similarity-weighted aggregation of neighbor ratings.
//!
//! ## Algorithm
//! 1. Select neighbors by |Pearson correlation| (`QueryContext`)
//! 2. Build the sparse candidate matrix, excluding the target's items
//! 3. Center each rating by `bias` and accumulate, per item:
//!    `weighted_rating_sum += (rating - bias) * weight`,
//!    `weight_sum += |weight|`, `supporting_users += 1`
//! 4. Gate items through the `FilterPipeline`
//! 5. `predicted_score = weighted_rating_sum / weight_sum`
//! 6. Rank by predicted score, then by weight sum
//!
//! Centering is what lets anti-correlated neighbors contribute: a low rating
//! becomes a negative centered value, and times a negative weight it pushes
//! the item up.

use crate::config::RecommendConfig;
use crate::context::{build_query_context, QueryContext};
use crate::filter_pipeline::FilterPipeline;
use crate::matrix::CandidateMatrix;
use data_loader::{ItemId, RatingStore, UnknownUserError};
use serde::Serialize;
use tracing::{debug, instrument};

/// Accumulated evidence for one candidate item, before gating
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEvidence {
    pub item_id: ItemId,
    pub weighted_rating_sum: f64,
    pub weight_sum: f64,
    pub supporting_users: usize,
}

impl ItemEvidence {
    /// `None` when no weight backs the item (every supporting neighbor had
    /// similarity 0), since no score can be formed.
    pub fn into_row(self) -> Option<RecommendationRow> {
        if self.weight_sum <= 0.0 {
            return None;
        }
        Some(RecommendationRow {
            predicted_score: self.weighted_rating_sum / self.weight_sum,
            item_id: self.item_id,
            supporting_users: self.supporting_users,
            weighted_rating_sum: self.weighted_rating_sum,
            weight_sum: self.weight_sum,
        })
    }
}

/// One recommended item with the evidence behind its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub item_id: ItemId,
    pub predicted_score: f64,
    pub supporting_users: usize,
    pub weighted_rating_sum: f64,
    pub weight_sum: f64,
}

/// Walk the matrix column by column and accumulate centered, weighted ratings
pub fn accumulate(matrix: &CandidateMatrix, bias: f64) -> Vec<ItemEvidence> {
    matrix
        .items()
        .iter()
        .enumerate()
        .map(|(index, item_id)| {
            let mut evidence = ItemEvidence {
                item_id: item_id.clone(),
                weighted_rating_sum: 0.0,
                weight_sum: 0.0,
                supporting_users: 0,
            };
            for (neighbor, rating) in matrix.column(index) {
                evidence.weighted_rating_sum += (rating - bias) * neighbor.weight;
                evidence.weight_sum += neighbor.weight.abs();
                evidence.supporting_users += 1;
            }
            evidence
        })
        .collect()
}

/// Best first: predicted score descending, then weight sum descending.
/// The sort is stable, so remaining ties keep item-id order.
pub fn rank(rows: &mut [RecommendationRow]) {
    rows.sort_by(|a, b| {
        b.predicted_score
            .total_cmp(&a.predicted_score)
            .then_with(|| b.weight_sum.total_cmp(&a.weight_sum))
    });
}

/// The same rows, worst predicted score first (stable)
pub fn anti_recommendations(rows: &[RecommendationRow]) -> Vec<RecommendationRow> {
    let mut anti = rows.to_vec();
    anti.sort_by(|a, b| a.predicted_score.total_cmp(&b.predicted_score));
    anti
}

/// Neighbor-based recommender bound to one configuration.
///
/// Holds no per-query state, so a single instance can serve any number of
/// queries, from any number of threads.
pub struct Recommender {
    config: RecommendConfig,
    filters: FilterPipeline,
}

impl Recommender {
    pub fn new(config: RecommendConfig) -> Self {
        let filters = FilterPipeline::from_config(&config);
        Self { config, filters }
    }

    /// Replace the default evidence gates
    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Ranked recommendations for `user_id`.
    ///
    /// # Returns
    /// * `Ok(rows)` - Ranked rows; empty when nothing clears the gates
    /// * `Err(UnknownUserError)` - If `user_id` is not in the store
    #[instrument(skip(self, store))]
    pub fn recommend(
        &self,
        store: &RatingStore,
        user_id: &str,
    ) -> Result<Vec<RecommendationRow>, UnknownUserError> {
        let context = build_query_context(store, user_id, &self.config)?;
        Ok(self.recommend_with_context(store, &context))
    }

    /// Run the aggregation for an already-built context
    pub fn recommend_with_context(
        &self,
        store: &RatingStore,
        context: &QueryContext,
    ) -> Vec<RecommendationRow> {
        let matrix = CandidateMatrix::build(store, context);
        let evidence = accumulate(&matrix, self.config.bias);
        let candidates = evidence.len();

        let kept = self.filters.apply(evidence);
        let mut rows: Vec<RecommendationRow> =
            kept.into_iter().filter_map(ItemEvidence::into_row).collect();
        rank(&mut rows);

        debug!(
            user = %context.user_id,
            neighbors = context.neighbors.len(),
            candidates,
            recommended = rows.len(),
            "Aggregated recommendations"
        );

        rows
    }
}

/// Ranked recommendations for `user_id` under `config`
pub fn recommend(
    store: &RatingStore,
    user_id: &str,
    config: &RecommendConfig,
) -> Result<Vec<RecommendationRow>, UnknownUserError> {
    Recommender::new(config.clone()).recommend(store, user_id)
}
