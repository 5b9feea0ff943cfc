//! Neighbor Selector - ranks every other user against a target user
//!
//! ## Algorithm
//! 1. Check the target exists (fail before scoring anything)
//! 2. Score the target against every other user, in store order
//! 3. Stable-sort by the requested ranking; ties keep store order
//! 4. Keep the top K
//!
//! Two rankings are kept apart on purpose:
//! - `select_neighbors` ranks by squared score, so a strongly negatively
//!   correlated user is as useful an evidence source as a positive one
//! - `most_similar_users` ranks by signed score, the natural "who is like me" list

use crate::metric::SimilarityMetric;
use crate::types::{NeighborRanking, NeighborSet, SimilarityScore};
use data_loader::{RatingStore, UnknownUserError};
use tracing::{debug, instrument};

/// Top `k` users most related to `target_user` under `metric` and `ranking`.
///
/// The target is never part of the result, and every returned user is a
/// member of the store.
#[instrument(skip(store, metric), fields(metric = metric.name()))]
pub fn find_similar_users(
    store: &RatingStore,
    target_user: &str,
    k: usize,
    metric: &dyn SimilarityMetric,
    ranking: NeighborRanking,
) -> Result<NeighborSet, UnknownUserError> {
    store.require_user(target_user)?;

    let mut scores: Vec<SimilarityScore> = store
        .user_ids()
        .filter(|other| other.as_str() != target_user)
        .map(|other| {
            let score = metric.score(store, target_user, other)?;
            Ok::<_, UnknownUserError>(SimilarityScore::new(other.clone(), score))
        })
        .collect::<Result<_, _>>()?;

    debug!("Scored {} other users", scores.len());

    // sort_by is stable, so equal scores stay in store order
    scores.sort_by(|a, b| ranking.compare(a.score, b.score));
    scores.truncate(k);

    Ok(NeighborSet::new(scores))
}

/// Neighbors that feed the aggregator: top `k` by squared score
pub fn select_neighbors(
    store: &RatingStore,
    target_user: &str,
    k: usize,
    metric: &dyn SimilarityMetric,
) -> Result<NeighborSet, UnknownUserError> {
    find_similar_users(store, target_user, k, metric, NeighborRanking::Magnitude)
}

/// Users most similar to the target: top `k` by signed score
pub fn most_similar_users(
    store: &RatingStore,
    target_user: &str,
    k: usize,
    metric: &dyn SimilarityMetric,
) -> Result<NeighborSet, UnknownUserError> {
    find_similar_users(store, target_user, k, metric, NeighborRanking::Signed)
}
