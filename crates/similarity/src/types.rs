//! Result types shared by the neighbor selector and its callers.

use data_loader::UserId;
use serde::Serialize;
use std::cmp::Ordering;

/// Similarity of the target user to one other user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityScore {
    pub user_id: UserId,
    pub score: f64,
}

impl SimilarityScore {
    pub fn new(user_id: impl Into<UserId>, score: f64) -> Self {
        Self {
            user_id: user_id.into(),
            score,
        }
    }
}

/// How candidate neighbors are ordered before truncating to K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborRanking {
    /// Squared score, descending. Strong negative correlations rank as high
    /// as strong positive ones; this is what feeds the aggregator.
    #[default]
    Magnitude,
    /// Signed score, descending. "Most similar users" for display.
    Signed,
}

impl NeighborRanking {
    /// Ordering of two scores, best first
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            NeighborRanking::Magnitude => (b * b).total_cmp(&(a * a)),
            NeighborRanking::Signed => b.total_cmp(&a),
        }
    }
}

/// Ordered list of neighbors, best first, at most K long
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NeighborSet {
    neighbors: Vec<SimilarityScore>,
}

impl NeighborSet {
    /// Wrap an already-ordered list
    pub fn new(neighbors: Vec<SimilarityScore>) -> Self {
        Self { neighbors }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimilarityScore> {
        self.neighbors.iter()
    }

    pub fn as_slice(&self) -> &[SimilarityScore] {
        &self.neighbors
    }

    /// Similarity weight of a neighbor, `None` when they were not selected
    pub fn weight_of(&self, user_id: &str) -> Option<f64> {
        self.neighbors
            .iter()
            .find(|n| n.user_id == user_id)
            .map(|n| n.score)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.weight_of(user_id).is_some()
    }

    /// Same neighbors re-ordered by signed score, descending (stable)
    pub fn sorted_for_display(&self) -> NeighborSet {
        let mut neighbors = self.neighbors.clone();
        neighbors.sort_by(|a, b| NeighborRanking::Signed.compare(a.score, b.score));
        NeighborSet { neighbors }
    }

    pub fn into_vec(self) -> Vec<SimilarityScore> {
        self.neighbors
    }
}

impl IntoIterator for NeighborSet {
    type Item = SimilarityScore;
    type IntoIter = std::vec::IntoIter<SimilarityScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.into_iter()
    }
}

impl<'a> IntoIterator for &'a NeighborSet {
    type Item = &'a SimilarityScore;
    type IntoIter = std::slice::Iter<'a, SimilarityScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.iter()
    }
}
