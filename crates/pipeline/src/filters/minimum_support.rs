//! Filter on the number of neighbors who rated an item.

use crate::aggregator::ItemEvidence;
use crate::traits::Filter;

/// Drops items rated by fewer than `min_supporting_users` neighbors.
///
/// A threshold of 0 or 1 keeps everything the matrix produced, since every
/// candidate column has at least one rating.
pub struct MinimumSupportFilter {
    min_supporting_users: usize,
}

impl MinimumSupportFilter {
    pub fn new(min_supporting_users: usize) -> Self {
        Self {
            min_supporting_users,
        }
    }
}

impl Filter for MinimumSupportFilter {
    fn name(&self) -> &str {
        "MinimumSupportFilter"
    }

    fn apply(&self, evidence: Vec<ItemEvidence>) -> Vec<ItemEvidence> {
        evidence
            .into_iter()
            .filter(|item| item.supporting_users >= self.min_supporting_users)
            .collect()
    }
}
