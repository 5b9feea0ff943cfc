//! Core traits for the evidence filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible gates to be applied to per-item evidence before scores
//! are finalized.

use crate::aggregator::ItemEvidence;

/// Core trait for filtering aggregated item evidence.
///
/// ## Design Note
/// - `Send + Sync` lets one `Recommender` serve queries from several threads
/// - Filters take ownership of the Vec and return the survivors, in order
/// - Filtering cannot fail: insufficient evidence means "no row", not an error
/// - Filters judge each item on its own evidence, so they need no query state
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidate items.
    ///
    /// # Arguments
    /// * `evidence` - Accumulated evidence per candidate item (takes ownership)
    ///
    /// # Returns
    /// The items that pass, in their input order
    fn apply(&self, evidence: Vec<ItemEvidence>) -> Vec<ItemEvidence>;
}
