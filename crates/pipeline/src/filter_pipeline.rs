//! The FilterPipeline chains evidence filters.

use crate::aggregator::ItemEvidence;
use crate::config::RecommendConfig;
use crate::filters::{MinimumSupportFilter, MinimumWeightFilter};
use crate::traits::Filter;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MinimumWeightFilter::new(1.0))
///     .add_filter(MinimumSupportFilter::new(2));
///
/// let kept = pipeline.apply(evidence);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The evidence gates every recommendation goes through: summed
    /// |similarity| first, then the number of supporting neighbors.
    pub fn from_config(config: &RecommendConfig) -> Self {
        Self::new()
            .add_filter(MinimumWeightFilter::new(config.min_weight_sum))
            .add_filter(MinimumSupportFilter::new(config.min_supporting_users))
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence.
    ///
    /// ## Algorithm
    /// 1. Start with the input evidence
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return what survived
    pub fn apply(&self, evidence: Vec<ItemEvidence>) -> Vec<ItemEvidence> {
        let mut current = evidence;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
