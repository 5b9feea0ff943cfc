//! Evidence gates for the recommendation pipeline.
//!
//! Each filter drops candidate items whose accumulated evidence is too thin
//! to trust a predicted score.

pub mod minimum_support;
pub mod minimum_weight;

// Re-export for convenience
pub use minimum_support::MinimumSupportFilter;
pub use minimum_weight::MinimumWeightFilter;
