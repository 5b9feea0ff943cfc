//! Recommendation aggregation over a neighbor set.
//!
//! This crate provides:
//! - `RecommendConfig` with every tunable of a query
//! - `QueryContext`: the target's rated items plus selected neighbors
//! - `CandidateMatrix`: sparse neighbor x item ratings with a weight vector
//! - Filter trait, evidence filters and the `FilterPipeline` composing them
//! - `Recommender`: centered, similarity-weighted aggregation and ranking
//!
//! ## Architecture
//! A query runs in stages:
//! 1. Neighbors are selected by |Pearson correlation|
//! 2. The candidate matrix is built and cleaned of empty rows/columns
//! 3. Centered ratings are accumulated per item
//! 4. Filters drop items with too little evidence
//! 5. Surviving items are scored and ranked
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{anti_recommendations, RecommendConfig, Recommender};
//!
//! let recommender = Recommender::new(RecommendConfig::default());
//! let rows = recommender.recommend(&store, "Anna")?;
//! let worst = anti_recommendations(&rows);
//! ```

pub mod config;
pub mod context;
pub mod matrix;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod aggregator;

// Re-export main types
pub use config::RecommendConfig;
pub use context::{build_query_context, QueryContext};
pub use matrix::{CandidateMatrix, CleanupStats, NeighborRow};
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use aggregator::{
    accumulate, anti_recommendations, rank, recommend, ItemEvidence, RecommendationRow,
    Recommender,
};
