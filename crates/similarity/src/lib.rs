//! # Similarity Crate
//!
//! User-to-user similarity over a `RatingStore` and top-K neighbor selection.
//!
//! ## Components
//!
//! ### Metrics
//! - `EuclideanScore`: `1 / (1 + distance)` over shared items, range (0, 1]
//! - `PearsonScore`: correlation over shared items, range [-1, 1] (default)
//!
//! Both return 0.0 when two users share fewer than `min_common_ratings`
//! items and fail only when a user is missing from the store.
//!
//! ### Neighbor Selector
//! - `select_neighbors`: top K by squared score (feeds the recommender)
//! - `most_similar_users`: top K by signed score (for display)
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{most_similar_users, PearsonScore};
//!
//! let similar = most_similar_users(&store, "Anna", 8, &PearsonScore::default())?;
//! for neighbor in &similar {
//!     println!("{}: {:.2}", neighbor.user_id, neighbor.score);
//! }
//! ```

// Public modules
pub mod types;
pub mod metric;
pub mod neighbors;

// Re-export commonly used types
pub use types::{NeighborRanking, NeighborSet, SimilarityScore};
pub use metric::{
    common_ratings, euclidean_score, pearson_score, EuclideanScore, MetricKind, PearsonScore,
    SimilarityMetric, DEFAULT_MIN_COMMON_RATINGS,
};
pub use neighbors::{find_similar_users, most_similar_users, select_neighbors};
