//! Engine crate for the ReelRecs recommender.
//!
//! This crate contains the `RecommendationEngine` facade that owns the
//! rating store and coordinates neighbor selection and aggregation.

pub mod engine;

pub use engine::{RecommendationEngine, UserReport, REPORT_MIN_SUPPORTING_USERS};
