//! # Data Loader Crate
//!
//! This crate holds the rating store the recommender reads from and loads it
//! from a JSON document of the form `{ user: { item: rating } }`.
//!
//! ## Main Components
//!
//! - **types**: `RatingStore`, `UserRatings`, `StoreSummary` and the id aliases
//! - **parser**: Deserialize the JSON document, keeping user order
//! - **index**: Load from disk, validate, summarise
//! - **error**: `DataLoadError` and `UnknownUserError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use std::path::Path;
//!
//! let store = RatingStore::load_from_file(Path::new("data/ratings.json"))?;
//!
//! let anna = store.require_user("Anna")?;
//! println!("Anna rated {} movies", anna.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result, UnknownUserError};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    RatingStore,
    UserRatings,
    StoreSummary,
};
