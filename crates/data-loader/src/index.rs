//! Loading, validating and summarising a `RatingStore`.
//!
//! `load_from_file` is the main entry point used by the engine and the CLI:
//! 1. Parse the JSON document
//! 2. Validate every rating
//! 3. Log a summary of what was loaded

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl RatingStore {
    /// Load a ratings document from disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading ratings from {:?}", path);

        let store = parser::parse_ratings_file(path)?;
        store.validate()?;

        let summary = store.summary();
        info!(
            "Loaded {} users, {} items, {} ratings (density {:.3})",
            summary.user_count,
            summary.item_count,
            summary.rating_count,
            summary.density()
        );
        Ok(store)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every rating is a finite number
    /// - The user index points at the right rows
    pub fn validate(&self) -> Result<()> {
        for (idx, user) in self.users.iter().enumerate() {
            if self.user_index.get(&user.user_id) != Some(&idx) {
                return Err(DataLoadError::ValidationError(format!(
                    "user index out of sync for '{}'",
                    user.user_id
                )));
            }
            for (item_id, rating) in user.iter() {
                if !rating.is_finite() {
                    return Err(DataLoadError::InvalidValue {
                        field: format!("rating of '{}' by '{}'", item_id, user.user_id),
                        value: rating.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Compute dataset-wide counts and the observed rating range
    pub fn summary(&self) -> StoreSummary {
        let (user_count, item_count, rating_count) = self.counts();
        let (min_rating, max_rating) = self
            .users
            .iter()
            .flat_map(|u| u.iter().map(|(_, r)| r))
            .fold((None, None), |(min, max): (Option<f64>, Option<f64>), r| {
                (
                    Some(min.map_or(r, |m| m.min(r))),
                    Some(max.map_or(r, |m| m.max(r))),
                )
            });

        StoreSummary {
            user_count,
            item_count,
            rating_count,
            min_rating,
            max_rating,
        }
    }
}
