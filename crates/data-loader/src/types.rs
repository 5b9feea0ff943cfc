//! Core domain types for the rating store.
//!
//! The store is a sparse user x item matrix:
//! - each user owns a `BTreeMap<ItemId, f64>` of the items they rated
//! - users are kept in insertion order so every scan over the store is repeatable
//! - an absent (user, item) pair means "not rated", which is not the same as 0.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{DataLoadError, Result, UnknownUserError};

// =============================================================================
// Type Aliases
// =============================================================================

/// User name as it appears in the ratings document
pub type UserId = String;

/// Item (movie) title as it appears in the ratings document
pub type ItemId = String;

// =============================================================================
// Per-user ratings
// =============================================================================

/// All ratings given by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRatings {
    pub user_id: UserId,
    ratings: BTreeMap<ItemId, f64>,
}

impl UserRatings {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ratings: BTreeMap::new(),
        }
    }

    /// Rating for an item, `None` when the user has not rated it
    pub fn get(&self, item_id: &str) -> Option<f64> {
        self.ratings.get(item_id).copied()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.ratings.contains_key(item_id)
    }

    /// Number of rated items
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Iterate `(item, rating)` pairs in item order
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, f64)> {
        self.ratings.iter().map(|(item, &rating)| (item, rating))
    }

    /// Iterate the rated item ids in item order
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.ratings.keys()
    }

    /// Mean of all ratings, `None` for a user with no ratings
    pub fn mean(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: f64 = self.ratings.values().sum();
        Some(total / self.ratings.len() as f64)
    }

    pub(crate) fn insert(&mut self, item_id: ItemId, rating: f64) -> Option<f64> {
        self.ratings.insert(item_id, rating)
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Dataset-wide counts, computed on demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub user_count: usize,
    pub item_count: usize,
    pub rating_count: usize,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

impl StoreSummary {
    /// Fraction of the user x item matrix that holds a rating
    pub fn density(&self) -> f64 {
        let cells = self.user_count * self.item_count;
        if cells == 0 {
            0.0
        } else {
            self.rating_count as f64 / cells as f64
        }
    }
}

// =============================================================================
// RatingStore - the in-memory rating matrix
// =============================================================================

/// Immutable-by-convention mapping `user -> item -> rating`.
///
/// Built once by the loader (or by tests through `insert_*`) and then only
/// read. Query code takes `&RatingStore`; sharing across threads goes through
/// `Arc<RatingStore>`.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    /// Users in insertion order
    pub(crate) users: Vec<UserRatings>,
    /// Position of each user in `users`
    pub(crate) user_index: HashMap<UserId, usize>,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Ratings of a user, `None` when the user is unknown
    pub fn get_user_ratings(&self, user_id: &str) -> Option<&UserRatings> {
        self.user_index.get(user_id).map(|&idx| &self.users[idx])
    }

    /// Ratings of a user, or an `UnknownUserError` naming the missing user
    pub fn require_user(&self, user_id: &str) -> std::result::Result<&UserRatings, UnknownUserError> {
        self.get_user_ratings(user_id)
            .ok_or_else(|| UnknownUserError::new(user_id))
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_index.contains_key(user_id)
    }

    /// Single rating lookup
    pub fn get_rating(&self, user_id: &str, item_id: &str) -> Option<f64> {
        self.get_user_ratings(user_id)?.get(item_id)
    }

    /// All users in insertion order
    pub fn users(&self) -> impl Iterator<Item = &UserRatings> {
        self.users.iter()
    }

    /// All user ids in insertion order
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.users.iter().map(|u| &u.user_id)
    }

    /// Every item rated by at least one user, sorted
    pub fn item_ids(&self) -> BTreeSet<&ItemId> {
        self.users.iter().flat_map(|u| u.items()).collect()
    }

    /// Number of users (including users with no ratings)
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a user, possibly with no ratings.
    ///
    /// Inserting an existing user leaves their ratings untouched.
    pub fn insert_user(&mut self, user_id: impl Into<UserId>) {
        self.user_entry(user_id.into());
    }

    fn user_entry(&mut self, user_id: UserId) -> &mut UserRatings {
        let idx = match self.user_index.get(&user_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.users.len();
                self.user_index.insert(user_id.clone(), idx);
                self.users.push(UserRatings::new(user_id));
                idx
            }
        };
        &mut self.users[idx]
    }

    /// Insert (or overwrite) one rating, registering the user if needed.
    ///
    /// Non-finite ratings are rejected; every metric assumes real numbers.
    pub fn insert_rating(
        &mut self,
        user_id: impl Into<UserId>,
        item_id: impl Into<ItemId>,
        rating: f64,
    ) -> Result<()> {
        if !rating.is_finite() {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: rating.to_string(),
            });
        }
        self.user_entry(user_id.into()).insert(item_id.into(), rating);
        Ok(())
    }

    /// Get counts for debugging/validation: (users, items, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.users.iter().map(|u| u.len()).sum();
        (self.users.len(), self.item_ids().len(), total_ratings)
    }
}
