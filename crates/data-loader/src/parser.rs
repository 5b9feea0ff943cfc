//! Parser for the JSON ratings document.
//!
//! Format:
//!
//! ```text
//! {
//!     "Anna": { "Matrix (1999)": 9, "Titanic (1997)": 4 },
//!     "Bartek": { "Matrix (1999)": 7 }
//! }
//! ```
//!
//! The store is deserialized through a hand-written `Visitor` instead of an
//! intermediate `HashMap` so that users keep the order of the document and
//! duplicate keys are caught instead of silently overwritten.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parse a ratings document held in memory
pub fn parse_ratings_str(json: &str) -> Result<RatingStore> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a ratings document from any reader
pub fn parse_ratings_reader<R: Read>(reader: R) -> Result<RatingStore> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse a ratings file from disk
pub fn parse_ratings_file(path: &Path) -> Result<RatingStore> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    parse_ratings_reader(BufReader::new(file))
}

impl<'de> Deserialize<'de> for RatingStore {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StoreVisitor)
    }
}

struct StoreVisitor;

impl<'de> Visitor<'de> for StoreVisitor {
    type Value = RatingStore;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from user name to a map of item ratings")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<RatingStore, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut store = RatingStore::new();

        while let Some(user_id) = map.next_key::<UserId>()? {
            if store.contains_user(&user_id) {
                return Err(de::Error::custom(format!("duplicate user '{}'", user_id)));
            }
            let ratings = map.next_value::<ItemRatings>()?;

            // Users with an empty map still exist; they just rated nothing
            store.insert_user(user_id.clone());
            for (item_id, rating) in ratings.0 {
                store
                    .insert_rating(user_id.clone(), item_id, rating)
                    .map_err(de::Error::custom)?;
            }
        }

        Ok(store)
    }
}

/// The `{ item: rating }` map of a single user, in document order
struct ItemRatings(Vec<(ItemId, f64)>);

impl<'de> Deserialize<'de> for ItemRatings {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ItemRatingsVisitor)
    }
}

struct ItemRatingsVisitor;

impl<'de> Visitor<'de> for ItemRatingsVisitor {
    type Value = ItemRatings;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from item name to a numeric rating")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<ItemRatings, A::Error>
    where
        A: MapAccess<'de>,
    {
        let capacity = map.size_hint().unwrap_or(0);
        let mut ratings: Vec<(ItemId, f64)> = Vec::with_capacity(capacity);
        let mut seen: HashSet<ItemId> = HashSet::with_capacity(capacity);
        while let Some(item_id) = map.next_key::<ItemId>()? {
            if !seen.insert(item_id.clone()) {
                return Err(de::Error::custom(format!("duplicate item '{}'", item_id)));
            }
            let rating = map.next_value::<f64>()?;
            ratings.push((item_id, rating));
        }
        Ok(ItemRatings(ratings))
    }
}
