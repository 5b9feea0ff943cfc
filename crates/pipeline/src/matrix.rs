//! Sparse neighbor x candidate-item rating matrix.
//!
//! Rows are the selected neighbors, each carrying its similarity weight
//! (the dense weight vector). Columns are candidate items: every item some
//! neighbor rated, minus the items the target already rated. Cells are stored
//! per column as `(row, rating)` pairs, which is the access pattern of the
//! aggregator.
//!
//! ## Cleanup
//! After construction, columns nobody rated and rows that rated no candidate
//! are dropped. Neither carries information; dropping them only keeps the
//! O(neighbors x items) walk tight and makes the counts observable.

use crate::context::QueryContext;
use data_loader::{ItemId, RatingStore, UserId, UserRatings};
use std::collections::BTreeSet;
use tracing::debug;

/// One neighbor row and its similarity weight
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRow {
    pub user_id: UserId,
    pub weight: f64,
}

/// How much the cleanup pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub empty_items: usize,
    pub empty_neighbors: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateMatrix {
    items: Vec<ItemId>,
    neighbors: Vec<NeighborRow>,
    /// `columns[c]` holds `(row, rating)` for each neighbor that rated `items[c]`
    columns: Vec<Vec<(usize, f64)>>,
    cleanup: CleanupStats,
}

impl CandidateMatrix {
    /// Build the matrix for a query and run the cleanup pass.
    ///
    /// ## Algorithm
    /// 1. Resolve each selected neighbor's ratings in the store
    /// 2. Candidate items = union of their items minus the target's items,
    ///    in item-id order
    /// 3. Fill each column with the neighbors that rated it
    /// 4. Drop empty columns, then empty rows
    pub fn build(store: &RatingStore, context: &QueryContext) -> Self {
        let rows: Vec<(NeighborRow, &UserRatings)> = context
            .neighbors
            .iter()
            .filter_map(|neighbor| {
                store.get_user_ratings(&neighbor.user_id).map(|ratings| {
                    let row = NeighborRow {
                        user_id: neighbor.user_id.clone(),
                        weight: neighbor.score,
                    };
                    (row, ratings)
                })
            })
            .collect();

        let candidates: BTreeSet<&ItemId> = rows
            .iter()
            .flat_map(|(_, ratings)| ratings.items())
            .filter(|item| !context.rated_items.contains(*item))
            .collect();

        let items: Vec<ItemId> = candidates.into_iter().cloned().collect();
        let columns = items
            .iter()
            .map(|item| {
                rows.iter()
                    .enumerate()
                    .filter_map(|(row, (_, ratings))| ratings.get(item).map(|r| (row, r)))
                    .collect()
            })
            .collect();

        let mut matrix = Self {
            items,
            neighbors: rows.into_iter().map(|(row, _)| row).collect(),
            columns,
            cleanup: CleanupStats::default(),
        };
        matrix.cleanup = matrix.drop_empty();

        debug!(
            user = %context.user_id,
            items = matrix.items.len(),
            neighbors = matrix.neighbors.len(),
            empty_items = matrix.cleanup.empty_items,
            empty_neighbors = matrix.cleanup.empty_neighbors,
            "Built candidate matrix"
        );

        matrix
    }

    /// Drop all-empty columns first, then rows left without any cell
    fn drop_empty(&mut self) -> CleanupStats {
        let empty_items = self.drop_empty_items();
        let empty_neighbors = self.drop_empty_neighbors();
        CleanupStats {
            empty_items,
            empty_neighbors,
        }
    }

    fn drop_empty_items(&mut self) -> usize {
        let before = self.items.len();
        let (items, columns): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .zip(std::mem::take(&mut self.columns))
            .filter(|(_, column)| !column.is_empty())
            .unzip();
        self.items = items;
        self.columns = columns;
        before - self.items.len()
    }

    fn drop_empty_neighbors(&mut self) -> usize {
        let mut used = vec![false; self.neighbors.len()];
        for (row, _) in self.columns.iter().flatten() {
            used[*row] = true;
        }

        // Old row index -> new row index for the rows that survive
        let mut remap = vec![None; self.neighbors.len()];
        let mut kept = Vec::with_capacity(self.neighbors.len());
        for (old, neighbor) in std::mem::take(&mut self.neighbors).into_iter().enumerate() {
            if used[old] {
                remap[old] = Some(kept.len());
                kept.push(neighbor);
            }
        }
        let dropped = used.len() - kept.len();
        self.neighbors = kept;

        for column in &mut self.columns {
            for cell in column.iter_mut() {
                if let Some(new) = remap[cell.0] {
                    cell.0 = new;
                }
            }
        }
        dropped
    }

    /// Candidate items, in column order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Neighbor rows with their weights, in row order
    pub fn neighbors(&self) -> &[NeighborRow] {
        &self.neighbors
    }

    /// Ratings in column `index` with the neighbor that gave each
    pub fn column(&self, index: usize) -> impl Iterator<Item = (&NeighborRow, f64)> {
        self.columns
            .get(index)
            .into_iter()
            .flatten()
            .map(|&(row, rating)| (&self.neighbors[row], rating))
    }

    pub fn cleanup_stats(&self) -> CleanupStats {
        self.cleanup
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of stored (neighbor, item) ratings
    pub fn cell_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similarity::{NeighborSet, SimilarityScore};

    fn create_test_store() -> RatingStore {
        let mut store = RatingStore::new();
        store.insert_rating("Target", "Alien", 8.0).unwrap();
        store.insert_rating("Target", "Brazil", 3.0).unwrap();
        store.insert_rating("Ola", "Alien", 7.0).unwrap();
        store.insert_rating("Ola", "Casablanca", 9.0).unwrap();
        store.insert_rating("Piotr", "Brazil", 4.0).unwrap();
        store.insert_rating("Piotr", "Dune", 2.0).unwrap();
        store.insert_rating("Piotr", "Casablanca", 6.0).unwrap();
        // Rated nothing the target has not already seen
        store.insert_rating("Seen", "Alien", 5.0).unwrap();
        store
    }

    fn context_with(neighbors: &[(&str, f64)]) -> QueryContext {
        let mut context = QueryContext::new("Target");
        context.rated_items.insert("Alien".to_string());
        context.rated_items.insert("Brazil".to_string());
        context.neighbors = NeighborSet::new(
            neighbors
                .iter()
                .map(|(user, score)| SimilarityScore::new(*user, *score))
                .collect(),
        );
        context
    }

    #[test]
    fn test_candidates_exclude_rated_items() {
        let store = create_test_store();
        let context = context_with(&[("Ola", 0.9), ("Piotr", -0.6)]);
        let matrix = CandidateMatrix::build(&store, &context);

        assert_eq!(matrix.items(), &["Casablanca".to_string(), "Dune".to_string()]);
        assert_eq!(matrix.neighbors().len(), 2);
        assert_eq!(matrix.cell_count(), 3);
    }

    #[test]
    fn test_column_carries_weights() {
        let store = create_test_store();
        let context = context_with(&[("Ola", 0.9), ("Piotr", -0.6)]);
        let matrix = CandidateMatrix::build(&store, &context);

        let casablanca: Vec<(String, f64, f64)> = matrix
            .column(0)
            .map(|(n, r)| (n.user_id.clone(), n.weight, r))
            .collect();
        assert_eq!(
            casablanca,
            vec![("Ola".to_string(), 0.9, 9.0), ("Piotr".to_string(), -0.6, 6.0)]
        );
        assert_eq!(matrix.column(7).count(), 0);
    }

    #[test]
    fn test_neighbor_without_candidates_is_dropped() {
        let store = create_test_store();
        let context = context_with(&[("Seen", 1.0), ("Piotr", 0.5)]);
        let matrix = CandidateMatrix::build(&store, &context);

        assert_eq!(matrix.neighbors().len(), 1);
        assert_eq!(matrix.neighbors()[0].user_id, "Piotr");
        assert_eq!(
            matrix.cleanup_stats(),
            CleanupStats {
                empty_items: 0,
                empty_neighbors: 1
            }
        );
        // Row indices were remapped after the drop
        assert!(matrix.column(0).all(|(n, _)| n.user_id == "Piotr"));
    }

    #[test]
    fn test_empty_columns_are_dropped() {
        let mut matrix = CandidateMatrix {
            items: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            neighbors: vec![
                NeighborRow {
                    user_id: "n0".to_string(),
                    weight: 0.3,
                },
                NeighborRow {
                    user_id: "n1".to_string(),
                    weight: 0.7,
                },
            ],
            columns: vec![vec![(1, 4.0)], vec![], vec![(1, 6.0)]],
            cleanup: CleanupStats::default(),
        };

        let stats = matrix.drop_empty();

        assert_eq!(stats.empty_items, 1);
        assert_eq!(stats.empty_neighbors, 1);
        assert_eq!(matrix.items(), &["A".to_string(), "C".to_string()]);
        assert_eq!(matrix.column(1).next().map(|(n, r)| (n.weight, r)), Some((0.7, 6.0)));
    }

    #[test]
    fn test_no_neighbors() {
        let store = create_test_store();
        let context = context_with(&[]);
        let matrix = CandidateMatrix::build(&store, &context);

        assert!(matrix.is_empty());
        assert_eq!(matrix.cell_count(), 0);
    }
}
