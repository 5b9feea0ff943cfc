//! Example: List the users most similar to a given user
//!
//! Run with: cargo run --package similarity --example similar_users -- Anna
//!
//! This example shows how to:
//! 1. Load the ratings document
//! 2. Score one user against everyone else with both metrics
//! 3. Compare display ranking with selection ranking

use data_loader::RatingStore;
use similarity::{most_similar_users, select_neighbors, EuclideanScore, PearsonScore};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let store = RatingStore::load_from_file(Path::new("data/ratings.json"))?;

    let user = std::env::args()
        .nth(1)
        .or_else(|| store.user_ids().next().cloned())
        .ok_or_else(|| anyhow::anyhow!("The dataset has no users"))?;

    println!("=== Users similar to {} ===\n", user);

    let start = Instant::now();
    let pearson = most_similar_users(&store, &user, 5, &PearsonScore::default())?;
    println!("Pearson (signed, computed in {:?}):", start.elapsed());
    for neighbor in &pearson {
        println!("  {:<20} {:>6.2}", neighbor.user_id, neighbor.score);
    }

    let euclidean = most_similar_users(&store, &user, 5, &EuclideanScore::default())?;
    println!("\nEuclidean:");
    for neighbor in &euclidean {
        println!("  {:<20} {:>6.2}", neighbor.user_id, neighbor.score);
    }

    // The recommender uses magnitude ranking, which also picks up
    // strongly anti-correlated users
    let selected = select_neighbors(&store, &user, 5, &PearsonScore::default())?;
    println!("\nSelected as neighbors (by |score|):");
    for neighbor in &selected {
        println!("  {:<20} {:>6.2}", neighbor.user_id, neighbor.score);
    }

    Ok(())
}
