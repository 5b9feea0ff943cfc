use data_loader::RatingStore;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/ratings.json");

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let store = RatingStore::load_from_file(path)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let summary = store.summary();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", summary.user_count);
    println!("Items: {}", summary.item_count);
    println!("Ratings: {}", summary.rating_count);
    println!("Density: {:.3}", summary.density());
    if let (Some(min), Some(max)) = (summary.min_rating, summary.max_rating) {
        println!("Rating range: {} - {}", min, max);
    }
}
