use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::UserId;
use engine::{RecommendationEngine, UserReport};
use pipeline::{RecommendConfig, RecommendationRow};
use rand::seq::IndexedRandom;
use similarity::{MetricKind, NeighborSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from similar (and opposite) viewers", long_about = None)]
struct Cli {
    /// Path to the ratings JSON document
    #[arg(short, long, default_value = "data/ratings.json")]
    data: PathBuf,

    /// Optional JSON file overriding recommender defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the users most similar to a user
    Similar {
        #[arg(long)]
        user: UserId,

        /// Similarity metric: pearson or euclidean
        #[arg(long, default_value = "pearson")]
        metric: MetricKind,

        /// How many users to show
        #[arg(long, default_value = "8")]
        count: usize,

        /// Shared items required before two users are compared
        #[arg(long)]
        min_common: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Get movie recommendations for a user
    Recommend {
        #[arg(long)]
        user: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Minimum number of neighbors behind each recommendation
        #[arg(long)]
        min_support: Option<usize>,

        /// Number of neighbors to aggregate over
        #[arg(long)]
        neighbors: Option<usize>,

        /// Show the neighbors used and the evidence behind each score
        #[arg(long)]
        explain: bool,

        /// List the movies the user is predicted to like least instead
        #[arg(long)]
        worst: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Similar users, recommendations and anti-recommendations for a user
    Report {
        #[arg(long)]
        user: UserId,

        /// Length of each list
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Similarity score between two users
    Score {
        #[arg(long)]
        user_a: UserId,

        #[arg(long)]
        user_b: UserId,

        /// Similarity metric: pearson or euclidean
        #[arg(long, default_value = "pearson")]
        metric: MetricKind,

        /// Shared items required before two users are compared
        #[arg(long)]
        min_common: Option<usize>,
    },

    /// Show a user's ratings
    User {
        #[arg(long)]
        user: UserId,
    },

    /// Time recommendations for randomly chosen users
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with results on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RecommendConfig::from_json_file(path)?,
        None => RecommendConfig::default(),
    };
    info!("Recommender config: {:?}", config);

    let start = Instant::now();
    let engine = RecommendationEngine::load(&cli.data, config)
        .context("Failed to load the ratings dataset")?;
    let summary = engine.store().summary();
    eprintln!(
        "{} Loaded {} users, {} movies, {} ratings from {} in {:?}",
        "✓".green(),
        summary.user_count,
        summary.item_count,
        summary.rating_count,
        cli.data.display(),
        start.elapsed()
    );

    match cli.command {
        Commands::Similar {
            user,
            metric,
            count,
            min_common,
            json,
        } => handle_similar(&engine, &user, metric, count, min_common, json)?,
        Commands::Recommend {
            user,
            limit,
            min_support,
            neighbors,
            explain,
            worst,
            json,
        } => {
            let mut config = engine.config().clone();
            if let Some(min) = min_support {
                config = config.with_min_supporting_users(min);
            }
            if let Some(count) = neighbors {
                config = config.with_neighbor_count(count);
            }
            let engine = engine.with_config(config);
            handle_recommend(&engine, &user, limit, explain, worst, json)?
        }
        Commands::Report { user, limit, json } => handle_report(&engine, &user, limit, json)?,
        Commands::Score {
            user_a,
            user_b,
            metric,
            min_common,
        } => handle_score(&engine, &user_a, &user_b, metric, min_common)?,
        Commands::User { user } => handle_user(&engine, &user)?,
        Commands::Benchmark { requests } => handle_benchmark(&engine, requests)?,
    }

    Ok(())
}

/// A `--min-common` flag wins over the configured threshold
fn resolve_min_common(flag: Option<usize>, config: &RecommendConfig) -> usize {
    flag.unwrap_or(config.min_common_ratings)
}

/// Handle the 'similar' command
fn handle_similar(
    engine: &RecommendationEngine,
    user: &str,
    metric: MetricKind,
    count: usize,
    min_common: Option<usize>,
    json: bool,
) -> Result<()> {
    let min_common = resolve_min_common(min_common, engine.config());
    let metric = metric.build(min_common);
    let similar = engine.similar_users(user, count, metric.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Users similar to {} ({}):", user, metric.name()).bold().blue()
    );
    print_neighbors(&similar);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    user: &str,
    limit: usize,
    explain: bool,
    worst: bool,
    json: bool,
) -> Result<()> {
    let rows = if worst {
        engine.anti_recommend(user, limit)?
    } else {
        engine.recommend(user, limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if explain {
        let neighbors = engine.neighbors(user)?;
        println!(
            "{}",
            format!("Neighbors used for {} (by |correlation|):", user).bold().blue()
        );
        print_neighbors(&neighbors);
        println!();
    }

    let title = if worst {
        format!("{}, we do NOT recommend:", user)
    } else {
        format!("{}, we recommend:", user)
    };
    println!("{}", title.bold().blue());
    print_rows(&rows, explain);
    Ok(())
}

/// Handle the 'report' command
fn handle_report(engine: &RecommendationEngine, user: &str, limit: usize, json: bool) -> Result<()> {
    let report = engine.report(user, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

/// Handle the 'score' command
fn handle_score(
    engine: &RecommendationEngine,
    user_a: &str,
    user_b: &str,
    metric: MetricKind,
    min_common: Option<usize>,
) -> Result<()> {
    let min_common = resolve_min_common(min_common, engine.config());
    let metric = metric.build(min_common);
    let score = engine.score(user_a, user_b, metric.as_ref())?;

    let common = match (
        engine.store().get_user_ratings(user_a),
        engine.store().get_user_ratings(user_b),
    ) {
        (Some(a), Some(b)) => similarity::common_ratings(a, b).len(),
        _ => 0,
    };

    println!(
        "{} score between {} and {}: {}",
        metric.name(),
        user_a.bold(),
        user_b.bold(),
        format!("{:.4}", score).green()
    );
    println!("{}Movies rated by both: {}", "• ".cyan(), common);
    if common < min_common {
        println!(
            "{}Fewer than {} shared movies, so there is no signal",
            "• ".yellow(),
            min_common
        );
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(engine: &RecommendationEngine, user: &str) -> Result<()> {
    let ratings = engine.store().require_user(user)?;

    println!("{}", format!("User: {}", user).bold().blue());
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    match ratings.mean() {
        Some(avg) => println!("{}Average rating: {:.2}", "• ".cyan(), avg),
        None => println!("{}Average rating: -", "• ".cyan()),
    }

    let mut rated: Vec<(&String, f64)> = ratings.iter().collect();
    rated.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("Ratings, highest first:");
    for (item, rating) in rated {
        println!("  - {} ({})", item, rating);
    }
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(engine: &RecommendationEngine, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    let users: Vec<UserId> = engine.store().user_ids().cloned().collect();
    if users.is_empty() {
        bail!("The dataset has no users to benchmark with");
    }

    let mut rng = rand::rng();
    let sample: Vec<UserId> = (0..requests)
        .filter_map(|_| users.choose(&mut rng).cloned())
        .collect();

    // One query at a time, timing each
    let mut timings: Vec<Duration> = Vec::with_capacity(sample.len());
    let total_start = Instant::now();
    for user in &sample {
        let start = Instant::now();
        engine.recommend(user, 10)?;
        timings.push(start.elapsed());
    }
    let total_time = total_start.elapsed();

    // The same sample spread over the thread pool
    let batch_start = Instant::now();
    let batch = engine.recommend_many(&sample, 10);
    let batch_time = batch_start.elapsed();
    let failed = batch.iter().filter(|r| r.is_err()).count();

    timings.sort();
    let avg_latency = total_time / timings.len() as u32;
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f64 * 0.95) as usize];
    let p99 = timings[(timings.len() as f64 * 0.99) as usize];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", sample.len());
    println!("Total time (sequential): {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!(
        "Throughput (sequential): {:.2} requests/second",
        sample.len() as f64 / total_time.as_secs_f64()
    );
    println!(
        "Throughput (parallel batch): {:.2} requests/second in {:?}",
        sample.len() as f64 / batch_time.as_secs_f64(),
        batch_time
    );
    if failed > 0 {
        println!("{} {} batch queries failed", "!".red(), failed);
    }

    Ok(())
}

fn print_neighbors(neighbors: &NeighborSet) {
    if neighbors.is_empty() {
        println!("  (no other users)");
    }
    for (rank, neighbor) in neighbors.iter().enumerate() {
        let score = format!("{:>7.3}", neighbor.score);
        let score = if neighbor.score < 0.0 { score.red() } else { score.green() };
        println!("{:>3}. {:<24} {}", rank + 1, neighbor.user_id, score);
    }
}

/// Format recommendation rows, with the evidence columns when `explain` is set
fn print_rows(rows: &[RecommendationRow], explain: bool) {
    if rows.is_empty() {
        println!("  (not enough evidence for any movie)");
    }
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "{}. \"{}\" - Score: {:.2}",
            (rank + 1).to_string().green(),
            row.item_id,
            row.predicted_score
        );
        if explain {
            println!(
                "   {} neighbors, weight sum {:.3}, weighted rating sum {:.3}",
                row.supporting_users, row.weight_sum, row.weighted_rating_sum
            );
        }
    }
}

fn print_report(report: &UserReport) {
    println!("{}", format!("Users similar to {}:", report.user_id).bold().blue());
    print_neighbors(&report.similar_users);
    println!();

    println!("{}", format!("{}, we recommend:", report.user_id).bold().blue());
    print_rows(&report.recommendations, false);
    println!();

    println!("{}", format!("{}, we do NOT recommend:", report.user_id).bold().blue());
    print_rows(&report.anti_recommendations, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_common_falls_back_to_config() {
        let config = RecommendConfig::default().with_min_common_ratings(5);
        assert_eq!(resolve_min_common(None, &config), 5);
        assert_eq!(resolve_min_common(Some(3), &config), 3);
    }

    #[test]
    fn test_score_command_parses() {
        let cli = Cli::try_parse_from([
            "reel-recs", "--config", "tuned.json", "score", "--user-a", "Anna", "--user-b", "Ewa",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("tuned.json")));
        match cli.command {
            Commands::Score { min_common, metric, .. } => {
                assert_eq!(min_common, None);
                assert_eq!(metric, MetricKind::Pearson);
            }
            _ => panic!("expected the score command"),
        }
    }
}
