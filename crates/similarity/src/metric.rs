//! Pairwise similarity between two users.
//!
//! Both metrics only look at the items the two users have in common:
//! - **Euclidean**: `1 / (1 + sqrt(sum of squared differences))`, range (0, 1]
//! - **Pearson**: correlation of the two rating vectors, range [-1, 1]
//!
//! A pair with fewer than `min_common_ratings` shared items scores 0.0.
//! That is the "no signal" answer, not an error: sparse data is expected and
//! callers rank by score without special-casing cold-start pairs. Only a user
//! missing from the store is an error.

use data_loader::{RatingStore, UnknownUserError, UserRatings};
use std::fmt;
use std::str::FromStr;

/// Default number of shared items required before two users are compared
pub const DEFAULT_MIN_COMMON_RATINGS: usize = 2;

/// Scores how alike two users are.
///
/// `Send + Sync` so a boxed metric can be shared by concurrent queries.
pub trait SimilarityMetric: Send + Sync {
    /// Returns the name of this metric (for logging/debugging)
    fn name(&self) -> &str;

    /// Similarity of `user_a` to `user_b`.
    ///
    /// # Returns
    /// * `Ok(score)` - never NaN; 0.0 when there is not enough overlap
    /// * `Err(UnknownUserError)` - either user is absent from the store
    fn score(
        &self,
        store: &RatingStore,
        user_a: &str,
        user_b: &str,
    ) -> Result<f64, UnknownUserError>;
}

/// Distance-based similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuclideanScore {
    pub min_common_ratings: usize,
}

impl EuclideanScore {
    pub fn new(min_common_ratings: usize) -> Self {
        Self { min_common_ratings }
    }
}

impl Default for EuclideanScore {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COMMON_RATINGS)
    }
}

impl SimilarityMetric for EuclideanScore {
    fn name(&self) -> &str {
        "euclidean"
    }

    fn score(
        &self,
        store: &RatingStore,
        user_a: &str,
        user_b: &str,
    ) -> Result<f64, UnknownUserError> {
        euclidean_score(store, user_a, user_b, self.min_common_ratings)
    }
}

/// Correlation-based similarity (the default strategy)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearsonScore {
    pub min_common_ratings: usize,
}

impl PearsonScore {
    pub fn new(min_common_ratings: usize) -> Self {
        Self { min_common_ratings }
    }
}

impl Default for PearsonScore {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COMMON_RATINGS)
    }
}

impl SimilarityMetric for PearsonScore {
    fn name(&self) -> &str {
        "pearson"
    }

    fn score(
        &self,
        store: &RatingStore,
        user_a: &str,
        user_b: &str,
    ) -> Result<f64, UnknownUserError> {
        pearson_score(store, user_a, user_b, self.min_common_ratings)
    }
}

/// Which metric to build, e.g. from a command-line flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricKind {
    Euclidean,
    #[default]
    Pearson,
}

impl MetricKind {
    /// Build the metric with the given overlap threshold
    pub fn build(self, min_common_ratings: usize) -> Box<dyn SimilarityMetric> {
        match self {
            MetricKind::Euclidean => Box::new(EuclideanScore::new(min_common_ratings)),
            MetricKind::Pearson => Box::new(PearsonScore::new(min_common_ratings)),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Euclidean => f.write_str("euclidean"),
            MetricKind::Pearson => f.write_str("pearson"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "distance" => Ok(MetricKind::Euclidean),
            "pearson" | "correlation" => Ok(MetricKind::Pearson),
            other => Err(format!(
                "unknown metric '{}' (expected 'pearson' or 'euclidean')",
                other
            )),
        }
    }
}

/// Euclidean distance score between two users
pub fn euclidean_score(
    store: &RatingStore,
    user_a: &str,
    user_b: &str,
    min_common_ratings: usize,
) -> Result<f64, UnknownUserError> {
    let (a, b) = lookup_pair(store, user_a, user_b)?;

    let common = common_ratings(a, b);
    if common.is_empty() || common.len() < min_common_ratings {
        return Ok(0.0);
    }

    let squared_diff: f64 = common.iter().map(|(x, y)| (x - y).powi(2)).sum();
    Ok(1.0 / (1.0 + squared_diff.sqrt()))
}

/// Pearson correlation score between two users
pub fn pearson_score(
    store: &RatingStore,
    user_a: &str,
    user_b: &str,
    min_common_ratings: usize,
) -> Result<f64, UnknownUserError> {
    let (a, b) = lookup_pair(store, user_a, user_b)?;

    let common = common_ratings(a, b);
    let n = common.len();
    if n == 0 || n < min_common_ratings {
        return Ok(0.0);
    }
    let n = n as f64;

    // Correlation ignores scale, so bring each side near 1.0 before
    // squaring; huge finite ratings would otherwise overflow the sums
    let scale_a = power_of_two_scale(common.iter().map(|(x, _)| x.abs()));
    let scale_b = power_of_two_scale(common.iter().map(|(_, y)| y.abs()));
    let common: Vec<(f64, f64)> = common
        .iter()
        .map(|(x, y)| (x / scale_a, y / scale_b))
        .collect();

    let sum_a: f64 = common.iter().map(|(x, _)| x).sum();
    let sum_b: f64 = common.iter().map(|(_, y)| y).sum();
    let sum_a2: f64 = common.iter().map(|(x, _)| x * x).sum();
    let sum_b2: f64 = common.iter().map(|(_, y)| y * y).sum();
    let sum_ab: f64 = common.iter().map(|(x, y)| x * y).sum();

    let sxy = sum_ab - sum_a * sum_b / n;
    let sxx = sum_a2 - sum_a * sum_a / n;
    let syy = sum_b2 - sum_b * sum_b / n;

    // Constant ratings on the common set; rounding can also leave a tiny
    // negative product, which is just as degenerate
    let denominator = sxx * syy;
    if !(denominator > 0.0 && denominator.is_finite()) {
        return Ok(0.0);
    }

    let score = sxy / denominator.sqrt();
    if !score.is_finite() {
        return Ok(0.0);
    }
    Ok(score.clamp(-1.0, 1.0))
}

/// Power of two close to the largest magnitude, 1.0 for zero or subnormal
/// input. Dividing by a power of two is exact, so ordinary ratings give
/// bit-identical sums after scaling.
fn power_of_two_scale(magnitudes: impl Iterator<Item = f64>) -> f64 {
    let max = magnitudes.fold(0.0_f64, f64::max);
    if !max.is_normal() {
        return 1.0;
    }
    2.0_f64.powi(max.log2().floor() as i32)
}

/// Both users, the first missing one reported as the error
fn lookup_pair<'a>(
    store: &'a RatingStore,
    user_a: &str,
    user_b: &str,
) -> Result<(&'a UserRatings, &'a UserRatings), UnknownUserError> {
    Ok((store.require_user(user_a)?, store.require_user(user_b)?))
}

/// `(rating_a, rating_b)` for every item both users rated, in item order
pub fn common_ratings(a: &UserRatings, b: &UserRatings) -> Vec<(f64, f64)> {
    // Walk the smaller map and probe the larger one
    let (small, large, swapped) = if a.len() <= b.len() {
        (a, b, false)
    } else {
        (b, a, true)
    };

    small
        .iter()
        .filter_map(|(item, r_small)| {
            let r_large = large.get(item)?;
            Some(if swapped {
                (r_large, r_small)
            } else {
                (r_small, r_large)
            })
        })
        .collect()
}
