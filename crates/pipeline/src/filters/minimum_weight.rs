//! Filter on summed similarity magnitude.
//!
//! The gate is on raw |similarity|, not on centered ratings: it measures
//! confidence in the correlations behind an item, not rating intensity.

use crate::aggregator::ItemEvidence;
use crate::traits::Filter;

/// Drops items whose summed |neighbor weight| is below `min_weight_sum`.
pub struct MinimumWeightFilter {
    min_weight_sum: f64,
}

impl MinimumWeightFilter {
    pub fn new(min_weight_sum: f64) -> Self {
        Self { min_weight_sum }
    }
}

impl Filter for MinimumWeightFilter {
    fn name(&self) -> &str {
        "MinimumWeightFilter"
    }

    fn apply(&self, evidence: Vec<ItemEvidence>) -> Vec<ItemEvidence> {
        evidence
            .into_iter()
            .filter(|item| item.weight_sum >= self.min_weight_sum)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(item: &str, weighted_rating_sum: f64, weight_sum: f64) -> ItemEvidence {
        ItemEvidence {
            item_id: item.to_string(),
            weighted_rating_sum,
            weight_sum,
            supporting_users: 1,
        }
    }

    #[test]
    fn test_minimum_weight_filter() {
        let input = vec![
            // Strong centered rating, weak correlation
            evidence("Dune", 2.25, 0.5),
            evidence("Alien", 0.4, 1.0),
            evidence("Brazil", -3.0, 1.8),
        ];

        let filter = MinimumWeightFilter::new(1.0);
        let kept = filter.apply(input);

        let ids: Vec<&str> = kept.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["Alien", "Brazil"]);
    }
}
