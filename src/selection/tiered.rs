//! Tiered threshold admission by aggregate mastery
//!
//! Scored concepts not yet under review are admitted in passes with rising
//! thresholds (0.4, 0.5, 0.6 by default). Later passes only run while the
//! review set is still small relative to the cap. Each pass rescans the full
//! sorted list, and the review set ignores concepts it already holds.

use super::review_set::ReviewSet;
use crate::config::{TierConfig, TierOrder};
use crate::types::{Admission, ConceptId};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Threshold selector over aggregate mastery scores
pub struct TieredThresholdSelector<'a> {
    tiers: &'a [TierConfig],
    order: TierOrder,
}

impl<'a> TieredThresholdSelector<'a> {
    pub fn new(tiers: &'a [TierConfig], order: TierOrder) -> Self {
        Self { tiers, order }
    }

    /// Candidates in the order passes walk them
    ///
    /// Ties on score fall back to ascending concept id so the walk is
    /// deterministic.
    pub fn ranked(
        &self,
        scores: &BTreeMap<ConceptId, f64>,
        review: &ReviewSet,
    ) -> Vec<(ConceptId, f64)> {
        let mut ranked: Vec<(ConceptId, f64)> = scores
            .iter()
            .filter(|(concept, _)| !review.contains(concept))
            .map(|(concept, score)| (*concept, *score))
            .collect();

        ranked.sort_by(|a, b| {
            let by_score = match self.order {
                TierOrder::MasteryDescending => b.1.partial_cmp(&a.1),
                TierOrder::WeakestFirst => a.1.partial_cmp(&b.1),
            };
            by_score.unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0))
        });
        ranked
    }

    /// Run every pass against `review`, returning the number of concepts admitted
    pub fn run(&self, scores: &BTreeMap<ConceptId, f64>, review: &mut ReviewSet) -> usize {
        let ranked = self.ranked(scores, review);
        let mut admitted = 0;

        for (i, tier) in self.tiers.iter().enumerate() {
            let pass = i + 1;
            if review.is_full() {
                break;
            }
            if let Some(fraction) = tier.run_if_below_fraction {
                if !review.is_below_fraction(fraction) {
                    debug!(
                        "Skipping tier pass {}: {} of {} already selected",
                        pass,
                        review.len(),
                        review.cap()
                    );
                    continue;
                }
            }

            let before = admitted;
            for (concept, score) in &ranked {
                if review.is_full() {
                    break;
                }
                if *score < tier.threshold
                    && review.admit(*concept, Admission::Tier { pass, score: *score })
                {
                    admitted += 1;
                }
            }
            debug!(
                "Tier pass {} (< {:.2}) admitted {} concepts",
                pass,
                tier.threshold,
                admitted - before
            );
        }

        admitted
    }
}
