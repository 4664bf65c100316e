//! Concept selection pipeline
//!
//! Stages run strictly in sequence, each only while the review set is short of
//! its cap:
//! - **weak**: concepts whose latest signal is an unresolved incorrect answer
//! - **tiered**: concepts whose aggregate mastery falls under rising thresholds
//! - **backfill**: random live concepts to top the set up
//!
//! History for concepts that have no live question is ignored up front, so
//! every admitted concept can be mapped to a question.

pub mod backfill;
pub mod review_set;
pub mod tiered;
pub mod weak;

pub use backfill::backfill;
pub use review_set::ReviewSet;
pub use tiered::TieredThresholdSelector;
pub use weak::{identify_weak_concepts, order_history};

use crate::config::{BackfillPool, ReviewConfig};
use crate::graph::ConceptQuestionGraph;
use crate::random::RandomSource;
use crate::scoring::aggregate_scores;
use crate::types::{ConceptId, ConceptTrackingRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Per-stage admission counts for one selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub ignored_records: usize,
    pub weak: usize,
    pub tiered: usize,
    pub backfill: usize,
}

/// Choose up to `cap` concepts for revision
pub fn select_review_concepts<R: RandomSource>(
    records: &[ConceptTrackingRecord],
    graph: &ConceptQuestionGraph,
    config: &ReviewConfig,
    cap: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> (ReviewSet, StageCounts) {
    let mut counts = StageCounts::default();
    let mut review = ReviewSet::new(cap);

    let eligible: Vec<ConceptTrackingRecord> = records
        .iter()
        .filter(|r| graph.contains_concept(&r.concept_id))
        .cloned()
        .collect();
    counts.ignored_records = records.len() - eligible.len();
    if counts.ignored_records > 0 {
        debug!(
            "Ignoring {} tracking records for concepts without live questions",
            counts.ignored_records
        );
    }

    counts.weak = identify_weak_concepts(
        order_history(&eligible, config.history_order),
        &mut review,
    );

    if !review.is_full() {
        let scores = aggregate_scores(&eligible, &config.windows, now);
        counts.tiered =
            TieredThresholdSelector::new(&config.tiers, config.tier_order).run(&scores, &mut review);
    }

    if !review.is_full() {
        let attempted: HashSet<ConceptId> = match config.backfill_pool {
            BackfillPool::AllLiveConcepts => HashSet::new(),
            BackfillPool::UnattemptedOnly => eligible.iter().map(|r| r.concept_id).collect(),
        };
        let pool = graph
            .concepts()
            .filter(|concept| !attempted.contains(concept));
        counts.backfill = backfill(pool, &mut review, rng);
    }

    (review, counts)
}
