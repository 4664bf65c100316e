//! Recency aggregation of window scores into one mastery score per concept
//!
//! The aggregate is the unweighted mean of the windows that had data. Windows
//! without records are left out of the average instead of counting as zero.

use super::window::{TimeWindow, TimeWindowScorer, WindowScores};
use crate::types::{ConceptId, ConceptTrackingRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean of the defined window scores, `None` when no window has data
pub fn aggregate(scores: &WindowScores) -> Option<f64> {
    let (sum, count) = scores
        .defined()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));

    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Aggregate mastery for every attempted concept that has one
///
/// Concepts whose records all fall outside the configured windows are absent
/// from the map; they can only be reached through backfill.
pub fn aggregate_scores(
    records: &[ConceptTrackingRecord],
    windows: &[TimeWindow],
    now: DateTime<Utc>,
) -> BTreeMap<ConceptId, f64> {
    TimeWindowScorer::new(windows, now)
        .score_all(records)
        .into_iter()
        .filter_map(|(concept, scores)| aggregate(&scores).map(|score| (concept, score)))
        .collect()
}

/// Mastery summary for one concept, as shown to teachers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMastery {
    pub concept_id: ConceptId,
    pub attempts: usize,
    pub correct: usize,
    pub windows: WindowScores,
    pub aggregate: Option<f64>,
}

/// Mastery summary for every concept in `records`, ordered by concept id
pub fn mastery_report(
    records: &[ConceptTrackingRecord],
    windows: &[TimeWindow],
    now: DateTime<Utc>,
) -> Vec<ConceptMastery> {
    let mut counts: BTreeMap<ConceptId, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.concept_id).or_default();
        entry.0 += 1;
        if record.is_correct {
            entry.1 += 1;
        }
    }

    TimeWindowScorer::new(windows, now)
        .score_all(records)
        .into_iter()
        .map(|(concept_id, scores)| {
            let (attempts, correct) = counts.get(&concept_id).copied().unwrap_or_default();
            ConceptMastery {
                concept_id,
                attempts,
                correct,
                aggregate: aggregate(&scores),
                windows: scores,
            }
        })
        .collect()
}
