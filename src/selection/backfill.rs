//! Random top-up of the review set from the live curriculum
//!
//! Running out of candidates before the cap is reached is fine: the review
//! set simply stays short.

use super::review_set::ReviewSet;
use crate::random::RandomSource;
use crate::types::{Admission, ConceptId};
use tracing::debug;

/// Admit concepts from `pool` in random order until `review` is full
///
/// Concepts already under review are ignored. Returns the number admitted.
pub fn backfill<R: RandomSource>(
    pool: impl IntoIterator<Item = ConceptId>,
    review: &mut ReviewSet,
    rng: &mut R,
) -> usize {
    if review.is_full() {
        return 0;
    }

    let mut candidates: Vec<ConceptId> = pool
        .into_iter()
        .filter(|concept| !review.contains(concept))
        .collect();
    candidates.sort();
    candidates.dedup();
    rng.shuffle(&mut candidates);

    let pool_size = candidates.len();
    let mut admitted = 0;
    for concept in candidates {
        if review.is_full() {
            break;
        }
        if review.admit(concept, Admission::Backfill) {
            admitted += 1;
        }
    }

    debug!(
        "Backfill admitted {} of {} candidate concepts",
        admitted, pool_size
    );
    admitted
}
