//! First pass over raw history: concepts with an unresolved incorrect signal
//!
//! Records are walked once. A correct record resolves its concept for the rest
//! of the walk; an incorrect record admits its concept unless it was already
//! resolved. Which records count as "earlier" is decided entirely by the order
//! the caller passes them in, see [`order_history`].

use super::review_set::ReviewSet;
use crate::config::HistoryOrder;
use crate::types::{Admission, ConceptId, ConceptTrackingRecord};
use std::collections::HashSet;
use tracing::debug;

/// Arrange history for the weak pass according to `order`
///
/// `NewestFirst` expects the store's ascending order and produces a stable
/// descending one: records sharing a timestamp keep reverse storage order, so
/// the later-stored record still counts as the more recent attempt.
pub fn order_history<'a>(
    records: &'a [ConceptTrackingRecord],
    order: HistoryOrder,
) -> Vec<&'a ConceptTrackingRecord> {
    match order {
        HistoryOrder::Stored => records.iter().collect(),
        HistoryOrder::NewestFirst => {
            let mut ordered: Vec<_> = records.iter().rev().collect();
            ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            ordered
        }
    }
}

/// Admit concepts whose first-seen record in `records` is incorrect
///
/// Returns the number of concepts admitted. Stops as soon as the review set
/// is full.
pub fn identify_weak_concepts<'a>(
    records: impl IntoIterator<Item = &'a ConceptTrackingRecord>,
    review: &mut ReviewSet,
) -> usize {
    let mut resolved: HashSet<ConceptId> = HashSet::new();
    let mut admitted = 0;

    for record in records {
        if review.is_full() {
            break;
        }

        if record.is_correct {
            resolved.insert(record.concept_id);
        } else if !resolved.contains(&record.concept_id)
            && review.admit(record.concept_id, Admission::Weak)
        {
            admitted += 1;
        }
    }

    debug!("Weak concept pass admitted {} concepts", admitted);
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityKind, ClassroomId, UserId};
    use chrono::{DateTime, Duration, Utc};

    fn record(concept: i64, is_correct: bool, at: DateTime<Utc>) -> ConceptTrackingRecord {
        ConceptTrackingRecord {
            concept_id: ConceptId(concept),
            user_id: UserId(1),
            classroom_id: ClassroomId(1),
            activity_kind: ActivityKind::new("revision"),
            is_correct,
            created_at: at,
        }
    }

    fn weak(records: &[ConceptTrackingRecord], order: HistoryOrder, cap: usize) -> Vec<ConceptId> {
        let mut review = ReviewSet::new(cap);
        identify_weak_concepts(order_history(records, order), &mut review);
        review.concept_ids()
    }

    #[test]
    fn test_later_correct_resolves_earlier_incorrect() {
        let t0 = Utc::now() - Duration::hours(2);
        let records = vec![record(1, false, t0), record(1, true, t0 + Duration::minutes(5))];

        assert!(weak(&records, HistoryOrder::NewestFirst, 5).is_empty());
    }

    #[test]
    fn test_trailing_incorrect_is_flagged() {
        let t0 = Utc::now() - Duration::hours(2);
        let records = vec![record(1, true, t0), record(1, false, t0 + Duration::minutes(5))];

        assert_eq!(weak(&records, HistoryOrder::NewestFirst, 5), vec![ConceptId(1)]);
    }

    #[test]
    fn test_stored_order_first_resolved_wins() {
        let t0 = Utc::now() - Duration::hours(2);
        // Scanned as given: the correct record comes first and suppresses the rest
        let records = vec![
            record(1, true, t0),
            record(1, false, t0 + Duration::minutes(1)),
            record(2, false, t0 + Duration::minutes(2)),
            record(2, true, t0 + Duration::minutes(3)),
        ];

        assert_eq!(weak(&records, HistoryOrder::Stored, 5), vec![ConceptId(2)]);
    }

    #[test]
    fn test_correct_only_concepts_never_flagged() {
        let now = Utc::now();
        let records = vec![record(1, true, now), record(1, true, now), record(2, true, now)];
        assert!(weak(&records, HistoryOrder::NewestFirst, 5).is_empty());
    }

    #[test]
    fn test_repeated_incorrect_admitted_once() {
        let t0 = Utc::now() - Duration::hours(1);
        let records = vec![
            record(3, false, t0),
            record(3, false, t0 + Duration::minutes(1)),
            record(3, false, t0 + Duration::minutes(2)),
        ];

        let mut review = ReviewSet::new(5);
        let admitted = identify_weak_concepts(
            order_history(&records, HistoryOrder::NewestFirst),
            &mut review,
        );
        assert_eq!(admitted, 1);
        assert_eq!(review.concept_ids(), vec![ConceptId(3)]);
    }

    #[test]
    fn test_stops_at_cap() {
        let t0 = Utc::now() - Duration::hours(1);
        let records: Vec<_> = (1..=6)
            .map(|c| record(c, false, t0 + Duration::minutes(c)))
            .collect();

        let flagged = weak(&records, HistoryOrder::NewestFirst, 3);
        // Newest first: concepts 6, 5, 4
        assert_eq!(flagged, vec![ConceptId(6), ConceptId(5), ConceptId(4)]);
    }

    #[test]
    fn test_newest_first_tie_prefers_later_stored_record() {
        let at = Utc::now();
        let records = vec![record(1, false, at), record(1, true, at)];

        let ordered = order_history(&records, HistoryOrder::NewestFirst);
        assert!(ordered[0].is_correct);
        assert!(weak(&records, HistoryOrder::NewestFirst, 5).is_empty());
    }

    #[test]
    fn test_order_history_sorts_unordered_store_output() {
        let now = Utc::now();
        let records = vec![
            record(1, false, now - Duration::days(2)),
            record(2, false, now),
            record(3, false, now - Duration::days(5)),
        ];

        let ordered: Vec<_> = order_history(&records, HistoryOrder::NewestFirst)
            .iter()
            .map(|r| r.concept_id)
            .collect();
        assert_eq!(ordered, vec![ConceptId(2), ConceptId(1), ConceptId(3)]);
    }
}
