//! Ordered, deduplicated, capped set of concepts chosen for revision

use crate::types::{Admission, AdmittedConcept, ConceptId};
use indexmap::IndexMap;

/// Concepts admitted so far, in admission order, never more than `cap`
///
/// Admission is idempotent per concept id: every stage can offer the same
/// concept again without creating duplicates.
#[derive(Debug, Clone)]
pub struct ReviewSet {
    cap: usize,
    concepts: IndexMap<ConceptId, Admission>,
}

impl ReviewSet {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            concepts: IndexMap::with_capacity(cap),
        }
    }

    /// Admit `concept` unless it is already present or the set is full
    ///
    /// Returns `true` if the concept was newly admitted.
    pub fn admit(&mut self, concept: ConceptId, admission: Admission) -> bool {
        if self.is_full() || self.concepts.contains_key(&concept) {
            return false;
        }
        self.concepts.insert(concept, admission);
        true
    }

    pub fn contains(&self, concept: &ConceptId) -> bool {
        self.concepts.contains_key(concept)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn is_full(&self) -> bool {
        self.concepts.len() >= self.cap
    }

    /// Whether the set holds fewer concepts than `fraction` of the cap
    pub fn is_below_fraction(&self, fraction: f64) -> bool {
        (self.concepts.len() as f64) < fraction * self.cap as f64
    }

    pub fn admission(&self, concept: &ConceptId) -> Option<Admission> {
        self.concepts.get(concept).copied()
    }

    /// Concept ids in admission order
    pub fn concept_ids(&self) -> Vec<ConceptId> {
        self.concepts.keys().copied().collect()
    }

    pub fn into_admitted(self) -> Vec<AdmittedConcept> {
        self.concepts
            .into_iter()
            .map(|(concept_id, admission)| AdmittedConcept {
                concept_id,
                admission,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_is_idempotent() {
        let mut set = ReviewSet::new(3);
        assert!(set.admit(ConceptId(1), Admission::Weak));
        assert!(!set.admit(ConceptId(1), Admission::Backfill));
        assert_eq!(set.len(), 1);
        // The first admission is kept
        assert_eq!(set.admission(&ConceptId(1)), Some(Admission::Weak));
    }

    #[test]
    fn test_admit_respects_cap() {
        let mut set = ReviewSet::new(2);
        assert!(set.admit(ConceptId(1), Admission::Weak));
        assert!(set.admit(ConceptId(2), Admission::Weak));
        assert!(set.is_full());
        assert!(!set.admit(ConceptId(3), Admission::Weak));
        assert_eq!(set.concept_ids(), vec![ConceptId(1), ConceptId(2)]);
    }

    #[test]
    fn test_zero_cap_is_always_full() {
        let mut set = ReviewSet::new(0);
        assert!(set.is_full());
        assert!(!set.admit(ConceptId(1), Admission::Backfill));
    }

    #[test]
    fn test_is_below_fraction() {
        let mut set = ReviewSet::new(5);
        set.admit(ConceptId(1), Admission::Weak);
        set.admit(ConceptId(2), Admission::Weak);
        // 2 < 2.5
        assert!(set.is_below_fraction(0.5));
        set.admit(ConceptId(3), Admission::Weak);
        // 3 >= 2.5, 3 >= 3.0
        assert!(!set.is_below_fraction(0.5));
        assert!(!set.is_below_fraction(0.6));
    }

    #[test]
    fn test_into_admitted_keeps_order() {
        let mut set = ReviewSet::new(3);
        set.admit(ConceptId(9), Admission::Weak);
        set.admit(ConceptId(4), Admission::Backfill);

        let admitted = set.into_admitted();
        assert_eq!(admitted[0].concept_id, ConceptId(9));
        assert_eq!(admitted[1].admission, Admission::Backfill);
    }
}
