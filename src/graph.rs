//! Bipartite concept/question index over the live curriculum
//!
//! Built once per request from the concept-question links of the live topics.
//! Both directions are kept sorted and deduplicated so lookups and the mapper's
//! random picks are reproducible for a given seed.

use crate::types::{ConceptId, ConceptQuestionLink, QuestionId, QuestionType};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ConceptQuestionGraph {
    by_concept: BTreeMap<ConceptId, Vec<QuestionId>>,
    by_question: BTreeMap<QuestionId, Vec<ConceptId>>,
    question_types: BTreeMap<QuestionId, QuestionType>,
}

impl ConceptQuestionGraph {
    pub fn from_links(links: &[ConceptQuestionLink]) -> Self {
        let mut graph = Self::default();
        for link in links {
            graph
                .by_concept
                .entry(link.concept_id)
                .or_default()
                .push(link.question_id);
            graph
                .by_question
                .entry(link.question_id)
                .or_default()
                .push(link.concept_id);
            graph
                .question_types
                .entry(link.question_id)
                .or_insert(link.question_type);
        }

        for questions in graph.by_concept.values_mut() {
            questions.sort();
            questions.dedup();
        }
        for concepts in graph.by_question.values_mut() {
            concepts.sort();
            concepts.dedup();
        }
        graph
    }

    /// Questions covering `concept`, ascending, empty if none
    pub fn questions_for(&self, concept: &ConceptId) -> &[QuestionId] {
        self.by_concept
            .get(concept)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Concepts covered by `question`, ascending, empty if unknown
    pub fn concepts_for(&self, question: &QuestionId) -> &[ConceptId] {
        self.by_question
            .get(question)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_concept(&self, concept: &ConceptId) -> bool {
        self.by_concept.contains_key(concept)
    }

    /// Every concept with at least one live question, ascending
    pub fn concepts(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.by_concept.keys().copied()
    }

    pub fn question_type(&self, question: &QuestionId) -> Option<QuestionType> {
        self.question_types.get(question).copied()
    }

    pub fn concept_count(&self) -> usize {
        self.by_concept.len()
    }

    pub fn question_count(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_concept.is_empty()
    }
}
