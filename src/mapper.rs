//! Turns the final concept review set into a question list
//!
//! One question is drawn per uncovered concept. A drawn question covers every
//! concept it links to, so a multi-concept question satisfies several review
//! concepts at once and later concepts it covers are skipped. Concepts without
//! any live question are reported back instead of failing the request.

use crate::graph::ConceptQuestionGraph;
use crate::random::RandomSource;
use crate::types::{ConceptId, QuestionId};
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Questions chosen for a review set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedQuestions {
    /// Unique question ids, shuffled when requested
    pub questions: Vec<QuestionId>,

    /// Concepts dropped because no live question covers them
    pub unmapped: Vec<ConceptId>,
}

/// Map `concepts`, in selection order, onto questions from `graph`
pub fn map_concepts_to_questions<R: RandomSource>(
    concepts: &[ConceptId],
    graph: &ConceptQuestionGraph,
    shuffle: bool,
    rng: &mut R,
) -> MappedQuestions {
    let mut covered: HashSet<ConceptId> = HashSet::new();
    let mut questions: IndexSet<QuestionId> = IndexSet::new();
    let mut unmapped = Vec::new();

    for concept in concepts {
        if covered.contains(concept) {
            continue;
        }

        let Some(question) = rng.pick(graph.questions_for(concept)).copied() else {
            warn!("Concept {} has no live question, dropping it", concept);
            unmapped.push(*concept);
            continue;
        };

        covered.extend(graph.concepts_for(&question).iter().copied());
        questions.insert(question);
    }

    let mut questions: Vec<QuestionId> = questions.into_iter().collect();
    if shuffle {
        rng.shuffle(&mut questions);
    }

    debug!(
        "Mapped {} concepts onto {} questions ({} unmapped)",
        concepts.len(),
        questions.len(),
        unmapped.len()
    );

    MappedQuestions {
        questions,
        unmapped,
    }
}
