//! Core data types for the concept review engine
//!
//! This module defines the identifiers and records the selection pipeline works
//! with: tracking records (one correct/incorrect observation per answered
//! question-concept pair), curriculum concepts, concept-question links, and the
//! final selection result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a curriculum concept
    ConceptId
);
id_type!(
    /// Identifier of a question (opaque to the engine)
    QuestionId
);
id_type!(
    /// Identifier of a curriculum topic
    TopicId
);
id_type!(
    /// Identifier of a student
    UserId
);
id_type!(
    /// Identifier of a classroom
    ClassroomId
);

/// The kind of activity a tracking record was produced by, e.g. `revision`
///
/// Tracking history is always read per activity kind; records from other
/// kinds never influence a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityKind(String);

impl ActivityKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timestamped correct/incorrect observation of a user's performance on a concept
///
/// Created by the answer-checking subsystem after every submitted answer and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptTrackingRecord {
    pub concept_id: ConceptId,
    pub user_id: UserId,
    pub classroom_id: ClassroomId,
    pub activity_kind: ActivityKind,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

/// An atomic curriculum learning objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    pub text: String,
    pub answer_text: String,
}

/// Question type tag; the engine carries it through but never inspects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Matching,
    Ordering,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Matching => "matching",
            QuestionType::Ordering => "ordering",
        }
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "matching" => Ok(QuestionType::Matching),
            "ordering" => Ok(QuestionType::Ordering),
            other => Err(format!("unknown question type: {}", other)),
        }
    }
}

/// A question covering a concept
///
/// Many concepts can map to one question and many questions can cover one concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptQuestionLink {
    pub question_id: QuestionId,
    pub concept_id: ConceptId,
    pub question_type: QuestionType,
}

/// How a concept made it into the review set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum Admission {
    /// Has an incorrect record not preceded by a correct one
    Weak,

    /// Aggregate mastery fell below the threshold of tier pass `pass` (1-based)
    Tier { pass: usize, score: f64 },

    /// Drawn at random from the live curriculum to fill the review set
    Backfill,
}

/// A concept admitted to the review set together with its provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdmittedConcept {
    pub concept_id: ConceptId,
    pub admission: Admission,
}

/// The outcome of one revision request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Unique question ids, in presentation order
    pub questions: Vec<QuestionId>,

    /// Admitted concepts in admission order (never more than the cap)
    pub admitted: Vec<AdmittedConcept>,

    /// Admitted concepts for which no live question exists
    pub unmapped: Vec<ConceptId>,
}

impl SelectionResult {
    /// Admitted concept ids in admission order
    pub fn concept_ids(&self) -> Vec<ConceptId> {
        self.admitted.iter().map(|a| a.concept_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_round_trips_through_str() {
        for qt in [
            QuestionType::MultipleChoice,
            QuestionType::Matching,
            QuestionType::Ordering,
        ] {
            assert_eq!(qt.as_str().parse::<QuestionType>().unwrap(), qt);
        }
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&ConceptId(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(ConceptId(7).to_string(), "7");
    }

    #[test]
    fn test_admission_serialization_is_tagged() {
        let json = serde_json::to_value(Admission::Tier { pass: 2, score: 0.45 }).unwrap();
        assert_eq!(json["stage"], "tier");
        assert_eq!(json["pass"], 2);
    }

    #[test]
    fn test_selection_result_concept_ids_keep_admission_order() {
        let result = SelectionResult {
            questions: vec![QuestionId(1)],
            admitted: vec![
                AdmittedConcept {
                    concept_id: ConceptId(3),
                    admission: Admission::Weak,
                },
                AdmittedConcept {
                    concept_id: ConceptId(1),
                    admission: Admission::Backfill,
                },
            ],
            unmapped: vec![],
        };
        assert_eq!(result.concept_ids(), vec![ConceptId(3), ConceptId(1)]);
        assert!(!result.is_empty());
    }
}
