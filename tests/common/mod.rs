//! Common test utilities and helpers

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use concept_review_core::storage::memory::{TopicActivity, TopicLink};
use concept_review_core::{
    ActivityKind, ClassroomId, Concept, ConceptId, ConceptQuestionLink, ConceptTrackingRecord,
    InMemoryStore, QuestionId, QuestionType, Snapshot, SqliteStore, TopicId, UserId,
};
use tempfile::TempDir;

pub const USER: UserId = UserId(1);
pub const CLASSROOM: ClassroomId = ClassroomId(1);

pub fn revision() -> ActivityKind {
    ActivityKind::new("revision")
}

/// Fluent builder for test snapshots
///
/// Everything defaults to [`USER`], [`CLASSROOM`] and the `revision` activity.
pub struct SnapshotBuilder {
    now: DateTime<Utc>,
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            snapshot: Snapshot::default(),
        }
    }

    pub fn concept(mut self, id: i64, text: &str) -> Self {
        self.snapshot.concepts.push(Concept {
            id: ConceptId(id),
            text: text.to_string(),
            answer_text: format!("answer to {}", text),
        });
        self
    }

    /// Tracking record for [`USER`], `minutes_ago` before `now`
    pub fn attempt(self, concept: i64, is_correct: bool, minutes_ago: i64) -> Self {
        self.attempt_by(USER, &revision(), concept, is_correct, minutes_ago)
    }

    pub fn attempt_by(
        mut self,
        user: UserId,
        kind: &ActivityKind,
        concept: i64,
        is_correct: bool,
        minutes_ago: i64,
    ) -> Self {
        self.snapshot.records.push(ConceptTrackingRecord {
            concept_id: ConceptId(concept),
            user_id: user,
            classroom_id: CLASSROOM,
            activity_kind: kind.clone(),
            is_correct,
            created_at: self.now - Duration::minutes(minutes_ago),
        });
        self
    }

    pub fn topic(mut self, topic: i64, live: bool) -> Self {
        self.snapshot.topics.push(TopicActivity {
            topic_id: TopicId(topic),
            classroom_id: CLASSROOM,
            activity_kind: revision(),
            live,
        });
        self
    }

    pub fn link(mut self, topic: i64, question: i64, concept: i64) -> Self {
        self.snapshot.links.push(TopicLink {
            topic_id: TopicId(topic),
            link: ConceptQuestionLink {
                question_id: QuestionId(question),
                concept_id: ConceptId(concept),
                question_type: QuestionType::MultipleChoice,
            },
        });
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }

    pub fn store(self) -> InMemoryStore {
        InMemoryStore::new(self.snapshot)
    }
}

/// Live topic 1 with concepts `1..=count`, concept `n` on question `100 + n`
pub fn curriculum(now: DateTime<Utc>, count: i64) -> SnapshotBuilder {
    (1..=count).fold(SnapshotBuilder::new(now).topic(1, true), |builder, n| {
        builder.link(1, 100 + n, n)
    })
}

/// Create a SQLite store in a temporary directory, schema initialised
pub async fn create_test_sqlite_store() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::new(temp_dir.path().join("review.db"))
        .expect("Failed to create test store");
    store
        .init_schema()
        .await
        .expect("Failed to initialise schema");
    (store, temp_dir)
}
