//! In-memory store backed by a JSON snapshot
//!
//! Used by the CLI's `--snapshot` mode and throughout the tests. The snapshot
//! is immutable once loaded, so concurrent requests share it freely.

use super::RevisionStore;
use crate::error::Result;
use crate::types::{
    ActivityKind, ClassroomId, Concept, ConceptQuestionLink, ConceptTrackingRecord, TopicId,
    UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// A revision activity attached to a topic in a classroom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicActivity {
    pub topic_id: TopicId,
    pub classroom_id: ClassroomId,
    pub activity_kind: ActivityKind,
    #[serde(default = "default_live")]
    pub live: bool,
}

fn default_live() -> bool {
    true
}

/// A concept-question link together with the topic its question belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLink {
    pub topic_id: TopicId,
    #[serde(flatten)]
    pub link: ConceptQuestionLink,
}

/// Everything a store needs to answer revision requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub records: Vec<ConceptTrackingRecord>,
    #[serde(default)]
    pub topics: Vec<TopicActivity>,
    #[serde(default)]
    pub links: Vec<TopicLink>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    snapshot: Snapshot,
}

impl InMemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_json_str(&contents)?;
        debug!(
            "Loaded snapshot from {}: {} records, {} links",
            path.as_ref().display(),
            store.snapshot.records.len(),
            store.snapshot.links.len()
        );
        Ok(store)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl RevisionStore for InMemoryStore {
    async fn fetch_tracking_records(
        &self,
        user: UserId,
        kind: &ActivityKind,
    ) -> Result<Vec<ConceptTrackingRecord>> {
        let mut records: Vec<ConceptTrackingRecord> = self
            .snapshot
            .records
            .iter()
            .filter(|r| r.user_id == user && r.activity_kind == *kind)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn fetch_live_topics(
        &self,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<BTreeSet<TopicId>> {
        Ok(self
            .snapshot
            .topics
            .iter()
            .filter(|t| t.live && t.classroom_id == classroom && t.activity_kind == *kind)
            .map(|t| t.topic_id)
            .collect())
    }

    async fn fetch_concept_question_links(
        &self,
        topics: &BTreeSet<TopicId>,
    ) -> Result<Vec<ConceptQuestionLink>> {
        Ok(self
            .snapshot
            .links
            .iter()
            .filter(|l| topics.contains(&l.topic_id))
            .map(|l| l.link)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConceptId, QuestionId, QuestionType};
    use chrono::{Duration, Utc};

    fn store() -> InMemoryStore {
        let now = Utc::now();
        let revision = ActivityKind::new("revision");
        let record = |concept: i64, user: i64, kind: &ActivityKind, minutes: i64| {
            ConceptTrackingRecord {
                concept_id: ConceptId(concept),
                user_id: UserId(user),
                classroom_id: ClassroomId(1),
                activity_kind: kind.clone(),
                is_correct: false,
                created_at: now - Duration::minutes(minutes),
            }
        };

        InMemoryStore::new(Snapshot {
            concepts: vec![Concept {
                id: ConceptId(1),
                text: "Mitochondria".to_string(),
                answer_text: "Powerhouse of the cell".to_string(),
            }],
            records: vec![
                record(1, 1, &revision, 5),
                record(2, 1, &revision, 30),
                record(3, 2, &revision, 1),
                record(4, 1, &ActivityKind::new("quiz"), 1),
            ],
            topics: vec![
                TopicActivity {
                    topic_id: TopicId(10),
                    classroom_id: ClassroomId(1),
                    activity_kind: revision.clone(),
                    live: true,
                },
                TopicActivity {
                    topic_id: TopicId(11),
                    classroom_id: ClassroomId(1),
                    activity_kind: revision.clone(),
                    live: false,
                },
                TopicActivity {
                    topic_id: TopicId(12),
                    classroom_id: ClassroomId(2),
                    activity_kind: revision,
                    live: true,
                },
            ],
            links: vec![
                TopicLink {
                    topic_id: TopicId(10),
                    link: ConceptQuestionLink {
                        question_id: QuestionId(100),
                        concept_id: ConceptId(1),
                        question_type: QuestionType::MultipleChoice,
                    },
                },
                TopicLink {
                    topic_id: TopicId(11),
                    link: ConceptQuestionLink {
                        question_id: QuestionId(110),
                        concept_id: ConceptId(2),
                        question_type: QuestionType::Matching,
                    },
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_records_filtered_and_ascending() {
        let store = store();
        let records = store
            .fetch_tracking_records(UserId(1), &ActivityKind::new("revision"))
            .await
            .unwrap();

        let concepts: Vec<_> = records.iter().map(|r| r.concept_id).collect();
        assert_eq!(concepts, vec![ConceptId(2), ConceptId(1)]);
    }

    #[tokio::test]
    async fn test_only_live_topics_for_classroom() {
        let store = store();
        let topics = store
            .fetch_live_topics(ClassroomId(1), &ActivityKind::new("revision"))
            .await
            .unwrap();

        assert_eq!(topics, BTreeSet::from([TopicId(10)]));
    }

    #[tokio::test]
    async fn test_links_restricted_to_topics() {
        let store = store();
        let links = store
            .fetch_concept_question_links(&BTreeSet::from([TopicId(10)]))
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].question_id, QuestionId(100));
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let store = store();
        let json = serde_json::to_string(store.snapshot()).unwrap();
        let loaded = InMemoryStore::from_json_str(&json).unwrap();

        assert_eq!(loaded.snapshot(), store.snapshot());
        assert_eq!(loaded.snapshot().concepts[0].text, "Mitochondria");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let store = InMemoryStore::from_json_str(r#"{"records": []}"#).unwrap();
        assert!(store.snapshot().links.is_empty());
        assert!(InMemoryStore::from_json_str("not json").is_err());
    }
}
