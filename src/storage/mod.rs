//! Read-only access to tracking history and the live curriculum
//!
//! The engine never writes: it reads a user's tracking records, the classroom's
//! live topics, and the concept-question links of those topics.

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::types::{
    ActivityKind, ClassroomId, ConceptQuestionLink, ConceptTrackingRecord, TopicId, UserId,
};
use async_trait::async_trait;
use std::collections::BTreeSet;

pub use memory::{InMemoryStore, Snapshot};
pub use sqlite::SqliteStore;

/// Store operations the revision engine depends on
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// A user's tracking records for one activity kind, ascending by `created_at`
    ///
    /// Records sharing a timestamp keep insertion order.
    async fn fetch_tracking_records(
        &self,
        user: UserId,
        kind: &ActivityKind,
    ) -> Result<Vec<ConceptTrackingRecord>>;

    /// Topics with a live revision activity of `kind` in the classroom
    async fn fetch_live_topics(
        &self,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<BTreeSet<TopicId>>;

    /// Concept-question links for questions belonging to `topics`
    async fn fetch_concept_question_links(
        &self,
        topics: &BTreeSet<TopicId>,
    ) -> Result<Vec<ConceptQuestionLink>>;
}

#[async_trait]
impl<S: RevisionStore + ?Sized> RevisionStore for std::sync::Arc<S> {
    async fn fetch_tracking_records(
        &self,
        user: UserId,
        kind: &ActivityKind,
    ) -> Result<Vec<ConceptTrackingRecord>> {
        (**self).fetch_tracking_records(user, kind).await
    }

    async fn fetch_live_topics(
        &self,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<BTreeSet<TopicId>> {
        (**self).fetch_live_topics(classroom, kind).await
    }

    async fn fetch_concept_question_links(
        &self,
        topics: &BTreeSet<TopicId>,
    ) -> Result<Vec<ConceptQuestionLink>> {
        (**self).fetch_concept_question_links(topics).await
    }
}
