//! SQLite-backed revision store
//!
//! Pooled access through deadpool-sqlite. Timestamps are stored as RFC 3339
//! text and ordered after parsing, so mixed sub-second precision in the column
//! cannot break the ascending-history contract.

use super::memory::Snapshot;
use super::RevisionStore;
use crate::error::{Result, ReviewError};
use crate::types::{
    ActivityKind, ClassroomId, ConceptId, ConceptQuestionLink, ConceptTrackingRecord, QuestionId,
    QuestionType, TopicId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_sqlite::{Config, Object, Pool, Runtime};
use rusqlite::{params, params_from_iter};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Default connection pool size
const DEFAULT_POOL_SIZE: usize = 8;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS concepts (
        id INTEGER PRIMARY KEY,
        text TEXT NOT NULL,
        answer_text TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS concept_tracking (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        concept_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        classroom_id INTEGER NOT NULL,
        activity_kind TEXT NOT NULL,
        is_correct INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_concept_tracking_user_kind
        ON concept_tracking (user_id, activity_kind);
    CREATE TABLE IF NOT EXISTS revision_activities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        classroom_id INTEGER NOT NULL,
        topic_id INTEGER NOT NULL,
        activity_kind TEXT NOT NULL,
        is_live INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY,
        topic_id INTEGER NOT NULL,
        question_type TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS concept_questions (
        question_id INTEGER NOT NULL,
        concept_id INTEGER NOT NULL,
        PRIMARY KEY (question_id, concept_id)
    );
";

type TrackingRow = (i64, i64, i64, String, bool, String);

pub struct SqliteStore {
    pool: Pool,
}

impl SqliteStore {
    /// Open a pooled store over the database at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_pool_size(db_path, DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size<P: AsRef<Path>>(db_path: P, pool_size: usize) -> Result<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        info!(
            "Opening revision store at: {} (pool_size: {})",
            path_str, pool_size
        );

        let pool = Config::new(path_str)
            .builder(Runtime::Tokio1)
            .map_err(|e| ReviewError::Database(format!("Failed to configure pool: {}", e)))?
            .max_size(pool_size)
            .build()
            .map_err(|e| ReviewError::Database(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Object> {
        self.pool.get().await.map_err(|e| {
            ReviewError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Create the tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        let conn = self.conn().await?;
        conn.interact(|conn| conn.execute_batch(SCHEMA))
            .await
            .map_err(|e| ReviewError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Revision store schema ready");
        Ok(())
    }

    /// Load every row of `snapshot` in one transaction
    ///
    /// Tracking records are inserted in snapshot order, which becomes the
    /// tie-break order for records sharing a timestamp. A question belongs to
    /// exactly one topic; links placing it under a second topic fail the whole
    /// import with [`ReviewError::InvalidArgument`].
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let counts = (
            snapshot.records.len(),
            snapshot.topics.len(),
            snapshot.links.len(),
        );
        let snapshot = snapshot.clone();
        let conn = self.conn().await?;

        conn.interact(move |conn| -> Result<()> {
            let tx = conn.transaction()?;
            for concept in &snapshot.concepts {
                tx.execute(
                    "INSERT OR REPLACE INTO concepts (id, text, answer_text) VALUES (?1, ?2, ?3)",
                    params![concept.id.0, concept.text, concept.answer_text],
                )?;
            }
            for record in &snapshot.records {
                tx.execute(
                    "INSERT INTO concept_tracking
                        (concept_id, user_id, classroom_id, activity_kind, is_correct, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.concept_id.0,
                        record.user_id.0,
                        record.classroom_id.0,
                        record.activity_kind.as_str(),
                        record.is_correct,
                        record.created_at.to_rfc3339(),
                    ],
                )?;
            }
            for topic in &snapshot.topics {
                tx.execute(
                    "INSERT INTO revision_activities (classroom_id, topic_id, activity_kind, is_live)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        topic.classroom_id.0,
                        topic.topic_id.0,
                        topic.activity_kind.as_str(),
                        topic.live,
                    ],
                )?;
            }
            for entry in &snapshot.links {
                tx.execute(
                    "INSERT OR IGNORE INTO questions (id, topic_id, question_type) VALUES (?1, ?2, ?3)",
                    params![
                        entry.link.question_id.0,
                        entry.topic_id.0,
                        entry.link.question_type.as_str(),
                    ],
                )?;
                let stored_topic: i64 = tx.query_row(
                    "SELECT topic_id FROM questions WHERE id = ?1",
                    params![entry.link.question_id.0],
                    |row| row.get(0),
                )?;
                if stored_topic != entry.topic_id.0 {
                    return Err(ReviewError::InvalidArgument(format!(
                        "question {} is linked under topics {} and {}",
                        entry.link.question_id, stored_topic, entry.topic_id
                    )));
                }
                tx.execute(
                    "INSERT OR IGNORE INTO concept_questions (question_id, concept_id) VALUES (?1, ?2)",
                    params![entry.link.question_id.0, entry.link.concept_id.0],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| ReviewError::Database(format!("Pool interaction failed: {}", e)))??;

        info!(
            "Imported snapshot: {} records, {} topics, {} links",
            counts.0, counts.1, counts.2
        );
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ReviewError::Database(format!("Invalid timestamp '{}': {}", raw, e)))
}

#[async_trait]
impl RevisionStore for SqliteStore {
    async fn fetch_tracking_records(
        &self,
        user: UserId,
        kind: &ActivityKind,
    ) -> Result<Vec<ConceptTrackingRecord>> {
        let kind_str = kind.as_str().to_string();
        let conn = self.conn().await?;

        let rows = conn
            .interact(move |conn| -> Result<Vec<TrackingRow>> {
                let mut stmt = conn.prepare(
                    "SELECT concept_id, user_id, classroom_id, activity_kind, is_correct, created_at
                     FROM concept_tracking
                     WHERE user_id = ?1 AND activity_kind = ?2
                     ORDER BY id",
                )?;
                let rows = stmt
                    .query_map(params![user.0, kind_str], |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                        ))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| ReviewError::Database(format!("Pool interaction failed: {}", e)))??;

        let mut records = rows
            .into_iter()
            .map(
                |(concept, user, classroom, kind, is_correct, created_at)| -> Result<_> {
                    Ok(ConceptTrackingRecord {
                        concept_id: ConceptId(concept),
                        user_id: UserId(user),
                        classroom_id: ClassroomId(classroom),
                        activity_kind: ActivityKind::new(kind),
                        is_correct,
                        created_at: parse_timestamp(&created_at)?,
                    })
                },
            )
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|r| r.created_at);

        debug!("Fetched {} tracking records for user {}", records.len(), user);
        Ok(records)
    }

    async fn fetch_live_topics(
        &self,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<BTreeSet<TopicId>> {
        let kind_str = kind.as_str().to_string();
        let conn = self.conn().await?;

        let topics = conn
            .interact(move |conn| -> Result<BTreeSet<TopicId>> {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT topic_id FROM revision_activities
                     WHERE classroom_id = ?1 AND activity_kind = ?2 AND is_live = 1",
                )?;
                let topics = stmt
                    .query_map(params![classroom.0, kind_str], |row| {
                        row.get::<_, i64>(0).map(TopicId)
                    })?
                    .collect::<rusqlite::Result<BTreeSet<_>>>()?;
                Ok(topics)
            })
            .await
            .map_err(|e| ReviewError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Classroom {} has {} live topics", classroom, topics.len());
        Ok(topics)
    }

    async fn fetch_concept_question_links(
        &self,
        topics: &BTreeSet<TopicId>,
    ) -> Result<Vec<ConceptQuestionLink>> {
        if topics.is_empty() {
            return Ok(Vec::new());
        }

        let topic_ids: Vec<i64> = topics.iter().map(|t| t.0).collect();
        let placeholders = vec!["?"; topic_ids.len()].join(", ");
        let sql = format!(
            "SELECT cq.question_id, cq.concept_id, q.question_type
             FROM concept_questions cq
             JOIN questions q ON q.id = cq.question_id
             WHERE q.topic_id IN ({})
             ORDER BY cq.question_id, cq.concept_id",
            placeholders
        );
        let conn = self.conn().await?;

        let rows = conn
            .interact(move |conn| -> Result<Vec<(i64, i64, String)>> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(topic_ids.iter()), |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| ReviewError::Database(format!("Pool interaction failed: {}", e)))??;

        rows.into_iter()
            .map(|(question, concept, question_type)| -> Result<ConceptQuestionLink> {
                Ok(ConceptQuestionLink {
                    question_id: QuestionId(question),
                    concept_id: ConceptId(concept),
                    question_type: question_type
                        .parse::<QuestionType>()
                        .map_err(ReviewError::Database)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("review.db")).unwrap();
        store.init_schema().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_empty_database() {
        let (store, _temp) = create_test_store().await;
        let kind = ActivityKind::new("revision");

        assert!(store
            .fetch_tracking_records(UserId(1), &kind)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .fetch_live_topics(ClassroomId(1), &kind)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let (store, _temp) = create_test_store().await;
        store.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_topics_short_circuits() {
        let (store, _temp) = create_test_store().await;
        let links = store
            .fetch_concept_question_links(&BTreeSet::new())
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("2024-03-01T10:00:00.5+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T08:00:00.500+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
