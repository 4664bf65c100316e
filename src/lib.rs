//! Concept Review - adaptive selection of revision questions
//!
//! Given a student's answer history, picks a bounded set of curriculum
//! concepts worth revisiting and turns them into a list of questions:
//! - Weak concepts (latest signal is an unresolved incorrect answer) first
//! - Then concepts under rising mastery thresholds, scored over recent windows
//! - Random backfill from the live curriculum when history runs short
//!
//! # Architecture
//!
//! - **Types**: Core identifiers and records (ConceptTrackingRecord, SelectionResult, ...)
//! - **Scoring**: Per-window accuracy and recency aggregation
//! - **Selection**: Review set plus the weak, tiered and backfill stages
//! - **Mapper**: Concept to question mapping over the bipartite link graph
//! - **Storage**: Read-only stores (in-memory snapshot, SQLite)
//! - **Engine**: Fetches inputs and runs the pipeline
//!
//! # Example
//!
//! ```ignore
//! use concept_review_core::{ActivityKind, ClassroomId, ReviewConfig, RevisionEngine, SqliteStore, UserId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SqliteStore::new("school.db")?;
//!     let engine = RevisionEngine::new(store, ReviewConfig::default())?;
//!
//!     let result = engine
//!         .select_revision_questions(UserId(42), ClassroomId(7), &ActivityKind::new("revision"), 10)
//!         .await?;
//!     println!("{:?}", result.questions);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod mapper;
pub mod random;
pub mod scoring;
pub mod selection;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::{BackfillPool, ConfigError, HistoryOrder, ReviewConfig, TierConfig, TierOrder};
pub use engine::{plan_revision, RevisionEngine, RevisionInputs};
pub use error::{Result, ReviewError};
pub use graph::ConceptQuestionGraph;
pub use random::RandomSource;
pub use scoring::{ConceptMastery, TimeWindow};
pub use storage::{InMemoryStore, RevisionStore, Snapshot, SqliteStore};
pub use types::{
    ActivityKind, Admission, AdmittedConcept, ClassroomId, Concept, ConceptId,
    ConceptQuestionLink, ConceptTrackingRecord, QuestionId, QuestionType, SelectionResult,
    TopicId, UserId,
};
