//! Revision engine: fetches a user's history and the live curriculum, then
//! runs the selection pipeline and maps the result onto questions.
//!
//! The pipeline itself ([`plan_revision`]) is synchronous and pure given its
//! inputs, a clock reading and a random source. Only the reads are async.

use crate::config::{ReviewConfig, MAX_CAP};
use crate::error::{Result, ReviewError};
use crate::graph::ConceptQuestionGraph;
use crate::mapper::map_concepts_to_questions;
use crate::random::RandomSource;
use crate::scoring::{mastery_report, ConceptMastery};
use crate::selection::select_review_concepts;
use crate::storage::RevisionStore;
use crate::types::{
    ActivityKind, ClassroomId, ConceptQuestionLink, ConceptTrackingRecord, SelectionResult,
    UserId,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Everything the pipeline reads for one request
#[derive(Debug, Clone, Default)]
pub struct RevisionInputs {
    /// Tracking records, ascending by `created_at`
    pub records: Vec<ConceptTrackingRecord>,

    /// Concept-question links of the classroom's live topics
    pub links: Vec<ConceptQuestionLink>,
}

pub struct RevisionEngine<S: RevisionStore> {
    store: S,
    config: ReviewConfig,
}

impl<S: RevisionStore> RevisionEngine<S> {
    pub fn new(store: S, config: ReviewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Select up to `cap` concepts for `user` and return their questions
    ///
    /// Uses the wall clock and a thread-local random source, so repeated calls
    /// over the same history may return different questions.
    pub async fn select_revision_questions(
        &self,
        user: UserId,
        classroom: ClassroomId,
        kind: &ActivityKind,
        cap: usize,
    ) -> Result<SelectionResult> {
        check_cap(cap)?;
        if cap == 0 {
            return Ok(SelectionResult::default());
        }

        let inputs = self.fetch_inputs(user, classroom, kind).await?;
        let mut rng = rand::thread_rng();
        Ok(plan_revision(&self.config, &inputs, cap, Utc::now(), &mut rng))
    }

    /// Deterministic variant of [`select_revision_questions`](Self::select_revision_questions)
    pub async fn select_revision_questions_at<R: RandomSource>(
        &self,
        user: UserId,
        classroom: ClassroomId,
        kind: &ActivityKind,
        cap: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SelectionResult> {
        check_cap(cap)?;
        if cap == 0 {
            return Ok(SelectionResult::default());
        }

        let inputs = self.fetch_inputs(user, classroom, kind).await?;
        Ok(plan_revision(&self.config, &inputs, cap, now, rng))
    }

    /// Fetch tracking history and live links concurrently
    pub async fn fetch_inputs(
        &self,
        user: UserId,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<RevisionInputs> {
        let (records, links) = tokio::try_join!(
            self.store.fetch_tracking_records(user, kind),
            self.fetch_live_links(classroom, kind),
        )?;

        Ok(RevisionInputs { records, links })
    }

    async fn fetch_live_links(
        &self,
        classroom: ClassroomId,
        kind: &ActivityKind,
    ) -> Result<Vec<ConceptQuestionLink>> {
        let topics = self.store.fetch_live_topics(classroom, kind).await?;
        if topics.is_empty() {
            debug!("No live {} topics in classroom {}", kind, classroom);
            return Ok(Vec::new());
        }
        self.store.fetch_concept_question_links(&topics).await
    }

    /// Per-concept mastery for `user` as of now, using the configured windows
    pub async fn mastery(&self, user: UserId, kind: &ActivityKind) -> Result<Vec<ConceptMastery>> {
        let records = self.store.fetch_tracking_records(user, kind).await?;
        Ok(mastery_report(&records, &self.config.windows, Utc::now()))
    }
}

fn check_cap(cap: usize) -> Result<()> {
    if cap > MAX_CAP {
        return Err(ReviewError::InvalidArgument(format!(
            "cap {} exceeds the maximum of {}",
            cap, MAX_CAP
        )));
    }
    Ok(())
}

/// Run the full selection pipeline over already-fetched inputs
pub fn plan_revision<R: RandomSource>(
    config: &ReviewConfig,
    inputs: &RevisionInputs,
    cap: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> SelectionResult {
    let graph = ConceptQuestionGraph::from_links(&inputs.links);
    let (review, counts) =
        select_review_concepts(&inputs.records, &graph, config, cap, now, rng);

    let mapped =
        map_concepts_to_questions(&review.concept_ids(), &graph, config.shuffle_questions, rng);

    info!(
        "Selected {} of {} concepts (weak: {}, tiered: {}, backfill: {}) -> {} questions",
        review.len(),
        cap,
        counts.weak,
        counts.tiered,
        counts.backfill,
        mapped.questions.len()
    );

    SelectionResult {
        questions: mapped.questions,
        admitted: review.into_admitted(),
        unmapped: mapped.unmapped,
    }
}
