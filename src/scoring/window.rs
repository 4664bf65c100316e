//! Per-concept accuracy over trailing time windows
//!
//! A window with no records for a concept has no score at all. It is never
//! reported as `0.0`, so absence of data is not mistaken for failure.

use crate::types::{ConceptId, ConceptTrackingRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A trailing period over which accuracy is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    LastDay,
    LastWeek,
    LastMonth,
    AllTime,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::LastDay,
        TimeWindow::LastWeek,
        TimeWindow::LastMonth,
        TimeWindow::AllTime,
    ];

    /// Length of the window, `None` for all time
    pub fn span(&self) -> Option<Duration> {
        match self {
            TimeWindow::LastDay => Some(Duration::hours(24)),
            TimeWindow::LastWeek => Some(Duration::days(7)),
            TimeWindow::LastMonth => Some(Duration::days(30)),
            TimeWindow::AllTime => None,
        }
    }

    /// Whether a record created at `at` falls in this window ending at `now`
    ///
    /// The start of the window is inclusive.
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.span() {
            Some(span) => at >= now - span,
            None => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::LastDay => "24h",
            TimeWindow::LastWeek => "7d",
            TimeWindow::LastMonth => "30d",
            TimeWindow::AllTime => "all",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    correct: u32,
    total: u32,
}

impl Tally {
    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Accuracy of one concept in each configured window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowScores {
    scores: Vec<(TimeWindow, Option<f64>)>,
}

impl WindowScores {
    /// Build from explicit window/score pairs
    pub fn from_pairs(scores: impl IntoIterator<Item = (TimeWindow, Option<f64>)>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
        }
    }

    /// Score for `window`; `None` if the window had no records or is not configured
    pub fn get(&self, window: TimeWindow) -> Option<f64> {
        self.scores
            .iter()
            .find(|(w, _)| *w == window)
            .and_then(|(_, score)| *score)
    }

    /// Scores of windows that had at least one record
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().filter_map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(TimeWindow, Option<f64>)> {
        self.scores.iter()
    }
}

/// Computes per-window accuracy for concepts from a user's tracking history
pub struct TimeWindowScorer<'a> {
    windows: &'a [TimeWindow],
    now: DateTime<Utc>,
}

impl<'a> TimeWindowScorer<'a> {
    pub fn new(windows: &'a [TimeWindow], now: DateTime<Utc>) -> Self {
        Self { windows, now }
    }

    /// Window scores for a single concept
    pub fn score_concept(
        &self,
        concept: ConceptId,
        records: &[ConceptTrackingRecord],
    ) -> WindowScores {
        let mut tallies = vec![Tally::default(); self.windows.len()];
        for record in records.iter().filter(|r| r.concept_id == concept) {
            self.tally(&mut tallies, record);
        }
        self.finish(&tallies)
    }

    /// Window scores for every concept that appears in `records`, in one pass
    pub fn score_all(
        &self,
        records: &[ConceptTrackingRecord],
    ) -> BTreeMap<ConceptId, WindowScores> {
        let mut tallies: BTreeMap<ConceptId, Vec<Tally>> = BTreeMap::new();
        for record in records {
            let entry = tallies
                .entry(record.concept_id)
                .or_insert_with(|| vec![Tally::default(); self.windows.len()]);
            self.tally(entry, record);
        }

        tallies
            .into_iter()
            .map(|(concept, t)| (concept, self.finish(&t)))
            .collect()
    }

    fn tally(&self, tallies: &mut [Tally], record: &ConceptTrackingRecord) {
        for (window, tally) in self.windows.iter().zip(tallies.iter_mut()) {
            if window.contains(record.created_at, self.now) {
                tally.record(record.is_correct);
            }
        }
    }

    fn finish(&self, tallies: &[Tally]) -> WindowScores {
        WindowScores::from_pairs(
            self.windows
                .iter()
                .copied()
                .zip(tallies.iter().map(Tally::accuracy)),
        )
    }
}
