//! Mastery scoring from tracking history
//!
//! - **window**: accuracy per concept over trailing time windows
//! - **aggregate**: mean of the defined window scores, plus the mastery report

pub mod aggregate;
pub mod window;

pub use aggregate::{aggregate, aggregate_scores, mastery_report, ConceptMastery};
pub use window::{TimeWindow, TimeWindowScorer, WindowScores};
