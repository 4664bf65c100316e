// Review Configuration
//
// Defines the cap, scoring windows, tier thresholds and ordering policies used
// by the selection pipeline. Loaded from TOML; every field has a default so a
// partial file only overrides what it names.

use crate::scoring::TimeWindow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Largest cap accepted by validation
pub const MAX_CAP: usize = 200;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Order in which the tiered selector walks scored concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierOrder {
    /// Highest mastery first; when the cap interrupts a pass, the better-known
    /// concepts below the threshold win
    #[default]
    MasteryDescending,

    /// Lowest mastery first
    WeakestFirst,
}

/// Order in which tracking history is fed to the weak-concept pass
///
/// The pass lets the first record it sees for a concept decide: a correct one
/// resolves the concept for the rest of the scan. [`Stored`](Self::Stored) is
/// the literal behaviour, scanning records exactly as the store returned them.
/// [`NewestFirst`](Self::NewestFirst) is the default and flags exactly the
/// concepts whose latest attempt was wrong; it is the only order under which a
/// later correct answer suppresses an earlier wrong one and a later wrong
/// answer still flags the concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Stable sort by `created_at`, most recent first
    #[default]
    NewestFirst,

    /// Whatever order the store returned
    Stored,
}

/// Which concepts the random backfill may draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackfillPool {
    /// Every live concept not yet in the review set
    #[default]
    AllLiveConcepts,

    /// Only live concepts the user has no tracking record for
    UnattemptedOnly,
}

/// One threshold pass of the tiered selector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Concepts with an aggregate score strictly below this are admitted
    pub threshold: f64,

    /// The pass only runs while the review set is smaller than this fraction
    /// of the cap. `None` means the pass always runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_if_below_fraction: Option<f64>,
}

/// Main review configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Default cap on concepts (and thus questions) per revision request
    pub max_concepts_to_review: usize,

    /// Trailing windows averaged into the mastery score
    pub windows: Vec<TimeWindow>,

    pub tier_order: TierOrder,

    pub history_order: HistoryOrder,

    pub backfill_pool: BackfillPool,

    /// Shuffle the final question list
    pub shuffle_questions: bool,

    /// Threshold passes, run in order
    pub tiers: Vec<TierConfig>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_concepts_to_review: 10,
            windows: TimeWindow::ALL.to_vec(),
            tier_order: TierOrder::default(),
            history_order: HistoryOrder::default(),
            backfill_pool: BackfillPool::default(),
            shuffle_questions: true,
            tiers: vec![
                TierConfig {
                    threshold: 0.4,
                    run_if_below_fraction: None,
                },
                TierConfig {
                    threshold: 0.5,
                    run_if_below_fraction: Some(0.5),
                },
                TierConfig {
                    threshold: 0.6,
                    run_if_below_fraction: Some(0.6),
                },
            ],
        }
    }
}

impl ReviewConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ReviewConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_cap(self.max_concepts_to_review)?;

        if self.windows.is_empty() {
            return Err(ConfigError::ValidationError(
                "windows: at least one scoring window is required".to_string(),
            ));
        }

        let distinct: HashSet<_> = self.windows.iter().collect();
        if distinct.len() != self.windows.len() {
            return Err(ConfigError::ValidationError(
                "windows: each scoring window may appear only once".to_string(),
            ));
        }

        let mut previous = 0.0;
        for (i, tier) in self.tiers.iter().enumerate() {
            let pass = i + 1;
            if !(tier.threshold > 0.0 && tier.threshold <= 1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "tier {}: threshold must be in (0, 1]",
                    pass
                )));
            }
            if tier.threshold < previous {
                return Err(ConfigError::ValidationError(format!(
                    "tier {}: thresholds must be non-decreasing",
                    pass
                )));
            }
            if let Some(fraction) = tier.run_if_below_fraction {
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(ConfigError::ValidationError(format!(
                        "tier {}: run_if_below_fraction must be in (0, 1]",
                        pass
                    )));
                }
            }
            previous = tier.threshold;
        }

        Ok(())
    }
}

/// Check a per-request cap against the accepted range
pub fn validate_cap(cap: usize) -> Result<(), ConfigError> {
    if cap == 0 || cap > MAX_CAP {
        return Err(ConfigError::ValidationError(format!(
            "max_concepts_to_review must be between 1 and {}",
            MAX_CAP
        )));
    }
    Ok(())
}
