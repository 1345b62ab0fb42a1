//! Scored transaction and action tiers

use crate::types::Transaction;
use serde::{Deserialize, Serialize};

/// Action tier for a scored transaction, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Approved,
    Suspicious,
    Flagged,
    Blocked,
}

impl Tier {
    /// Tiers that notify the alerting collaborator.
    pub fn triggers_alert(&self) -> bool {
        matches!(self, Tier::Flagged | Tier::Blocked)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Approved => "approved",
            Tier::Suspicious => "suspicious",
            Tier::Flagged => "flagged",
            Tier::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// A transaction plus the outcome of scoring and classification.
///
/// Created once per transaction and immutable afterwards. `flags` records
/// every triggered rule label in rule evaluation order; a score of 0 always
/// has an empty flag list. `degraded` marks results computed without the ML
/// contribution because the anomaly scorer timed out or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Risk score, always in 0..=100
    pub risk_score: u8,

    /// Action tier derived from the score
    pub tier: Tier,

    /// Human-readable labels for every triggered rule
    pub flags: Vec<String>,

    /// True when the result was computed without the ML contribution
    pub degraded: bool,
}
