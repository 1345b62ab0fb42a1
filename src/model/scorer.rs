//! Anomaly scorer contract

use crate::error::EngineError;

/// External anomaly-detection capability.
///
/// Sign convention follows the isolation-forest decision function: values
/// are roughly in [-1, 1] and negative values signal an outlier. The call
/// is expected to complete within the implementation's latency budget; an
/// error (including a blown budget) makes the pipeline fall back to
/// rules-only scoring, it never fails ingestion.
pub trait AnomalyScorer: Send + Sync {
    fn infer(&self, features: &[f32]) -> Result<f64, EngineError>;
}

/// Scorer used when no model is configured: reports every transaction as
/// unremarkable, leaving the rule-based contribution as the whole score.
pub struct NullScorer;

impl AnomalyScorer for NullScorer {
    fn infer(&self, _features: &[f32]) -> Result<f64, EngineError> {
        Ok(0.0)
    }
}
