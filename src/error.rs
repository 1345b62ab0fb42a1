//! Error taxonomy for the risk engine.
//!
//! Only `InvalidInput` and `Configuration` ever reach a caller. Model
//! failures are recovered inside the pipeline by degrading to rules-only
//! scoring.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A transaction is missing required fields and was rejected before
    /// scoring. The engine does not retry these.
    #[error("invalid transaction input: {0}")]
    InvalidInput(String),

    /// The anomaly scorer exceeded its latency budget. Recovered locally
    /// by scoring without the ML contribution; never surfaced from
    /// `RiskEngine::ingest`.
    #[error("model inference exceeded latency budget ({elapsed_ms}ms > {budget_ms}ms)")]
    ModelTimeout { elapsed_ms: u64, budget_ms: u64 },

    /// Model inference failed for a reason other than latency. Recovered
    /// the same way as a timeout.
    #[error("model inference failed: {0}")]
    ModelInference(String),

    /// Invalid engine configuration, detected once at construction time.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    /// True for failures the pipeline absorbs by degrading to rules-only
    /// scoring rather than propagating.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::ModelTimeout { .. } | EngineError::ModelInference(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_are_recoverable() {
        assert!(EngineError::ModelTimeout {
            elapsed_ms: 120,
            budget_ms: 50
        }
        .is_recoverable());
        assert!(EngineError::ModelInference("shape mismatch".into()).is_recoverable());
        assert!(!EngineError::InvalidInput("missing hash".into()).is_recoverable());
        assert!(!EngineError::Configuration("overlapping tiers".into()).is_recoverable());
    }
}
