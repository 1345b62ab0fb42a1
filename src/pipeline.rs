//! The ingestion pipeline: dedup -> extract -> infer -> score -> classify
//! -> record.
//!
//! `ingest` is the single-writer entry point; `snapshot` is safe to call
//! from any number of concurrent readers.

use crate::aggregator::{Metrics, StreamAggregator};
use crate::alerts::AlertSink;
use crate::config::{EngineConfig, ScoringConfig};
use crate::dedup::IngestionDeduplicator;
use crate::error::EngineError;
use crate::features::FeatureExtractor;
use crate::model::AnomalyScorer;
use crate::scoring::{Classifier, RiskScorer};
use crate::types::{ScoredTransaction, Transaction};
use std::sync::Mutex;
use tracing::{debug, warn};

pub struct RiskEngine {
    extractor: FeatureExtractor,
    scorer: Box<dyn AnomalyScorer>,
    rules: RiskScorer,
    classifier: Classifier,
    dedup: Mutex<IngestionDeduplicator>,
    aggregator: StreamAggregator,
}

impl RiskEngine {
    /// Build the engine. The only failure mode is invalid tier
    /// boundaries, raised once here and never during ingestion.
    pub fn new(
        config: &EngineConfig,
        scorer: Box<dyn AnomalyScorer>,
    ) -> Result<Self, EngineError> {
        let classifier = Classifier::new(config.tier_boundaries)?;

        Ok(Self {
            extractor: FeatureExtractor::new(),
            scorer,
            rules: RiskScorer::new(ScoringConfig::from(config)),
            classifier,
            dedup: Mutex::new(IngestionDeduplicator::new(config.dedup.seen_capacity)),
            aggregator: StreamAggregator::new(config.window_capacities),
        })
    }

    /// Attach the alerting collaborator, notified synchronously for
    /// flagged and blocked transactions.
    pub fn with_alert_sink(mut self, sink: Box<dyn AlertSink>) -> Self {
        self.aggregator = self.aggregator.with_alert_sink(sink);
        self
    }

    /// Run one transaction through the full pipeline.
    ///
    /// Returns `Ok(true)` when the transaction was scored and recorded,
    /// `Ok(false)` for a duplicate (a defined no-op), and an error only
    /// for a transaction without an identifier. Model failures degrade to
    /// rules-only scoring and are never surfaced here.
    pub fn ingest(&self, tx: Transaction) -> Result<bool, EngineError> {
        {
            let mut dedup = match self.dedup.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !dedup.ingest(&tx)? {
                debug!(hash = %tx.hash, "Duplicate transaction skipped");
                return Ok(false);
            }
        }

        let features = self.extractor.extract(&tx);

        let (anomaly, degraded) = match self.scorer.infer(&features) {
            Ok(anomaly) => (anomaly, false),
            Err(e) => {
                warn!(hash = %tx.hash, error = %e, "Anomaly scorer failed; degrading to rules-only scoring");
                (0.0, true)
            }
        };

        let (risk_score, flags) = self.rules.score(&tx, anomaly);
        let tier = self.classifier.classify(risk_score);

        debug!(
            hash = %tx.hash,
            risk_score,
            tier = %tier,
            degraded,
            "Transaction scored"
        );

        self.aggregator.record(ScoredTransaction {
            transaction: tx,
            risk_score,
            tier,
            flags,
            degraded,
        });

        Ok(true)
    }

    /// Current derived metrics; safe under concurrent ingestion.
    pub fn snapshot(&self) -> Metrics {
        self.aggregator.snapshot()
    }
}
