//! ChainGuard Risk Engine
//!
//! Real-time risk scoring and aggregation for streaming blockchain
//! transactions: hybrid rule/ML scoring, tier classification, idempotent
//! ingestion, and bounded sliding-window metrics.

pub mod aggregator;
pub mod alerts;
pub mod bus;
pub mod config;
pub mod dedup;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use aggregator::{Metrics, StreamAggregator};
pub use alerts::AlertSink;
pub use config::EngineConfig;
pub use error::EngineError;
pub use features::FeatureExtractor;
pub use model::AnomalyScorer;
pub use pipeline::RiskEngine;
pub use scoring::{Classifier, RiskScorer};
pub use types::{ScoredTransaction, Tier, Transaction};
