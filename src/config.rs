//! Configuration for the risk engine and its service boundary
//!
//! Every knob has a default matching the documented scoring scheme, so an
//! empty or partial config file is valid. The camelCase option names used
//! by the upstream dashboard (`largeAmountThreshold`, `tierBoundaries`,
//! ...) are accepted as aliases; unrecognized keys are ignored.

use crate::error::EngineError;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Amounts above this (native units) trigger the large-amount rule
    #[serde(alias = "largeAmountThreshold")]
    pub large_amount_threshold: f64,
    /// Amounts in [medium, large] trigger the medium-amount rule
    #[serde(alias = "mediumAmountThreshold")]
    pub medium_amount_threshold: f64,
    /// Amounts below this (but above zero) trigger the dust rule
    #[serde(alias = "dustThreshold")]
    pub dust_threshold: f64,
    #[serde(alias = "pointValues")]
    pub point_values: PointValues,
    #[serde(alias = "tierBoundaries")]
    pub tier_boundaries: TierBoundaries,
    #[serde(alias = "windowCapacities")]
    pub window_capacities: WindowCapacities,
    pub dedup: DedupConfig,
    pub model: ModelConfig,
    pub nats: NatsConfig,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            large_amount_threshold: 10.0,
            medium_amount_threshold: 1.0,
            dust_threshold: 0.001,
            point_values: PointValues::default(),
            tier_boundaries: TierBoundaries::default(),
            window_capacities: WindowCapacities::default(),
            dedup: DedupConfig::default(),
            model: ModelConfig::default(),
            nats: NatsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// The subset of configuration the rule scorer needs.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub large_amount_threshold: f64,
    pub medium_amount_threshold: f64,
    pub dust_threshold: f64,
    pub point_values: PointValues,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ScoringConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            large_amount_threshold: config.large_amount_threshold,
            medium_amount_threshold: config.medium_amount_threshold,
            dust_threshold: config.dust_threshold,
            point_values: config.point_values.clone(),
        }
    }
}

/// Per-rule point contributions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointValues {
    #[serde(alias = "largeAmount")]
    pub large_amount: u32,
    #[serde(alias = "mediumAmount")]
    pub medium_amount: u32,
    pub dust: u32,
    #[serde(alias = "transactionError")]
    pub transaction_error: u32,
    #[serde(alias = "roundAmount")]
    pub round_amount: u32,
    #[serde(alias = "selfTransfer")]
    pub self_transfer: u32,
    /// Upper bound on the ML contribution
    #[serde(alias = "mlCap")]
    pub ml_cap: u32,
    /// Multiplier applied to |anomaly| for the ML contribution
    #[serde(alias = "mlMultiplier")]
    pub ml_multiplier: f64,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            large_amount: 30,
            medium_amount: 15,
            dust: 20,
            transaction_error: 40,
            round_amount: 15,
            self_transfer: 25,
            ml_cap: 30,
            ml_multiplier: 20.0,
        }
    }
}

/// Lower bound of each tier above `approved`. Ranges are contiguous by
/// construction; `validate` rejects non-monotonic bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TierBoundaries {
    pub suspicious: u8,
    pub flagged: u8,
    pub blocked: u8,
}

impl Default for TierBoundaries {
    fn default() -> Self {
        Self {
            suspicious: 30,
            flagged: 65,
            blocked: 70,
        }
    }
}

impl TierBoundaries {
    /// Boundaries must be strictly increasing and inside the score domain,
    /// otherwise some score would be unclassified or doubly classified.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.suspicious == 0 || self.suspicious >= self.flagged || self.flagged >= self.blocked {
            return Err(EngineError::Configuration(format!(
                "tier boundaries must satisfy 0 < suspicious < flagged < blocked, got {}/{}/{}",
                self.suspicious, self.flagged, self.blocked
            )));
        }
        if self.blocked > 100 {
            return Err(EngineError::Configuration(format!(
                "blocked boundary {} exceeds the score domain (0-100)",
                self.blocked
            )));
        }
        Ok(())
    }
}

/// Capacities for the three aggregation windows.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowCapacities {
    /// Full transaction feed
    pub full: usize,
    /// Risk-score history trace
    pub history: usize,
    /// Watchlist of suspicious-tier transactions
    #[serde(alias = "highRisk")]
    pub high_risk: usize,
}

impl Default for WindowCapacities {
    fn default() -> Self {
        Self {
            full: 1000,
            history: 1000,
            high_risk: 100,
        }
    }
}

/// Deduplication settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Seen-set cap; once reached, the oldest identifiers are evicted.
    /// Several multiples of the largest window, so a duplicate has to be
    /// very old before it can slip through again.
    #[serde(alias = "seenCapacity")]
    pub seen_capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            seen_capacity: 5000,
        }
    }
}

/// Anomaly model settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to an ONNX anomaly model. When unset the engine runs with
    /// rules-only scoring.
    pub path: Option<PathBuf>,
    /// Inference latency budget; exceeding it degrades the result to
    /// rules-only scoring.
    #[serde(alias = "latencyBudgetMs")]
    pub latency_budget_ms: u64,
    /// Number of intra-op threads for ONNX inference
    #[serde(alias = "onnxThreads")]
    pub onnx_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            latency_budget_ms: 50,
            onnx_threads: 1,
        }
    }
}

/// NATS connection settings for the service binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    pub url: String,
    /// Subject for incoming transactions
    pub transaction_subject: String,
    /// Subject for outgoing risk alerts
    pub alert_subject: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            transaction_subject: "chain.transactions".to_string(),
            alert_subject: "chain.risk.alerts".to_string(),
        }
    }
}

/// Logging settings for the service binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path. Missing keys fall back to
    /// defaults; unrecognized keys are ignored.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
