//! ChainGuard Risk Engine - Service Entry Point
//!
//! Consumes blockchain transactions from NATS, runs them through the
//! scoring pipeline, publishes risk alerts, and reports aggregate metrics
//! periodically.

use anyhow::Result;
use chainguard_engine::{
    alerts::ChannelSink,
    bus::{AlertPublisher, TransactionSource},
    config::EngineConfig,
    model::{AnomalyScorer, NullScorer, OnnxScorer},
    EngineError, RiskEngine, Transaction,
};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = if Path::new("config/config.toml").exists() {
        EngineConfig::load()?
    } else {
        EngineConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("chainguard_engine={}", config.logging.level).parse()?),
        )
        .init();

    info!("Starting ChainGuard Risk Engine");
    info!(
        suspicious = config.tier_boundaries.suspicious,
        flagged = config.tier_boundaries.flagged,
        blocked = config.tier_boundaries.blocked,
        "Tier boundaries"
    );

    let scorer: Box<dyn AnomalyScorer> = match &config.model.path {
        Some(path) => {
            info!(path = %path.display(), "Using ONNX anomaly scorer");
            Box::new(OnnxScorer::load(&config.model)?)
        }
        None => {
            info!("No model configured; running with rules-only scoring");
            Box::new(NullScorer)
        }
    };

    let (sink, alert_rx) = ChannelSink::new();
    let engine = Arc::new(RiskEngine::new(&config, scorer)?.with_alert_sink(Box::new(sink)));

    let client = async_nats::connect(&config.nats.url).await?;
    info!(url = %config.nats.url, "Connected to NATS");

    let source = TransactionSource::new(client.clone(), &config.nats.transaction_subject);
    let publisher = AlertPublisher::new(client.clone(), &config.nats.alert_subject);
    tokio::spawn(publisher.run(alert_rx));

    // Periodic metrics snapshot for operators.
    let reporter_engine = engine.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        interval.tick().await;
        loop {
            interval.tick().await;
            let metrics = reporter_engine.snapshot();
            info!(
                total_processed = metrics.total_processed,
                total_blocked = metrics.total_blocked,
                fraud_rate = format!("{:.4}", metrics.fraud_rate),
                high_risk_count = metrics.high_risk_count,
                critical_count = metrics.critical_count,
                processing_rate = format!("{:.1} tx/min", metrics.processing_rate),
                "Metrics snapshot"
            );
        }
    });

    // Single-writer ingestion loop: transactions are processed in arrival
    // order, one at a time, which is what keeps deduplication and window
    // updates well-defined.
    let mut subscription = source.subscribe().await?;
    info!(subject = %config.nats.transaction_subject, "Processing transactions");

    while let Some(message) = subscription.next().await {
        let tx: Transaction = match serde_json::from_slice(&message.payload) {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, "Failed to deserialize transaction");
                continue;
            }
        };

        match engine.ingest(tx) {
            Ok(true) => {
                let metrics = engine.snapshot();
                if metrics.total_processed % 100 == 0 {
                    info!(
                        processed = metrics.total_processed,
                        rate = format!("{:.1} tx/min", metrics.processing_rate),
                        "Processing milestone"
                    );
                }
            }
            Ok(false) => {}
            Err(e @ EngineError::InvalidInput(_)) => {
                warn!(error = %e, "Rejected malformed transaction");
            }
            Err(e) => {
                error!(error = %e, "Unexpected ingestion failure");
            }
        }
    }

    info!("Transaction feed closed; shutting down");
    let metrics = engine.snapshot();
    info!(
        total_processed = metrics.total_processed,
        total_blocked = metrics.total_blocked,
        "Final totals"
    );

    Ok(())
}
