//! Alert emission for flagged and blocked transactions.
//!
//! The aggregator invokes the sink synchronously while recording, so sink
//! implementations must be cheap and infallible; anything slow (publishing,
//! persistence) belongs behind a channel.

use crate::types::ScoredTransaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Alert emitted when a transaction crosses the flagged or blocked tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    /// Unique alert identifier
    pub alert_id: String,
    /// The scored transaction that triggered the alert
    pub transaction: ScoredTransaction,
    /// Alert creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RiskAlert {
    pub fn new(transaction: ScoredTransaction) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            transaction,
            created_at: Utc::now(),
        }
    }
}

/// Notification hook for the alerting collaborator.
pub trait AlertSink: Send + Sync {
    fn notify(&self, alert: RiskAlert);
}

/// Sink that forwards alerts onto an unbounded channel, decoupling the
/// synchronous record path from async publishing.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<RiskAlert>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RiskAlert>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl AlertSink for ChannelSink {
    fn notify(&self, alert: RiskAlert) {
        if self.sender.send(alert).is_err() {
            warn!("Alert receiver dropped; alert discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tier, Transaction};

    fn scored(hash: &str, tier: Tier) -> ScoredTransaction {
        ScoredTransaction {
            transaction: Transaction::new(hash, "0xaaa", "0xbbb"),
            risk_score: 70,
            tier,
            flags: vec!["Transaction Error".to_string()],
            degraded: false,
        }
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (sink, mut receiver) = ChannelSink::new();
        sink.notify(RiskAlert::new(scored("0x1", Tier::Blocked)));

        let alert = receiver.try_recv().unwrap();
        assert_eq!(alert.transaction.transaction.hash, "0x1");
        assert_eq!(alert.transaction.tier, Tier::Blocked);
        assert!(!alert.alert_id.is_empty());
    }

    #[test]
    fn test_notify_survives_dropped_receiver() {
        let (sink, receiver) = ChannelSink::new();
        drop(receiver);
        // Must not panic.
        sink.notify(RiskAlert::new(scored("0x2", Tier::Flagged)));
    }
}
