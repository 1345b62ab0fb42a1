//! NATS boundary: incoming transaction stream and outgoing risk alerts

use crate::alerts::RiskAlert;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

/// Subscribes to the raw transaction feed.
pub struct TransactionSource {
    client: Client,
    subject: String,
}

impl TransactionSource {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to transaction feed");
        Ok(subscriber)
    }
}

/// Publishes risk alerts drained from the engine's alert channel.
///
/// Runs until the sending side (the engine's `ChannelSink`) is dropped. A
/// failed publish is logged and skipped; alerting must never stall
/// ingestion.
pub struct AlertPublisher {
    client: Client,
    subject: String,
}

impl AlertPublisher {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    pub async fn run(self, mut alerts: UnboundedReceiver<RiskAlert>) {
        while let Some(alert) = alerts.recv().await {
            let payload = match serde_json::to_vec(&alert) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(alert_id = %alert.alert_id, error = %e, "Failed to serialize alert");
                    continue;
                }
            };

            match self.client.publish(self.subject.clone(), payload.into()).await {
                Ok(()) => debug!(
                    alert_id = %alert.alert_id,
                    hash = %alert.transaction.transaction.hash,
                    tier = %alert.transaction.tier,
                    "Published risk alert"
                ),
                Err(e) => error!(
                    alert_id = %alert.alert_id,
                    error = %e,
                    "Failed to publish risk alert"
                ),
            }
        }
        info!("Alert channel closed; publisher stopping");
    }
}
