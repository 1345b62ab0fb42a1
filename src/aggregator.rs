//! Bounded sliding-window aggregation over the scored stream.
//!
//! One logical writer calls `record`; any number of readers call
//! `snapshot`. Each window has its own lock and each counter is atomic, so
//! a snapshot only ever contends on one window at a time and can never
//! stall ingestion behind a whole-batch lock.

use crate::alerts::{AlertSink, RiskAlert};
use crate::config::WindowCapacities;
use crate::types::{ScoredTransaction, Tier};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Entries of each window exposed in a snapshot.
const RECENT_VIEW: usize = 10;

/// Derived system-wide statistics, computed on read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_processed: u64,
    pub total_blocked: u64,
    /// Fraction of processed transactions that were blocked (0 when empty)
    pub fraud_rate: f64,
    /// Current length of the suspicious-tier watchlist
    pub high_risk_count: usize,
    /// Blocked-tier entries currently inside the full-feed window
    pub critical_count: usize,
    /// Transactions per elapsed wall-clock minute (floor of one minute)
    pub processing_rate: f64,
    /// Most recent transactions, newest first
    pub recent_transactions: Vec<ScoredTransaction>,
    /// Most recent watchlist entries, newest first
    pub recent_high_risk: Vec<ScoredTransaction>,
    /// Most recent risk scores, newest first
    pub recent_scores: Vec<u8>,
}

/// State-owning aggregator: mutation through `record`, pure reads through
/// `snapshot`.
pub struct StreamAggregator {
    full: RwLock<VecDeque<ScoredTransaction>>,
    history: RwLock<VecDeque<u8>>,
    high_risk: RwLock<VecDeque<ScoredTransaction>>,
    capacities: WindowCapacities,
    total_processed: AtomicU64,
    total_blocked: AtomicU64,
    first_record: RwLock<Option<Instant>>,
    sink: Option<Box<dyn AlertSink>>,
}

impl StreamAggregator {
    pub fn new(capacities: WindowCapacities) -> Self {
        Self {
            full: RwLock::new(VecDeque::with_capacity(capacities.full)),
            history: RwLock::new(VecDeque::with_capacity(capacities.history)),
            high_risk: RwLock::new(VecDeque::with_capacity(capacities.high_risk)),
            capacities,
            total_processed: AtomicU64::new(0),
            total_blocked: AtomicU64::new(0),
            first_record: RwLock::new(None),
            sink: None,
        }
    }

    /// Attach the alerting collaborator. The sink is invoked synchronously
    /// within `record` for flagged and blocked transactions.
    pub fn with_alert_sink(mut self, sink: Box<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Record a scored transaction into every applicable window.
    pub fn record(&self, stx: ScoredTransaction) {
        if let Ok(mut first) = self.first_record.write() {
            first.get_or_insert_with(Instant::now);
        }

        if let Ok(mut full) = self.full.write() {
            push_bounded(&mut full, stx.clone(), self.capacities.full);
        }

        if let Ok(mut history) = self.history.write() {
            push_bounded(&mut history, stx.risk_score, self.capacities.history);
        }

        // Only the suspicious tier feeds the watchlist; blocked
        // transactions are tracked through the counters instead.
        if stx.tier == Tier::Suspicious {
            if let Ok(mut high_risk) = self.high_risk.write() {
                push_bounded(&mut high_risk, stx.clone(), self.capacities.high_risk);
            }
        }

        self.total_processed.fetch_add(1, Ordering::Relaxed);
        if stx.tier == Tier::Blocked {
            self.total_blocked.fetch_add(1, Ordering::Relaxed);
        }

        if stx.tier.triggers_alert() {
            if let Some(sink) = &self.sink {
                sink.notify(RiskAlert::new(stx));
            }
        }
    }

    /// Derive current statistics. Nothing is cached; every value reflects
    /// the records that completed before this call.
    pub fn snapshot(&self) -> Metrics {
        let total_processed = self.total_processed.load(Ordering::Relaxed);
        let total_blocked = self.total_blocked.load(Ordering::Relaxed);

        let fraud_rate = if total_processed > 0 {
            total_blocked as f64 / total_processed as f64
        } else {
            0.0
        };

        let elapsed_minutes = self
            .first_record
            .read()
            .ok()
            .and_then(|first| first.map(|t| t.elapsed().as_secs_f64() / 60.0))
            .unwrap_or(0.0)
            .max(1.0);
        let processing_rate = total_processed as f64 / elapsed_minutes;

        let (critical_count, recent_transactions) = match self.full.read() {
            Ok(full) => (
                full.iter().filter(|stx| stx.tier == Tier::Blocked).count(),
                full.iter().take(RECENT_VIEW).cloned().collect(),
            ),
            Err(_) => (0, Vec::new()),
        };

        let (high_risk_count, recent_high_risk) = match self.high_risk.read() {
            Ok(watchlist) => (
                watchlist.len(),
                watchlist.iter().take(RECENT_VIEW).cloned().collect(),
            ),
            Err(_) => (0, Vec::new()),
        };

        let recent_scores = match self.history.read() {
            Ok(history) => history.iter().take(RECENT_VIEW).copied().collect(),
            Err(_) => Vec::new(),
        };

        Metrics {
            total_processed,
            total_blocked,
            fraud_rate,
            high_risk_count,
            critical_count,
            processing_rate,
            recent_transactions,
            recent_high_risk,
            recent_scores,
        }
    }

    /// Current length of the full-feed window.
    pub fn window_len(&self) -> usize {
        self.full.read().map(|w| w.len()).unwrap_or(0)
    }
}

/// Insert at the head, evicting from the tail once at capacity.
fn push_bounded<T>(window: &mut VecDeque<T>, item: T, capacity: usize) {
    window.push_front(item);
    while window.len() > capacity {
        window.pop_back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::ChannelSink;
    use crate::types::Transaction;

    fn scored(hash: &str, score: u8, tier: Tier) -> ScoredTransaction {
        ScoredTransaction {
            transaction: Transaction::new(hash, "0xaaa", "0xbbb"),
            risk_score: score,
            tier,
            flags: Vec::new(),
            degraded: false,
        }
    }

    fn capacities(full: usize, history: usize, high_risk: usize) -> WindowCapacities {
        WindowCapacities {
            full,
            history,
            high_risk,
        }
    }

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let aggregator = StreamAggregator::new(WindowCapacities::default());
        let metrics = aggregator.snapshot();
        assert_eq!(metrics.total_processed, 0);
        assert_eq!(metrics.fraud_rate, 0.0);
        assert_eq!(metrics.processing_rate, 0.0);
        assert_eq!(metrics.high_risk_count, 0);
        assert_eq!(metrics.critical_count, 0);
        assert!(metrics.recent_transactions.is_empty());
    }

    #[test]
    fn test_window_bounded_with_recency_order() {
        let aggregator = StreamAggregator::new(capacities(5, 5, 5));
        for i in 0..8 {
            aggregator.record(scored(&format!("0x{}", i), 10, Tier::Approved));
        }

        assert_eq!(aggregator.window_len(), 5);
        let metrics = aggregator.snapshot();
        let hashes: Vec<&str> = metrics
            .recent_transactions
            .iter()
            .map(|stx| stx.transaction.hash.as_str())
            .collect();
        // Newest first; 0x0..0x2 were evicted.
        assert_eq!(hashes, vec!["0x7", "0x6", "0x5", "0x4", "0x3"]);
    }

    #[test]
    fn test_fraud_rate() {
        let aggregator = StreamAggregator::new(WindowCapacities::default());
        for i in 0..8 {
            aggregator.record(scored(&format!("0xa{}", i), 10, Tier::Approved));
        }
        aggregator.record(scored("0xb1", 80, Tier::Blocked));
        aggregator.record(scored("0xb2", 90, Tier::Blocked));

        let metrics = aggregator.snapshot();
        assert_eq!(metrics.total_processed, 10);
        assert_eq!(metrics.total_blocked, 2);
        assert!((metrics.fraud_rate - 0.2).abs() < f64::EPSILON);
        assert_eq!(metrics.critical_count, 2);
    }

    #[test]
    fn test_only_suspicious_feeds_watchlist() {
        let aggregator = StreamAggregator::new(WindowCapacities::default());
        aggregator.record(scored("0x1", 10, Tier::Approved));
        aggregator.record(scored("0x2", 40, Tier::Suspicious));
        aggregator.record(scored("0x3", 67, Tier::Flagged));
        aggregator.record(scored("0x4", 90, Tier::Blocked));

        let metrics = aggregator.snapshot();
        assert_eq!(metrics.high_risk_count, 1);
        assert_eq!(metrics.recent_high_risk[0].transaction.hash, "0x2");
    }

    #[test]
    fn test_all_approved_stream() {
        let aggregator = StreamAggregator::new(WindowCapacities::default());
        for i in 0..100 {
            aggregator.record(scored(&format!("0x{}", i), 5, Tier::Approved));
        }
        let metrics = aggregator.snapshot();
        assert_eq!(metrics.fraud_rate, 0.0);
        assert_eq!(metrics.high_risk_count, 0);
        assert_eq!(metrics.critical_count, 0);
    }

    #[test]
    fn test_processing_rate_floors_at_one_minute() {
        let aggregator = StreamAggregator::new(WindowCapacities::default());
        for i in 0..60 {
            aggregator.record(scored(&format!("0x{}", i), 5, Tier::Approved));
        }
        // A burst recorded in well under a minute must not divide by a
        // tiny elapsed time.
        let metrics = aggregator.snapshot();
        assert!(metrics.processing_rate <= 60.0);
        assert!(metrics.processing_rate > 0.0);
    }

    #[test]
    fn test_alert_hook_fires_for_flagged_and_blocked() {
        let (sink, mut receiver) = ChannelSink::new();
        let aggregator =
            StreamAggregator::new(WindowCapacities::default()).with_alert_sink(Box::new(sink));

        aggregator.record(scored("0x1", 10, Tier::Approved));
        aggregator.record(scored("0x2", 40, Tier::Suspicious));
        aggregator.record(scored("0x3", 67, Tier::Flagged));
        aggregator.record(scored("0x4", 90, Tier::Blocked));

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.transaction.transaction.hash, "0x3");
        let second = receiver.try_recv().unwrap();
        assert_eq!(second.transaction.transaction.hash, "0x4");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_score_history_window() {
        let aggregator = StreamAggregator::new(capacities(10, 3, 10));
        for score in [10, 20, 30, 40] {
            aggregator.record(scored(&format!("0x{}", score), score, Tier::Approved));
        }
        let metrics = aggregator.snapshot();
        assert_eq!(metrics.recent_scores, vec![40, 30, 20]);
    }
}
