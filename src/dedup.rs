//! Idempotent ingestion by transaction identifier.
//!
//! Each identifier transitions `unseen -> seen` exactly once; repeats are
//! no-ops for every window and counter downstream. The seen set is bounded:
//! once the cap is reached the oldest identifier is evicted, trading the
//! chance of re-processing a very old duplicate for bounded memory.

use crate::error::EngineError;
use crate::types::Transaction;
use std::collections::{HashSet, VecDeque};

pub struct IngestionDeduplicator {
    seen: HashSet<String>,
    insertion_order: VecDeque<String>,
    capacity: usize,
}

impl IngestionDeduplicator {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity.min(4096)),
            insertion_order: VecDeque::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
        }
    }

    /// Admit a transaction, returning whether it was seen for the first
    /// time. A missing identifier is the one checked failure in the
    /// pipeline and is rejected before any scoring happens.
    pub fn ingest(&mut self, tx: &Transaction) -> Result<bool, EngineError> {
        if tx.hash.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "transaction is missing an identifier".to_string(),
            ));
        }

        if self.seen.contains(&tx.hash) {
            return Ok(false);
        }

        if self.insertion_order.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(tx.hash.clone());
        self.insertion_order.push_back(tx.hash.clone());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
