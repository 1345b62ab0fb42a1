//! Feature extraction for anomaly-model inference.
//!
//! Derives a fixed-size numeric vector from a raw transaction. Extraction
//! is total: malformed numerics coerce to zero, so a bad record can never
//! stall the ingestion pipeline.

use crate::types::Transaction;
use chrono::{DateTime, Datelike, Timelike};

/// Number of features produced per transaction.
pub const FEATURE_COUNT: usize = 10;

/// Amounts that are an exact multiple of this unit (in native units) count
/// as "round" — a cheap bot-behavior heuristic.
pub const ROUND_UNIT: f64 = 10.0;

const ROUND_EPSILON: f64 = 1e-6;

/// Transforms transactions into model input features.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a transaction. Never fails.
    pub fn extract(&self, tx: &Transaction) -> Vec<f32> {
        let mut features = Vec::with_capacity(FEATURE_COUNT);

        let value = sanitize_amount(tx.value);
        let (hour, weekday) = hour_and_weekday(tx.timestamp);

        features.push(value.ln_1p() as f32);
        features.push(hour as f32);
        features.push(weekday as f32);
        features.push(if tx.is_error { 1.0 } else { 0.0 });
        features.push(if is_round_amount(value, ROUND_UNIT) { 1.0 } else { 0.0 });
        features.push(if value > 0.0 && value < 0.001 { 1.0 } else { 0.0 });
        features.push(tx.from.len() as f32);
        features.push(tx.to.len() as f32);
        features.push(zero_nibbles(&tx.from) as f32);
        features.push(zero_nibbles(&tx.to) as f32);

        features
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        vec![
            "value_log1p",
            "hour_of_day",
            "day_of_week",
            "is_error",
            "is_round",
            "is_dust",
            "from_addr_len",
            "to_addr_len",
            "from_zero_nibbles",
            "to_zero_nibbles",
        ]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce non-finite or negative amounts to zero.
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// True when `value` is a positive exact multiple of `unit`.
pub fn is_round_amount(value: f64, unit: f64) -> bool {
    if value <= 0.0 || unit <= 0.0 {
        return false;
    }
    let multiples = value / unit;
    (multiples - multiples.round()).abs() * unit < ROUND_EPSILON
}

fn hour_and_weekday(timestamp: i64) -> (u32, u32) {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => (dt.hour(), dt.weekday().num_days_from_monday()),
        None => (0, 0),
    }
}

/// Count of zero nibbles in an address, ignoring the 0x prefix. Many zeros
/// suggest a contract or vanity address.
pub fn zero_nibbles(address: &str) -> usize {
    address
        .strip_prefix("0x")
        .unwrap_or(address)
        .chars()
        .filter(|&c| c == '0')
        .count()
}
