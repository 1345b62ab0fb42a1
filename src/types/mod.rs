//! Core data types shared across the pipeline

pub mod scored;
pub mod transaction;

pub use scored::{ScoredTransaction, Tier};
pub use transaction::Transaction;
