//! Risk scoring: rule evaluation and tier classification

pub mod classifier;
pub mod rules;

pub use classifier::Classifier;
pub use rules::RiskScorer;
