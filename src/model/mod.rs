//! Anomaly model boundary: the trait the engine consumes, plus the
//! ONNX-backed implementation used in production.

pub mod onnx;
pub mod scorer;

pub use onnx::OnnxScorer;
pub use scorer::{AnomalyScorer, NullScorer};
