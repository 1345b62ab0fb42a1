//! ONNX-backed anomaly scorer.
//!
//! Wraps a pre-trained isolation-forest (or similar) model exported to
//! ONNX. The model outputs a decision-function value where negative means
//! outlier, matching the `AnomalyScorer` sign convention.

use crate::config::ModelConfig;
use crate::error::EngineError;
use crate::model::AnomalyScorer;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;

pub struct OnnxScorer {
    /// Session runs take `&mut`, so inference is serialized behind a lock.
    session: Mutex<Session>,
    input_name: String,
    latency_budget_ms: u64,
}

impl OnnxScorer {
    /// Load the model named in the configuration. Fails at startup, never
    /// during steady-state inference.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let path = config
            .path
            .as_ref()
            .context("Model path is not configured")?;

        ort::init().commit()?;
        info!(path = %path.display(), threads = config.onnx_threads, "Loading ONNX anomaly model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        info!(input = %input_name, "Anomaly model loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            latency_budget_ms: config.latency_budget_ms,
        })
    }
}

impl AnomalyScorer for OnnxScorer {
    fn infer(&self, features: &[f32]) -> Result<f64, EngineError> {
        let started = Instant::now();

        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| EngineError::ModelInference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| EngineError::ModelInference(format!("lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| EngineError::ModelInference(e.to_string()))?;

        let anomaly = extract_decision_value(&outputs)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if elapsed_ms > self.latency_budget_ms {
            return Err(EngineError::ModelTimeout {
                elapsed_ms,
                budget_ms: self.latency_budget_ms,
            });
        }

        Ok(anomaly)
    }
}

/// Pull the decision-function value out of the model outputs. Label
/// outputs are skipped; the first float tensor wins.
fn extract_decision_value(outputs: &ort::session::SessionOutputs) -> Result<f64, EngineError> {
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Ok((_shape, data)) = output.try_extract_tensor::<f32>() {
            if let Some(&value) = data.first() {
                return Ok(value as f64);
            }
        }
    }
    Err(EngineError::ModelInference(
        "no float output found in model response".to_string(),
    ))
}
