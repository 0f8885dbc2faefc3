//! Model inference for diabetes risk scoring

use crate::config::AppConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::debug;

/// ONNX-backed probability model for diabetes risk.
///
/// Owns a single session and exposes the model as an opaque function from
/// an eleven-feature vector to the positive-class probability. The rest of
/// the pipeline never sees tensors or output schemas.
pub struct InferenceEngine {
    /// Loaded ONNX model (wrapped in RwLock for interior mutability)
    model: RwLock<LoadedModel>,
}

impl InferenceEngine {
    /// Create a new inference engine from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.model.onnx_threads)?;
        let model = loader.load_model(&config.model.path, &config.model.name)?;

        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Create an inference engine from a model path directly
    pub fn with_model_path(path: &str) -> Result<Self> {
        let loader = ModelLoader::new()?;
        let model = loader.load_model(path, "random_forest")?;

        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Get the loaded model name
    pub fn model_name(&self) -> String {
        self.model
            .read()
            .map(|m| m.name.clone())
            .unwrap_or_default()
    }

    /// Run the model on a feature vector.
    ///
    /// Returns the raw class-1 probability as reported by the model. The
    /// classifier downstream rejects out-of-range values, so nothing is
    /// clamped here.
    pub fn predict(&self, features: &[f32]) -> Result<f64> {
        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        self.run_model(&mut model, features)
    }

    /// Run inference on a batch of feature vectors
    pub fn predict_batch(&self, feature_batch: &[Vec<f32>]) -> Vec<Result<f64>> {
        feature_batch.iter().map(|f| self.predict(f)).collect()
    }

    /// Run the session on a single feature vector
    fn run_model(&self, model: &mut LoadedModel, features: &[f32]) -> Result<f64> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let model_name = model.name.clone();

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])?;

        self.extract_probability(&outputs, &model.output_name, &model_name)
    }

    /// Extract the positive-class probability from the model output.
    /// Handles both tensor outputs and the seq(map(int64, float)) shape that
    /// scikit-learn's ZipMap export produces for RandomForest classifiers.
    fn extract_probability(
        &self,
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
        model_name: &str,
    ) -> Result<f64> {
        // First, try the probability output by name
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = self.positive_class_from_tensor(&shape, data);
                debug!(model = %model_name, prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = self.extract_from_sequence_map(output, model_name) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: iterate all outputs and try extraction
        for (name, output) in outputs.iter() {
            // Skip "label" output
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = self.positive_class_from_tensor(&shape, data);
                debug!(model = %model_name, output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = self.extract_from_sequence_map(&output, model_name) {
                    return Ok(prob);
                }
            }
        }

        // No silent fallback score: an unreadable output must surface as an
        // error so the caller never classifies a fabricated probability.
        anyhow::bail!(
            "No probability output could be extracted from model {}",
            model_name
        )
    }

    /// Extract probability from seq(map(int64, float)) format
    fn extract_from_sequence_map(
        &self,
        output: &ort::value::DynValue,
        model_name: &str,
    ) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            return Err(anyhow::anyhow!("Empty sequence"));
        }

        // Only batch_size=1 is ever submitted
        let map_value = &maps[0];

        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

        // Class 1 is the diabetes class
        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                debug!(
                    model = %model_name,
                    prob = *prob,
                    "Extracted from seq(map)"
                );
                return Ok(*prob as f64);
            }
        }

        // If no class 1, invert the class 0 probability
        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }

    /// Extract the positive-class probability from tensor data
    fn positive_class_from_tensor(&self, shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes] - class 1 probability
                return data[1] as f64;
            } else if num_classes == 1 {
                // [batch, 1] - single probability
                return data[0] as f64;
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        }

        // Fallback: last value
        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }
}
