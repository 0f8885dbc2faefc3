//! Configuration management for the diabetes risk pipeline

use crate::classifier::DEFAULT_THRESHOLD;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming patient records
    pub record_subject: String,
    /// Subject for outgoing risk assessments
    pub assessment_subject: String,
}

/// ML model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Model name used in logs
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_path() -> String {
    "models/diabetes_rf.onnx".to_string()
}

fn default_model_name() -> String {
    "random_forest".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Probability threshold for the diabetes verdict. Risk tier bounds are
    /// fixed by the model's calibration and are not configurable.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent worker tasks
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                record_subject: "patients.records".to_string(),
                assessment_subject: "risk.assessments".to_string(),
            },
            model: ModelConfig {
                path: default_model_path(),
                name: default_model_name(),
                onnx_threads: 1,
            },
            detection: DetectionConfig {
                threshold: DEFAULT_THRESHOLD,
            },
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.detection.threshold, 0.532);
        assert_eq!(config.model.name, "random_forest");
        assert_eq!(config.pipeline.workers, 4);
    }

    #[test]
    fn test_default_threshold_matches_classifier() {
        assert_eq!(default_threshold(), DEFAULT_THRESHOLD);
    }
}
