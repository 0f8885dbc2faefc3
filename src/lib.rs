//! Diabetes Risk Assessment Pipeline Library
//!
//! A streaming diabetes risk scoring pipeline: derives engineered model
//! features from raw patient records, runs ONNX model inference, and
//! classifies the predicted probability into a binary verdict and a
//! clinical risk tier.

pub mod classifier;
pub mod config;
pub mod consumer;
pub mod feature_deriver;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod types;

pub use classifier::{classify, interpret, ClassifyError, Prediction, DEFAULT_THRESHOLD};
pub use config::AppConfig;
pub use consumer::RecordConsumer;
pub use feature_deriver::{EngineeredFeatures, FeatureDeriver};
pub use models::inference::InferenceEngine;
pub use producer::AssessmentProducer;
pub use types::{assessment::RiskAssessment, assessment::RiskTier, patient::PatientRecord};
