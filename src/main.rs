//! Diabetes Risk Pipeline - Main Entry Point
//!
//! Consumes patient records from NATS, derives model features, runs ML
//! inference, and publishes risk assessments. Supports parallel record
//! processing for high throughput.

use anyhow::Result;
use diabetes_risk_pipeline::{
    classifier::Prediction,
    config::{AppConfig, LoggingConfig},
    consumer::RecordConsumer,
    feature_deriver::FeatureDeriver,
    metrics::{MetricsReporter, PipelineMetrics},
    models::inference::InferenceEngine,
    producer::AssessmentProducer,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.clone()));

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_tracing(&config.logging);

    info!("Starting Diabetes Risk Pipeline");
    info!(
        "Verdict threshold: {:.3}, risk tiers: moderate>=0.30, high>=0.45, very_high>=0.60",
        config.detection.threshold
    );

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Initialize components
    let feature_deriver = Arc::new(FeatureDeriver::new());
    info!(
        "Feature deriver initialized ({} features)",
        feature_deriver.feature_count()
    );

    // Initialize inference engine with the ONNX model
    let inference_engine = Arc::new(InferenceEngine::new(&config)?);
    info!(
        "Inference engine initialized with model: {}",
        inference_engine.model_name()
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = RecordConsumer::new(client.clone(), &config.nats.record_subject);
    let producer = Arc::new(AssessmentProducer::new(
        client.clone(),
        &config.nats.assessment_subject,
    ));

    // Parallel processing configuration
    let num_workers = config.pipeline.workers;
    info!(
        "Starting record processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.record_subject);
    info!("Publishing assessments to: {}", config.nats.assessment_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Wrap config in Arc for sharing
    let config = Arc::new(config);

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process records in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let feature_deriver = feature_deriver.clone();
        let inference_engine = inference_engine.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let config = config.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this record
        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<diabetes_risk_pipeline::PatientRecord>(&message.payload)
            {
                Ok(record) => {
                    let record_id = record.record_id.clone();

                    // Derive the model input vector
                    let features = feature_deriver.vector(&record);

                    // Run inference
                    match inference_engine.predict(&features) {
                        Ok(probability) => {
                            let processing_time = start_time.elapsed();

                            // Classify the probability. An out-of-range value
                            // is a model-boundary bug and is never clamped.
                            let prediction = match Prediction::evaluate(
                                probability,
                                config.detection.threshold,
                            ) {
                                Ok(prediction) => prediction,
                                Err(e) => {
                                    error!(
                                        record_id = %record_id,
                                        probability = probability,
                                        error = %e,
                                        "Model returned an invalid probability"
                                    );
                                    drop(permit);
                                    return;
                                }
                            };

                            // Record metrics
                            metrics.record_prediction(processing_time, prediction.probability);

                            let assessment =
                                prediction.to_assessment(&record, config.detection.threshold);
                            metrics.record_assessment(
                                &assessment.risk_tier.to_string(),
                                assessment.diabetes,
                            );

                            if let Err(e) = producer.publish(&assessment).await {
                                error!(
                                    record_id = %record_id,
                                    error = %e,
                                    "Failed to publish risk assessment"
                                );
                            } else if assessment.diabetes {
                                info!(
                                    record_id = %record_id,
                                    probability = prediction.probability,
                                    risk_tier = %prediction.risk_tier,
                                    processing_time_us = processing_time.as_micros(),
                                    "Positive diabetes verdict published"
                                );
                            } else {
                                debug!(
                                    record_id = %record_id,
                                    probability = prediction.probability,
                                    risk_tier = %prediction.risk_tier,
                                    processing_time_us = processing_time.as_micros(),
                                    "Assessment published (below threshold)"
                                );
                            }

                            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                            // Log progress every 100 records
                            if count % 100 == 0 {
                                let throughput = metrics.get_throughput();
                                let processing_stats = metrics.get_processing_stats();
                                info!(
                                    processed = count,
                                    throughput = format!("{:.1} rec/s", throughput),
                                    avg_latency_us = processing_stats.mean_us,
                                    "Processing milestone"
                                );
                            }
                        }
                        Err(e) => {
                            error!(
                                record_id = %record_id,
                                error = %e,
                                "Inference failed"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize patient record");
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}
