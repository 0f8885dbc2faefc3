//! Test Patient Record Producer
//!
//! Generates and publishes synthetic patient records to NATS for pipeline
//! testing.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Patient record structure matching the pipeline's expected format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatientRecord {
    record_id: String,
    pregnancies: Option<u32>,
    glucose: Option<f64>,
    blood_pressure: Option<f64>,
    skin_thickness: Option<f64>,
    insulin: Option<f64>,
    bmi: Option<f64>,
    diabetes_pedigree: Option<f64>,
    age: Option<u32>,
    timestamp: chrono::DateTime<Utc>,
}

/// Patient record generator for testing
struct RecordGenerator {
    rng: rand::rngs::ThreadRng,
    record_counter: u64,
}

impl RecordGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            record_counter: 0,
        }
    }

    /// Generate a record jittered around a low-risk patient profile
    fn generate_low_risk(&mut self) -> PatientRecord {
        self.record_counter += 1;

        PatientRecord {
            record_id: format!("rec_{:012}", self.record_counter),
            pregnancies: Some(self.rng.gen_range(0..4)),
            glucose: Some(self.rng.gen_range(80.0..110.0)),   // Normal fasting range
            blood_pressure: Some(self.rng.gen_range(65.0..85.0)),
            skin_thickness: Some(self.rng.gen_range(20.0..32.0)),
            insulin: Some(self.rng.gen_range(60.0..110.0)),
            bmi: Some(self.rng.gen_range(19.0..25.0)),        // Healthy BMI
            diabetes_pedigree: Some(self.rng.gen_range(0.08..0.4)),
            age: Some(self.rng.gen_range(21..40)),
            timestamp: Utc::now(),
        }
    }

    /// Generate a record jittered around a high-risk patient profile
    fn generate_high_risk(&mut self) -> PatientRecord {
        self.record_counter += 1;

        PatientRecord {
            record_id: format!("rec_{:012}", self.record_counter),
            pregnancies: Some(self.rng.gen_range(0..12)),
            glucose: Some(self.rng.gen_range(130.0..200.0)),  // Elevated glucose
            blood_pressure: Some(self.rng.gen_range(70.0..100.0)),
            skin_thickness: Some(self.rng.gen_range(28.0..45.0)),
            insulin: Some(self.rng.gen_range(100.0..300.0)),  // Elevated insulin
            bmi: Some(self.rng.gen_range(30.0..45.0)),        // Obese range
            diabetes_pedigree: Some(self.rng.gen_range(0.4..1.5)), // Family history
            age: Some(self.rng.gen_range(40..70)),
            timestamp: Utc::now(),
        }
    }

    /// Drop a random subset of attributes to exercise graceful degradation
    fn sparsify(&mut self, mut record: PatientRecord) -> PatientRecord {
        if self.rng.gen_bool(0.5) {
            record.glucose = None;
        }
        if self.rng.gen_bool(0.5) {
            record.insulin = None;
        }
        if self.rng.gen_bool(0.3) {
            record.bmi = None;
        }
        if self.rng.gen_bool(0.3) {
            record.blood_pressure = None;
        }
        record
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Patient Record Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("patients.records");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let high_risk_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let sparse_rate: f64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(6).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        high_risk_rate = high_risk_rate,
        sparse_rate = sparse_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            // Continue in dry-run mode
            return run_dry_mode(count, high_risk_rate, sparse_rate, delay_ms).await;
        }
    };

    // Generate and publish records
    let mut generator = RecordGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} patient records...", count);

    let mut low_risk_count = 0;
    let mut high_risk_count = 0;

    for i in 0..count {
        let mut record = if rng.gen_bool(high_risk_rate) {
            high_risk_count += 1;
            generator.generate_high_risk()
        } else {
            low_risk_count += 1;
            generator.generate_low_risk()
        };

        if rng.gen_bool(sparse_rate) {
            record = generator.sparsify(record);
        }

        let payload = serde_json::to_vec(&record)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} records ({} low risk, {} high risk)",
                i + 1,
                count,
                low_risk_count,
                high_risk_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} records ({} low risk, {} high risk)",
        count, low_risk_count, high_risk_count
    );

    Ok(())
}

async fn run_dry_mode(
    count: u64,
    high_risk_rate: f64,
    sparse_rate: f64,
    delay_ms: u64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RecordGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let mut record = if rng.gen_bool(high_risk_rate) {
            generator.generate_high_risk()
        } else {
            generator.generate_low_risk()
        };

        if rng.gen_bool(sparse_rate) {
            record = generator.sparsify(record);
        }

        let json = serde_json::to_string_pretty(&record)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample record {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
