//! Performance metrics and statistics tracking for the assessment pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for pipeline performance
pub struct PipelineMetrics {
    /// Total patient records processed
    pub records_processed: AtomicU64,
    /// Total assessments published
    pub assessments_published: AtomicU64,
    /// Positive (diabetes) verdicts
    pub positive_verdicts: AtomicU64,
    /// Assessments by risk tier
    assessments_by_tier: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Predicted probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            records_processed: AtomicU64::new(0),
            assessments_published: AtomicU64::new(0),
            positive_verdicts: AtomicU64::new(0),
            assessments_by_tier: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a processed patient record
    pub fn record_prediction(&self, processing_time: Duration, probability: f64) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);

        // Record processing time
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        // Record probability bucket
        let bucket = (probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a published assessment
    pub fn record_assessment(&self, risk_tier: &str, positive: bool) {
        self.assessments_published.fetch_add(1, Ordering::Relaxed);
        if positive {
            self.positive_verdicts.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut by_tier) = self.assessments_by_tier.write() {
            *by_tier.entry(risk_tier.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (records per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.records_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Get assessments by risk tier
    pub fn get_assessments_by_tier(&self) -> HashMap<String, u64> {
        self.assessments_by_tier.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let record_count = self.records_processed.load(Ordering::Relaxed);
        let assessment_count = self.assessments_published.load(Ordering::Relaxed);
        let positive_count = self.positive_verdicts.load(Ordering::Relaxed);
        let positive_rate = if record_count > 0 {
            (positive_count as f64 / record_count as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_tier = self.get_assessments_by_tier();
        let prob_dist = self.get_probability_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          DIABETES RISK PIPELINE - METRICS SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Records Processed:      {:>8}  │  Throughput: {:>6.1} rec/s ║",
            record_count, throughput
        );
        info!(
            "║ Positive Verdicts:      {:>8}  │  Positive Rate: {:>5.1}%   ║",
            positive_count, positive_rate
        );
        info!(
            "║ Assessments Published:  {:>8}                              ║",
            assessment_count
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Assessments by Risk Tier:                                    ║");
        for (tier, count) in &by_tier {
            let pct = if assessment_count > 0 {
                (*count as f64 / assessment_count as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", tier, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Probability Distribution:                                    ║");
        let total: u64 = prob_dist.iter().sum();
        for (i, &count) in prob_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.5);
        metrics.record_prediction(Duration::from_micros(200), 0.8);
        metrics.record_assessment("VERY HIGH", true);
        metrics.record_assessment("LOW", false);

        assert_eq!(metrics.records_processed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.assessments_published.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.positive_verdicts.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_probability_distribution_buckets() {
        let metrics = PipelineMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.05);
        metrics.record_prediction(Duration::from_micros(100), 0.95);
        metrics.record_prediction(Duration::from_micros(100), 1.0);

        let dist = metrics.get_probability_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[9], 2); // 1.0 clamps into the top bucket
    }

    #[test]
    fn test_tier_counts() {
        let metrics = PipelineMetrics::new();

        metrics.record_assessment("HIGH", true);
        metrics.record_assessment("HIGH", true);
        metrics.record_assessment("LOW", false);

        let by_tier = metrics.get_assessments_by_tier();
        assert_eq!(by_tier.get("HIGH"), Some(&2));
        assert_eq!(by_tier.get("LOW"), Some(&1));
    }
}
