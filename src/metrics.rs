//! Provider attempt metrics for a single resolution run
//!
//! Tracks latency percentiles and success rates per provider id. A collector
//! lives for one run only; nothing is carried between runs.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Metrics for a single provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMetrics {
    /// Provider id
    pub provider_id: String,
    /// 50th percentile latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of attempts
    pub total_requests: u64,
    /// Number of failed attempts
    pub failed_requests: u64,
}

/// Internal sample for latency tracking
#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

/// Collects attempt samples keyed by provider id
#[derive(Default)]
pub struct MetricsCollector {
    samples: RwLock<HashMap<String, Vec<LatencySample>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one provider attempt
    pub async fn record_attempt(&self, provider_id: &str, duration: Duration, success: bool) {
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let mut samples = self.samples.write().await;
        samples
            .entry(provider_id.to_string())
            .or_default()
            .push(LatencySample {
                duration_ms,
                success,
            });
    }

    /// Computes metrics for every provider seen, ordered by provider id
    pub async fn get_metrics(&self) -> Vec<ProviderMetrics> {
        let samples = self.samples.read().await;

        let mut result: Vec<ProviderMetrics> = samples
            .iter()
            .map(|(provider_id, samples)| summarize(provider_id, samples))
            .collect();
        result.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        result
    }

    /// Logs one line per provider
    pub async fn log_summary(&self) {
        for m in self.get_metrics().await {
            tracing::info!(
                provider = %m.provider_id,
                requests = m.total_requests,
                failed = m.failed_requests,
                success_rate = m.success_rate,
                latency_p50_ms = m.latency_p50_ms,
                latency_p99_ms = m.latency_p99_ms,
                "Provider summary"
            );
        }
    }
}

fn summarize(provider_id: &str, samples: &[LatencySample]) -> ProviderMetrics {
    let total = samples.len() as u64;
    let failed = samples.iter().filter(|s| !s.success).count() as u64;

    // Extract successful latencies for percentile calculation
    let mut latencies: Vec<f64> = samples
        .iter()
        .filter(|s| s.success)
        .map(|s| s.duration_ms)
        .collect();
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let success_rate = if total > 0 {
        (total - failed) as f64 / total as f64
    } else {
        1.0
    };

    ProviderMetrics {
        provider_id: provider_id.to_string(),
        latency_p50_ms: percentile(&latencies, 50.0),
        latency_p99_ms: percentile(&latencies, 99.0),
        success_rate,
        total_requests: total,
        failed_requests: failed,
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
