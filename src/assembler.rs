//! Snapshot assembler
//!
//! Resolves every configured metric once and freezes the results into a
//! [`Snapshot`]. Raw metrics are resolved first; derived metrics are computed
//! afterwards from the raw values.

use crate::{
    constants::DEFAULT_FETCH_CONCURRENCY,
    metrics::MetricsCollector,
    provider::QuoteProvider,
    resolver::{FallbackResolver, Resolution},
    snapshot::{Snapshot, SnapshotEntry},
    types::MetricSpec,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Builds snapshots from a static metric configuration
///
/// # Example
/// ```no_run
/// use market_snapshot::{catalog, HttpQuoteProvider, SnapshotAssembler};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(HttpQuoteProvider::new()?);
/// let assembler = SnapshotAssembler::new(provider, catalog::default_metrics(Duration::from_secs(15)));
/// let snapshot = assembler.assemble().await;
/// println!("{}", snapshot.to_json_pretty()?);
/// # Ok(())
/// # }
/// ```
pub struct SnapshotAssembler {
    provider: Arc<dyn QuoteProvider>,
    metrics: Vec<MetricSpec>,
    concurrency: usize,
}

impl SnapshotAssembler {
    /// Creates an assembler resolving metrics one at a time
    pub fn new(provider: Arc<dyn QuoteProvider>, metrics: Vec<MetricSpec>) -> Self {
        Self {
            provider,
            metrics,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Allows up to `concurrency` raw metrics to resolve at the same time
    ///
    /// Providers within one metric are still tried strictly in order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    /// Runs one resolution pass over every configured metric
    ///
    /// Never fails: metrics whose providers all fail, or whose inputs are
    /// missing, are recorded as unavailable.
    pub async fn assemble(&self) -> Snapshot {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("snapshot_run", %run_id);
        self.assemble_inner().instrument(span).await
    }

    async fn assemble_inner(&self) -> Snapshot {
        let collector = Arc::new(MetricsCollector::new());
        let resolver = FallbackResolver::with_metrics(self.provider.clone(), collector.clone());

        let (derived, raw): (Vec<&MetricSpec>, Vec<&MetricSpec>) =
            self.metrics.iter().partition(|m| m.is_derived());

        tracing::info!(
            raw = raw.len(),
            derived = derived.len(),
            concurrency = self.concurrency,
            "Resolving market snapshot"
        );

        // `buffered` yields results in input order
        let resolutions: Vec<Resolution> = stream::iter(raw.iter().copied())
            .map(|metric| resolver.resolve(metric))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut entries = Vec::with_capacity(self.metrics.len());
        let mut resolved: HashMap<String, f64> = HashMap::new();

        for (metric, resolution) in raw.iter().zip(resolutions) {
            match resolution {
                Resolution::Primary { value, source }
                | Resolution::Fallback { value, source, .. } => {
                    resolved.insert(metric.name.clone(), value);
                    entries.push(SnapshotEntry::available(&metric.name, value, source));
                }
                Resolution::Unavailable { .. } => {
                    entries.push(SnapshotEntry::unavailable(&metric.name));
                }
            }
        }

        for metric in derived {
            let Some(rule) = &metric.derivation else {
                continue;
            };

            match rule.apply(&resolved) {
                Ok(value) => {
                    tracing::debug!(metric = %metric.name, value, "Derived metric computed");
                    entries.push(SnapshotEntry::available(
                        &metric.name,
                        value,
                        format!("derived:{}", rule.name),
                    ));
                }
                Err(e) => {
                    tracing::warn!(
                        metric = %metric.name,
                        kind = %e.kind(),
                        error = %e,
                        "Derived metric unavailable"
                    );
                    entries.push(SnapshotEntry::unavailable(&metric.name));
                }
            }
        }

        let snapshot = Snapshot::from_entries(entries);
        collector.log_summary().await;

        if snapshot.is_empty_of_data() {
            tracing::warn!(
                metrics = snapshot.len(),
                "No metric could be resolved, snapshot is empty of data"
            );
        } else {
            tracing::info!(
                metrics = snapshot.len(),
                unavailable = snapshot.unavailable_count(),
                "Snapshot assembled"
            );
        }

        snapshot
    }
}
