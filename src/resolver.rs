//! Ordered provider fallback for a single metric

use crate::{
    error::{FailureKind, ProviderError},
    metrics::MetricsCollector,
    provider::QuoteProvider,
    types::{MetricSpec, RawObservation},
};
use std::sync::Arc;
use std::time::Instant;

/// One failed provider attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub source: String,
    pub error: ProviderError,
}

impl ProviderFailure {
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

/// Outcome of resolving one metric
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The primary provider answered
    Primary { value: f64, source: String },
    /// A lower-priority provider answered after earlier ones failed
    Fallback {
        value: f64,
        source: String,
        failures: Vec<ProviderFailure>,
    },
    /// Every provider failed
    Unavailable { failures: Vec<ProviderFailure> },
}

impl Resolution {
    pub fn value(&self) -> Option<f64> {
        match self {
            Resolution::Primary { value, .. } | Resolution::Fallback { value, .. } => Some(*value),
            Resolution::Unavailable { .. } => None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Resolution::Primary { source, .. } | Resolution::Fallback { source, .. } => {
                Some(source)
            }
            Resolution::Unavailable { .. } => None,
        }
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Resolution::Primary { .. } => &[],
            Resolution::Fallback { failures, .. } | Resolution::Unavailable { failures } => {
                failures
            }
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Resolution::Unavailable { .. })
    }
}

/// Resolves a metric by trying its providers in configured order until one
/// succeeds.
///
/// Providers after the first success are never called. The configured order
/// is never changed at runtime, and nothing is cached between attempts.
pub struct FallbackResolver {
    provider: Arc<dyn QuoteProvider>,
    metrics: Arc<MetricsCollector>,
}

impl FallbackResolver {
    /// Creates a resolver with its own metrics collector
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self::with_metrics(provider, Arc::new(MetricsCollector::new()))
    }

    /// Creates a resolver recording attempts into `metrics`
    pub fn with_metrics(provider: Arc<dyn QuoteProvider>, metrics: Arc<MetricsCollector>) -> Self {
        Self { provider, metrics }
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Resolves one raw metric
    pub async fn resolve(&self, metric: &MetricSpec) -> Resolution {
        let mut failures = Vec::new();

        for spec in &metric.providers {
            let start = Instant::now();
            let observation = self.provider.observe(spec).await;

            // Guard against providers that break the finite-value contract
            let observation = match observation {
                RawObservation::Success { value, source } if !value.is_finite() => {
                    RawObservation::failure(source, ProviderError::NonFinite(value))
                }
                other => other,
            };

            self.metrics
                .record_attempt(&spec.id, start.elapsed(), observation.is_success())
                .await;

            match observation {
                RawObservation::Success { value, source } => {
                    tracing::debug!(
                        metric = %metric.name,
                        provider = %source,
                        value,
                        fallbacks = failures.len(),
                        "Metric resolved"
                    );
                    return if failures.is_empty() {
                        Resolution::Primary { value, source }
                    } else {
                        Resolution::Fallback {
                            value,
                            source,
                            failures,
                        }
                    };
                }
                RawObservation::Failure { source, error } => {
                    tracing::warn!(
                        metric = %metric.name,
                        provider = %source,
                        kind = %error.kind(),
                        error = %error,
                        "Provider failed, trying next"
                    );
                    failures.push(ProviderFailure { source, error });
                }
            }
        }

        tracing::warn!(
            metric = %metric.name,
            attempts = failures.len(),
            "All providers failed, metric unavailable"
        );
        Resolution::Unavailable { failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::types::{ProviderSpec, ResponseFormat};

    fn metric(ids: &[&str]) -> MetricSpec {
        let providers = ids
            .iter()
            .map(|id| {
                ProviderSpec::new(
                    *id,
                    "https://example.com/quote",
                    ResponseFormat::json("price"),
                )
            })
            .collect();
        MetricSpec::raw("test-metric", providers)
    }

    #[tokio::test]
    async fn test_primary_success_short_circuits() {
        let mock = Arc::new(MockProvider::new());
        mock.set_value("a", 1.5);
        mock.set_value("b", 2.5);
        mock.set_value("c", 3.5);

        let resolver = FallbackResolver::new(mock.clone());
        let resolution = resolver.resolve(&metric(&["a", "b", "c"])).await;

        assert_eq!(
            resolution,
            Resolution::Primary {
                value: 1.5,
                source: "a".to_string()
            }
        );
        assert_eq!(mock.call_count("a"), 1);
        assert_eq!(mock.call_count("b"), 0);
        assert_eq!(mock.call_count("c"), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_second_provider() {
        let mock = Arc::new(MockProvider::new());
        mock.set_error("a", ProviderError::Timeout(std::time::Duration::from_secs(15)));
        mock.set_value("b", 17654.32);
        mock.set_value("c", 1.0);

        let resolver = FallbackResolver::new(mock.clone());
        let resolution = resolver.resolve(&metric(&["a", "b", "c"])).await;

        assert_eq!(resolution.value(), Some(17654.32));
        assert_eq!(resolution.source(), Some("b"));
        assert_eq!(resolution.failures().len(), 1);
        assert_eq!(resolution.failures()[0].source, "a");
        assert_eq!(resolution.failures()[0].kind(), FailureKind::NetworkError);
        assert_eq!(mock.call_count("c"), 0);
    }

    #[tokio::test]
    async fn test_all_providers_fail() {
        let mock = Arc::new(MockProvider::new());
        mock.set_error("a", ProviderError::HttpStatus { status: 503 });
        mock.set_error("b", ProviderError::invalid_response("<html>"));
        mock.set_error("c", ProviderError::missing_field("Close"));

        let resolver = FallbackResolver::new(mock.clone());
        let resolution = resolver.resolve(&metric(&["a", "b", "c"])).await;

        assert!(!resolution.is_available());
        assert_eq!(resolution.value(), None);
        assert_eq!(resolution.source(), None);
        let kinds: Vec<FailureKind> = resolution.failures().iter().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::NetworkError,
                FailureKind::ParseError,
                FailureKind::MissingField
            ]
        );
        assert_eq!(mock.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_no_providers_is_unavailable() {
        let mock = Arc::new(MockProvider::new());
        let resolver = FallbackResolver::new(mock.clone());

        let resolution = resolver.resolve(&metric(&[])).await;
        assert_eq!(resolution, Resolution::Unavailable { failures: vec![] });
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_finite_success_triggers_fallback() {
        let mock = Arc::new(MockProvider::new());
        mock.set_value("a", f64::NAN);
        mock.set_value("b", 7.2);

        let resolver = FallbackResolver::new(mock.clone());
        let resolution = resolver.resolve(&metric(&["a", "b"])).await;

        assert_eq!(resolution.source(), Some("b"));
        assert_eq!(resolution.failures()[0].kind(), FailureKind::NonFinite);
    }

    #[tokio::test]
    async fn test_attempts_are_recorded() {
        let mock = Arc::new(MockProvider::new());
        mock.set_error("a", ProviderError::NetworkError("refused".to_string()));
        mock.set_value("b", 1.0);

        let resolver = FallbackResolver::new(mock);
        resolver.resolve(&metric(&["a", "b"])).await;

        let metrics = resolver.metrics().get_metrics().await;
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].provider_id, "a");
        assert_eq!(metrics[0].failed_requests, 1);
        assert_eq!(metrics[1].provider_id, "b");
        assert_eq!(metrics[1].failed_requests, 0);
    }
}
