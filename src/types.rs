//! Types for the market snapshot resolver

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::error::{DerivationError, FailureKind, ProviderError};
use reqwest::Url;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// How a provider response body is turned into a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON document, value at a dotted path (`quoteResponse.result.0.regularMarketPrice`)
    Json { path: String },
    /// CSV with a header row, value in the named column of the first data row
    Csv { column: String },
    /// Quote feed line `var x="a,b,c";`, value at the zero-based index of the quoted list
    QuotedList { index: usize },
}

impl ResponseFormat {
    pub fn json(path: impl Into<String>) -> Self {
        Self::Json { path: path.into() }
    }

    pub fn csv(column: impl Into<String>) -> Self {
        Self::Csv {
            column: column.into(),
        }
    }

    pub fn quoted_list(index: usize) -> Self {
        Self::QuotedList { index }
    }

    /// Human-readable locator, used in error messages
    pub fn locator(&self) -> String {
        match self {
            ResponseFormat::Json { path } => path.clone(),
            ResponseFormat::Csv { column } => format!("column {}", column),
            ResponseFormat::QuotedList { index } => format!("field #{}", index),
        }
    }
}

/// One data source for one raw metric
///
/// Stateless and reusable across runs. The endpoint is a template whose
/// `{name}` placeholders are filled from `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    /// Provider identity reported as the value's source
    pub id: String,
    /// Endpoint template
    pub endpoint: String,
    /// Values substituted into the endpoint template
    pub params: BTreeMap<String, String>,
    /// Response format and field locator
    pub format: ResponseFormat,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl ProviderSpec {
    /// Creates a provider spec with the default timeout
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>, format: ResponseFormat) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
            format,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            headers: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Fills the endpoint template and validates the result
    ///
    /// Fails when a placeholder has no parameter, the URL is malformed or
    /// not http(s), or the timeout is zero.
    pub fn render_url(&self) -> Result<Url, ProviderError> {
        if self.timeout.is_zero() {
            return Err(ProviderError::InvalidSpec(format!(
                "{}: timeout must be positive",
                self.id
            )));
        }

        let mut rendered = self.endpoint.clone();
        for (name, value) in &self.params {
            rendered = rendered.replace(&format!("{{{}}}", name), value);
        }

        if let Some(start) = rendered.find('{') {
            let rest = &rendered[start..];
            let end = rest.find('}').map(|i| i + 1).unwrap_or(rest.len());
            return Err(ProviderError::InvalidSpec(format!(
                "{}: unfilled placeholder {}",
                self.id,
                &rest[..end]
            )));
        }

        let url = Url::parse(&rendered)
            .map_err(|e| ProviderError::InvalidSpec(format!("{}: {}", self.id, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ProviderError::InvalidSpec(format!(
                "{}: unsupported scheme {}",
                self.id, other
            ))),
        }
    }
}

/// Pure function computing a derived value from its named inputs
pub type DerivationFn = fn(&BTreeMap<String, f64>) -> Result<f64, DerivationError>;

/// Rule for a metric computed from other (raw) metrics
#[derive(Clone)]
pub struct DerivationRule {
    /// Rule name, used in logs
    pub name: &'static str,
    /// Raw metric names the rule reads
    pub inputs: Vec<String>,
    compute: DerivationFn,
}

impl std::fmt::Debug for DerivationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivationRule")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl DerivationRule {
    pub fn new(name: &'static str, inputs: &[&str], compute: DerivationFn) -> Self {
        Self {
            name,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            compute,
        }
    }

    /// Evaluates the rule against resolved raw values
    ///
    /// The compute function only runs when every input is present and finite.
    pub fn apply(&self, resolved: &HashMap<String, f64>) -> Result<f64, DerivationError> {
        let mut inputs = BTreeMap::new();
        for name in &self.inputs {
            let value = *resolved
                .get(name)
                .ok_or_else(|| DerivationError::MissingInput(name.clone()))?;
            if !value.is_finite() {
                return Err(DerivationError::UnusableInput {
                    name: name.clone(),
                    value,
                });
            }
            inputs.insert(name.clone(), value);
        }

        let value = (self.compute)(&inputs)?;
        if !value.is_finite() {
            return Err(DerivationError::NonFinite);
        }
        Ok(value)
    }
}

/// Static definition of one logical metric
#[derive(Debug, Clone)]
pub struct MetricSpec {
    /// Unique metric name
    pub name: String,
    /// Providers in priority order, primary first
    pub providers: Vec<ProviderSpec>,
    /// Present only for derived metrics
    pub derivation: Option<DerivationRule>,
}

impl MetricSpec {
    /// A metric fetched from providers
    pub fn raw(name: impl Into<String>, providers: Vec<ProviderSpec>) -> Self {
        Self {
            name: name.into(),
            providers,
            derivation: None,
        }
    }

    /// A metric computed from raw metrics
    pub fn derived(name: impl Into<String>, rule: DerivationRule) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
            derivation: Some(rule),
        }
    }

    pub fn is_derived(&self) -> bool {
        self.derivation.is_some()
    }
}

/// Result of one provider attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RawObservation {
    /// Provider returned a finite number
    Success { value: f64, source: String },
    /// Provider attempt failed
    Failure { source: String, error: ProviderError },
}

impl RawObservation {
    pub fn success(value: f64, source: impl Into<String>) -> Self {
        Self::Success {
            value,
            source: source.into(),
        }
    }

    pub fn failure(source: impl Into<String>, error: ProviderError) -> Self {
        Self::Failure {
            source: source.into(),
            error,
        }
    }

    /// Provider identity of this attempt
    pub fn source(&self) -> &str {
        match self {
            RawObservation::Success { source, .. } | RawObservation::Failure { source, .. } => {
                source
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RawObservation::Success { .. })
    }

    /// Failure classification, `None` on success
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RawObservation::Success { .. } => None,
            RawObservation::Failure { error, .. } => Some(error.kind()),
        }
    }
}

/// Resolved value of one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Available(f64),
    Unavailable,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Available(v) => Some(*v),
            MetricValue::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Available(_))
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Available(v) => serializer.serialize_f64(*v),
            MetricValue::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}
