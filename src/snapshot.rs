//! Immutable result of one resolution run

use crate::types::MetricValue;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Resolved value of one metric and the provider that supplied it
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    /// Metric name
    pub metric: String,
    /// Resolved value or the unavailable marker
    pub value: MetricValue,
    /// Provider id, `derived:<rule>` for derived metrics, `None` when unavailable
    pub source: Option<String>,
}

impl SnapshotEntry {
    pub fn available(metric: impl Into<String>, value: f64, source: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: MetricValue::Available(value),
            source: Some(source.into()),
        }
    }

    pub fn unavailable(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: MetricValue::Unavailable,
            source: None,
        }
    }
}

/// All metrics of one run, in configuration order
///
/// Built once by the assembler and never mutated afterwards. Holds no
/// timestamps, so identical provider answers give byte-identical JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub(crate) fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn get(&self, metric: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.metric == metric)
    }

    /// Value of `metric`; unknown metrics read as unavailable
    pub fn value(&self, metric: &str) -> MetricValue {
        self.get(metric)
            .map(|e| e.value)
            .unwrap_or(MetricValue::Unavailable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unavailable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.value.is_available())
            .count()
    }

    /// True when no metric resolved at all
    pub fn is_empty_of_data(&self) -> bool {
        self.entries.iter().all(|e| !e.value.is_available())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Serialize)]
struct EntryBody<'a> {
    value: MetricValue,
    source: Option<&'a str>,
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(
                &entry.metric,
                &EntryBody {
                    value: entry.value,
                    source: entry.source.as_deref(),
                },
            )?;
        }
        map.end()
    }
}
