//! # Market Snapshot
//!
//! Resolves a small set of market metrics (USD/CNY, a dollar index proxy,
//! gold, Shanghai and Hang Seng indices, WTI crude) from public data
//! providers and renders them into an email report.
//!
//! Each metric lists its providers in priority order. The first provider that
//! returns a finite number wins; the rest are never contacted. When every
//! provider fails the metric is recorded as unavailable and the run carries
//! on. Derived metrics are computed after all raw metrics have resolved.
//!
//! ## Usage
//!
//! ```no_run
//! use market_snapshot::{catalog, HttpQuoteProvider, MetricValue, SnapshotAssembler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(HttpQuoteProvider::new()?);
//! let assembler = SnapshotAssembler::new(provider, catalog::default_metrics(Duration::from_secs(15)));
//!
//! let snapshot = assembler.assemble().await;
//! match snapshot.value("dollar-index-proxy") {
//!     MetricValue::Available(dxy) => println!("DXY proxy: {:.2}", dxy),
//!     MetricValue::Unavailable => println!("DXY proxy: no data"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SnapshotAssembler
//!     ↓ raw metrics (config order)
//! FallbackResolver ── QuoteProvider (HTTP: JSON / CSV / quote feed)
//!     ↓ derived metrics
//! DerivationRule (dollar index proxy)
//!     ↓
//! Snapshot → report → delivery
//! ```

pub mod app;
pub mod assembler;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod derive;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use assembler::SnapshotAssembler;
pub use error::{DeliveryError, DerivationError, FailureKind, ProviderError, ReportError};
pub use provider::QuoteProvider;
pub use providers::HttpQuoteProvider;
pub use resolver::{FallbackResolver, Resolution};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use types::{DerivationRule, MetricSpec, MetricValue, ProviderSpec, RawObservation, ResponseFormat};
