//! Report run: resolve → render → deliver

use crate::{
    assembler::SnapshotAssembler,
    catalog,
    config::{ResolverConfig, SmtpConfig},
    delivery::{ReportDelivery, SmtpDelivery},
    error::ReportError,
    providers::HttpQuoteProvider,
    report::{build_report, report_time, Report},
    snapshot::Snapshot,
};
use std::sync::Arc;

/// Options of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Report label, e.g. "daily"
    pub kind: String,
    /// Print the HTML instead of sending it
    pub dry_run: bool,
    /// Also print the snapshot as JSON
    pub print_json: bool,
}

/// Resolves a snapshot and renders the report for it
pub async fn produce(kind: &str, assembler: &SnapshotAssembler) -> (Snapshot, Report) {
    let snapshot = assembler.assemble().await;
    let report = build_report(kind, &snapshot, report_time());
    (snapshot, report)
}

/// Delivers a report, logging the outcome
pub async fn send(delivery: &dyn ReportDelivery, report: &Report) -> Result<(), ReportError> {
    match delivery.deliver(report).await {
        Ok(()) => {
            tracing::info!(transport = delivery.delivery_name(), "Report sent");
            Ok(())
        }
        Err(e) => {
            tracing::error!(transport = delivery.delivery_name(), error = %e, "Report delivery failed");
            Err(e.into())
        }
    }
}

/// Runs one full report cycle against the live providers
pub async fn run(options: RunOptions) -> Result<(), ReportError> {
    let resolver_config = ResolverConfig::from_env()?;

    // Credentials are checked before any provider is contacted
    let smtp = if options.dry_run {
        None
    } else {
        Some(SmtpConfig::from_env()?)
    };

    let provider =
        Arc::new(HttpQuoteProvider::new().map_err(|e| ReportError::Client(e.to_string()))?);
    let assembler = SnapshotAssembler::new(
        provider,
        catalog::default_metrics(resolver_config.request_timeout),
    )
    .with_concurrency(resolver_config.concurrency);

    let (snapshot, report) = produce(&options.kind, &assembler).await;

    if options.print_json {
        println!("{}", snapshot.to_json_pretty()?);
    }

    match smtp {
        Some(config) => send(&SmtpDelivery::new(config), &report).await,
        None => {
            println!("{}", report.html);
            Ok(())
        }
    }
}
