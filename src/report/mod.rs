//! Report rendering
//!
//! Turns a [`Snapshot`] into a subject line and an HTML body. All display
//! formatting (decimals, placeholders, commentary) lives here; the snapshot
//! itself stays purely numeric.

pub mod html;
pub mod insights;

pub use html::{format_value, render_html};
pub use insights::build_insights;

use crate::snapshot::Snapshot;
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Report timestamps are shown in Beijing time
const REPORT_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// A rendered report ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub subject: String,
    pub html: String,
}

/// Current time in the report time zone
pub fn report_time() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(REPORT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

/// "daily" -> "Daily", "WEEKLY" -> "Weekly"
pub fn capitalize(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Builds the subject and body for a report of the given kind
pub fn build_report(kind: &str, snapshot: &Snapshot, generated_at: DateTime<FixedOffset>) -> Report {
    let title = format!("{} market report", capitalize(kind));
    let insights = build_insights(snapshot);
    let html = render_html(&title, snapshot, &insights, generated_at);

    Report {
        subject: title,
        html,
    }
}
