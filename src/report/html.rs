//! HTML email body

use crate::{constants::*, snapshot::Snapshot, types::MetricValue};
use chrono::{DateTime, FixedOffset};
use std::fmt::Write;

const STYLE: &str = r#"<style>
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "PingFang SC", "Microsoft YaHei", Helvetica, Arial, sans-serif; line-height: 1.6; color: #1f2937; }
  h2 { margin: 0 0 8px; }
  .sec { margin: 18px 0; }
  table { border-collapse: collapse; width: 100%; }
  th, td { border: 1px solid #e5e7eb; padding: 8px 10px; font-size: 14px; }
  th { background: #f3f4f6; text-align: left; }
  .tips li { margin: 6px 0; }
  .tag { display: inline-block; padding: 2px 8px; border-radius: 12px; background: #eef2ff; color: #3730a3; font-size: 12px; margin-left: 6px; }
  .na { color: #9ca3af; }
</style>"#;

const MACRO_ROWS: &[(&str, &str)] = &[
    ("USD/CNY", USD_CNY),
    ("Dollar index (proxy)", DOLLAR_INDEX_PROXY),
    ("Gold XAU/USD", GOLD_USD),
];

const MARKET_ROWS: &[(&str, &str)] = &[
    ("Shanghai Composite", SHANGHAI_INDEX),
    ("Hang Seng", HANGSENG_INDEX),
    ("WTI crude (front month)", WTI_CRUDE),
];

const CHECKLIST: &[&str] = &[
    "Liquidity: are social financing, M2 and DR007/SHIBOR easing?",
    "Business cycle: is the manufacturing PMI back above 50?",
    "Flows: direction and sector preference of northbound capital.",
    "Themes: are semiconductors, panels and memory seeing destocking plus price increases?",
];

/// Formats a metric value with two decimals, or the placeholder
pub fn format_value(value: MetricValue) -> String {
    match value {
        MetricValue::Available(v) => format!("{:.2}", v),
        MetricValue::Unavailable => NO_DATA_PLACEHOLDER.to_string(),
    }
}

/// Renders the full report body
///
/// Every configured row is present; unavailable values show the placeholder.
pub fn render_html(
    title: &str,
    snapshot: &Snapshot,
    insights: &[String],
    generated_at: DateTime<FixedOffset>,
) -> String {
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<html><head><meta charset=\"utf-8\">{}</head><body>\n<h2>{} <span class=\"tag\">{}</span></h2>\n",
        STYLE,
        escape(title),
        generated_at.format("%Y-%m-%d %H:%M")
    );

    push_table(&mut html, "Macro, FX and precious metals", MACRO_ROWS, snapshot);
    push_table(&mut html, "Indices and commodities", MARKET_ROWS, snapshot);

    html.push_str("<div class=\"sec\">\n<h3>Commentary and market impact</h3>\n<ul class=\"tips\">\n");
    for tip in insights {
        let _ = writeln!(html, "<li>{}</li>", escape(tip));
    }
    html.push_str("</ul>\n</div>\n");

    html.push_str("<div class=\"sec\">\n<h3>Daily checklist</h3>\n<ul>\n");
    for item in CHECKLIST {
        let _ = writeln!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ul>\n</div>\n</body></html>\n");

    html
}

fn push_table(html: &mut String, heading: &str, rows: &[(&str, &str)], snapshot: &Snapshot) {
    let _ = write!(
        html,
        "<div class=\"sec\">\n<h3>{}</h3>\n<table>\n<tr><th>Indicator</th><th>Value</th></tr>\n",
        escape(heading)
    );
    for (label, metric) in rows {
        let value = snapshot.value(metric);
        let class = if value.is_available() { "" } else { " class=\"na\"" };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td{}>{}</td></tr>",
            escape(label),
            class,
            format_value(value)
        );
    }
    html.push_str("</table>\n</div>\n");
}

/// Minimal HTML escaping for text nodes
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
