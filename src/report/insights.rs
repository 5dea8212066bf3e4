//! Threshold-based market commentary
//!
//! Each rule reads one metric and emits at most one line. Unavailable metrics
//! and non-positive readings are skipped, so a missing value never reads as a
//! low value.

use crate::{constants::*, snapshot::Snapshot};

/// Line used when no rule produced commentary
pub const FALLBACK_INSIGHT: &str = "Market data is partially unavailable. Follow the trend: \
watch the policy calendar, credit and PMI turning points, and northbound flows.";

/// Positive value of a metric, `None` when unavailable or non-positive
fn reading(snapshot: &Snapshot, name: &str) -> Option<f64> {
    snapshot.value(name).as_f64().filter(|v| *v > 0.0)
}

/// Builds the commentary lines for a snapshot, in a fixed order
pub fn build_insights(snapshot: &Snapshot) -> Vec<String> {
    let mut tips: Vec<&'static str> = Vec::new();

    if let Some(dxy) = reading(snapshot, DOLLAR_INDEX_PROXY) {
        tips.push(if dxy >= 105.0 {
            "Dollar index is strong: emerging-market flows under pressure, stay cautious on A-shares and Hong Kong."
        } else if dxy <= 101.0 {
            "Dollar is weakening: supports flows back into emerging markets, positive for A-shares and commodities."
        } else {
            "Dollar in a neutral range: limited FX disturbance, focus on fundamentals and policy expectations."
        });
    }

    if let Some(usdcny) = reading(snapshot, USD_CNY) {
        if usdcny >= 7.25 {
            tips.push("USD/CNY elevated: weaker renminbi dampens foreign risk appetite.");
        } else if usdcny <= 7.10 {
            tips.push("USD/CNY easing: stable renminbi, supportive of domestic demand and high-dividend names.");
        }
    }

    if let Some(gold) = reading(snapshot, GOLD_USD) {
        if gold >= 2200.0 {
            tips.push("Gold is high: rising risk aversion may weigh on equities.");
        } else if gold <= 1950.0 {
            tips.push("Gold is retreating: improving risk appetite, growth sectors have more upside.");
        }
    }

    if let Some(sh) = reading(snapshot, SHANGHAI_INDEX) {
        tips.push(if sh < 3000.0 {
            "Shanghai Composite is relatively low: value and dividend stocks look attractive."
        } else {
            "Shanghai Composite holds above 3000: risk appetite improving, watch high-growth sectors."
        });
    }

    if let Some(hsi) = reading(snapshot, HANGSENG_INDEX) {
        tips.push(if hsi < 18000.0 {
            "Hang Seng trading low: watch southbound flows and earnings recovery."
        } else {
            "Hang Seng stabilising: tech and internet names may keep benefiting."
        });
    }

    if let Some(wti) = reading(snapshot, WTI_CRUDE) {
        if wti >= 85.0 {
            tips.push("Oil is strong: inflation pressure, negative for high-cost industries, upstream energy benefits.");
        } else if wti <= 70.0 {
            tips.push("Oil is soft: easing cost pressure, positive for manufacturing and consumption.");
        }
    }

    if tips.is_empty() {
        tips.push(FALLBACK_INSIGHT);
    }

    tips.into_iter().map(str::to_string).collect()
}
