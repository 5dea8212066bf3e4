//! Default metric configuration
//!
//! Providers are listed in priority order: the most reliable source first,
//! the least reliable last. The order is part of the configuration and is
//! never changed at runtime.

use crate::{
    constants::*,
    derive::dollar_index_rule,
    types::{MetricSpec, ProviderSpec, ResponseFormat},
};
use std::time::Duration;

/// Provider id of exchangerate.host
pub const EXCHANGERATE_HOST: &str = "exchangerate.host";
/// Provider id of open.er-api.com
pub const OPEN_ER_API: &str = "open.er-api";
/// Provider id of Stooq
pub const STOOQ: &str = "stooq";
/// Provider id of Yahoo Finance
pub const YAHOO: &str = "yahoo";
/// Provider id of the Sina quote feed
pub const SINA: &str = "sina";

/// USD-based rate metrics and their currency codes
const FX_LEGS: &[(&str, &str)] = &[
    (USD_EUR, "EUR"),
    (USD_JPY, "JPY"),
    (USD_GBP, "GBP"),
    (USD_CAD, "CAD"),
    (USD_SEK, "SEK"),
    (USD_CHF, "CHF"),
];

/// Builds the default metric set with the given per-request timeout
pub fn default_metrics(timeout: Duration) -> Vec<MetricSpec> {
    let mut metrics = vec![usd_rate(USD_CNY, "CNY", timeout)];

    for (name, code) in FX_LEGS {
        metrics.push(usd_rate(name, code, timeout));
    }

    metrics.push(MetricSpec::raw(
        GOLD_USD,
        vec![
            ProviderSpec::new(
                EXCHANGERATE_HOST,
                EXCHANGERATE_HOST_CONVERT_URL,
                ResponseFormat::json("result"),
            )
            .with_param("from", "XAU")
            .with_param("to", "USD")
            .with_timeout(timeout),
            stooq_close("xauusd", timeout),
            yahoo_price("GC=F", timeout),
        ],
    ));

    metrics.push(MetricSpec::raw(
        SHANGHAI_INDEX,
        vec![
            yahoo_price("000001.SS", timeout),
            ProviderSpec::new(SINA, SINA_QUOTE_URL, ResponseFormat::quoted_list(1))
                .with_param("symbol", "s_sh000001")
                .with_header("Referer", SINA_REFERER)
                .with_timeout(timeout),
        ],
    ));

    metrics.push(MetricSpec::raw(
        HANGSENG_INDEX,
        vec![stooq_close("hsi", timeout), yahoo_price("^HSI", timeout)],
    ));

    metrics.push(MetricSpec::raw(
        WTI_CRUDE,
        vec![stooq_close("cl", timeout), yahoo_price("CL=F", timeout)],
    ));

    metrics.push(MetricSpec::derived(DOLLAR_INDEX_PROXY, dollar_index_rule()));

    metrics
}

/// Units of `code` per US dollar
fn usd_rate(name: &str, code: &str, timeout: Duration) -> MetricSpec {
    let path = format!("rates.{}", code);
    MetricSpec::raw(
        name,
        vec![
            ProviderSpec::new(
                EXCHANGERATE_HOST,
                EXCHANGERATE_HOST_LATEST_URL,
                ResponseFormat::json(path.clone()),
            )
            .with_param("symbol", code)
            .with_timeout(timeout),
            ProviderSpec::new(OPEN_ER_API, OPEN_ER_API_LATEST_URL, ResponseFormat::json(path))
                .with_timeout(timeout),
        ],
    )
}

fn stooq_close(symbol: &str, timeout: Duration) -> ProviderSpec {
    ProviderSpec::new(STOOQ, STOOQ_QUOTE_URL, ResponseFormat::csv("Close"))
        .with_param("symbol", symbol)
        .with_timeout(timeout)
}

fn yahoo_price(symbol: &str, timeout: Duration) -> ProviderSpec {
    ProviderSpec::new(
        YAHOO,
        YAHOO_QUOTE_URL,
        ResponseFormat::json("quoteResponse.result.0.regularMarketPrice"),
    )
    .with_param("symbol", symbol)
    .with_timeout(timeout)
}
