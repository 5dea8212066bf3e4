//! Constants for the market snapshot resolver
//!
//! Metric names, provider endpoints and defaults are centralized here.
//! Runtime overrides (timeouts, SMTP relay) live in [`crate::config`].

/// Default HTTP request timeout per provider attempt (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default number of raw metrics resolved at the same time
pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-snapshot/0.1.0";

/// Placeholder rendered for metrics that could not be resolved
pub const NO_DATA_PLACEHOLDER: &str = "no data";

// Metric names

pub const USD_CNY: &str = "USD/CNY";
pub const USD_EUR: &str = "USD/EUR";
pub const USD_JPY: &str = "USD/JPY";
pub const USD_GBP: &str = "USD/GBP";
pub const USD_CAD: &str = "USD/CAD";
pub const USD_SEK: &str = "USD/SEK";
pub const USD_CHF: &str = "USD/CHF";
pub const DOLLAR_INDEX_PROXY: &str = "dollar-index-proxy";
pub const GOLD_USD: &str = "gold-usd";
pub const SHANGHAI_INDEX: &str = "shanghai-index";
pub const HANGSENG_INDEX: &str = "hangseng-index";
pub const WTI_CRUDE: &str = "wti-crude";

// Dollar index proxy: 50.14348112 * EURUSD^-0.576 * USDJPY^0.136 * GBPUSD^-0.119
//                      * USDCAD^0.091 * USDSEK^0.042 * USDCHF^0.036

pub const DXY_CONSTANT: f64 = 50.14348112;
pub const DXY_EUR_WEIGHT: f64 = -0.576;
pub const DXY_JPY_WEIGHT: f64 = 0.136;
pub const DXY_GBP_WEIGHT: f64 = -0.119;
pub const DXY_CAD_WEIGHT: f64 = 0.091;
pub const DXY_SEK_WEIGHT: f64 = 0.042;
pub const DXY_CHF_WEIGHT: f64 = 0.036;

// Provider endpoints

/// exchangerate.host latest rates, USD based
pub const EXCHANGERATE_HOST_LATEST_URL: &str =
    "https://api.exchangerate.host/latest?base=USD&symbols={symbol}";

/// exchangerate.host conversion endpoint
pub const EXCHANGERATE_HOST_CONVERT_URL: &str =
    "https://api.exchangerate.host/convert?from={from}&to={to}";

/// open.er-api.com latest rates, USD based
pub const OPEN_ER_API_LATEST_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Stooq quote endpoint returning a one-row CSV with a header
pub const STOOQ_QUOTE_URL: &str = "https://stooq.com/q/l/?s={symbol}&f=sd2t2ohlcv&h&e=csv";

/// Yahoo Finance quote endpoint
pub const YAHOO_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote?symbols={symbol}";

/// Sina short quote feed
pub const SINA_QUOTE_URL: &str = "http://hq.sinajs.cn/list={symbol}";

/// Referer the Sina feed expects
pub const SINA_REFERER: &str = "https://finance.sina.com.cn";

/// Field sentinels that mean "the provider has no value"
pub const MISSING_VALUE_SENTINELS: &[&str] = &[
    "n/a",
    "n/d",
    "na",
    "not available",
    "-",
    "none",
    "null",
];
