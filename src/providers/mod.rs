//! Quote provider implementations

pub mod extract;
pub mod http;

pub use extract::extract_value;
pub use http::HttpQuoteProvider;
