//! Error types for the market snapshot resolver

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Classification of a failed provider attempt or derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection failure, timeout or non-2xx status
    NetworkError,
    /// Response body did not have the expected shape
    ParseError,
    /// Expected field absent or a "not available" sentinel
    MissingField,
    /// Value parsed but is NaN or infinite
    NonFinite,
    /// A derived metric lacked a usable input
    DerivationUnavailable,
}

impl FailureKind {
    /// Snake-case label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NetworkError => "network_error",
            FailureKind::ParseError => "parse_error",
            FailureKind::MissingField => "missing_field",
            FailureKind::NonFinite => "non_finite",
            FailureKind::DerivationUnavailable => "derivation_unavailable",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when fetching a value from a provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request did not complete within the provider timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Provider answered with a non-success status
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Field absent or reported as not available
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Value is NaN or infinite
    #[error("Non-finite value: {0}")]
    NonFinite(f64),

    /// Provider spec cannot be turned into a request
    #[error("Invalid provider spec: {0}")]
    InvalidSpec(String),
}

impl ProviderError {
    /// Failure classification for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::NetworkError(_)
            | ProviderError::Timeout(_)
            | ProviderError::HttpStatus { .. }
            | ProviderError::InvalidSpec(_) => FailureKind::NetworkError,
            ProviderError::InvalidResponse(_) => FailureKind::ParseError,
            ProviderError::MissingField(_) => FailureKind::MissingField,
            ProviderError::NonFinite(_) => FailureKind::NonFinite,
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

/// Errors from evaluating a derived metric
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    /// A required input was not resolved
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A required input is zero, negative or non-finite
    #[error("Unusable input {name}: {value}")]
    UnusableInput { name: String, value: f64 },

    /// The formula produced NaN or infinity
    #[error("Derived value is not finite")]
    NonFinite,
}

impl DerivationError {
    /// Every derivation failure maps to the same classification
    pub fn kind(&self) -> FailureKind {
        FailureKind::DerivationUnavailable
    }
}

/// Errors while loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    /// Variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Errors while transmitting a rendered report
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Sender or receiver is not a valid mailbox
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    /// Message could not be built
    #[error("Failed to build message: {0}")]
    Message(String),

    /// Relay rejected the connection, login or message
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Top-level errors of a report run
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::Config(_) => 2,
            ReportError::Delivery(_) => 3,
            ReportError::Client(_) | ReportError::Serialize(_) => 1,
        }
    }
}
