//! Provider abstraction for fetching raw metric values from external APIs

use crate::types::{ProviderSpec, RawObservation};
use async_trait::async_trait;

/// Trait for quote providers
///
/// One call performs at most one outbound request for the given spec and
/// never retries. Every failure is returned as a
/// [`RawObservation::Failure`], never as a panic or an `Err`.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches and extracts the value described by `spec`
    ///
    /// # Arguments
    /// * `spec` - Endpoint, response format and timeout of the source
    ///
    /// # Returns
    /// The extracted value tagged with `spec.id`, or a classified failure
    async fn observe(&self, spec: &ProviderSpec) -> RawObservation;

    /// Returns the name of this provider implementation
    fn provider_name(&self) -> &'static str;
}
