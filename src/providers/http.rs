//! HTTP quote provider implementation

use crate::{
    constants::USER_AGENT,
    error::ProviderError,
    provider::QuoteProvider,
    providers::extract::extract_value,
    types::{ProviderSpec, RawObservation},
};
use async_trait::async_trait;
use reqwest::Client;

/// Quote provider backed by a shared HTTP client
///
/// Handles JSON, CSV and quote-feed endpoints alike; the response format of
/// each [`ProviderSpec`] decides how the body is read.
pub struct HttpQuoteProvider {
    client: Client,
}

impl HttpQuoteProvider {
    /// Creates a new HTTP provider
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a provider around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_value(&self, spec: &ProviderSpec) -> Result<f64, ProviderError> {
        let url = spec.render_url()?;
        tracing::debug!(provider = %spec.id, %url, "Fetching quote");

        let mut request = self.client.get(url).timeout(spec.timeout);
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_request_error(e, spec))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(e, spec))?;

        extract_value(&spec.format, &body)
    }
}

/// Maps a reqwest failure onto the provider error taxonomy
fn classify_request_error(error: reqwest::Error, spec: &ProviderSpec) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(spec.timeout)
    } else if error.is_decode() {
        ProviderError::invalid_response(error.to_string())
    } else {
        ProviderError::NetworkError(error.to_string())
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn observe(&self, spec: &ProviderSpec) -> RawObservation {
        match self.fetch_value(spec).await {
            Ok(value) => {
                tracing::debug!(provider = %spec.id, value, "Quote extracted");
                RawObservation::success(value, spec.id.clone())
            }
            Err(error) => RawObservation::failure(spec.id.clone(), error),
        }
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}
