//! ViaCEP API client.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::LookupError;
use crate::metrics;

use super::types::{Cep, LookupOutcome, ViaCepResponse};

/// Anything that can resolve a CEP.
#[async_trait]
pub trait CepLookup: Send + Sync {
    /// Resolve a CEP into address fields.
    async fn lookup(&self, cep: &Cep) -> Result<LookupOutcome, LookupError>;

    /// Fetch the provider's raw JSON body for a CEP.
    async fn consult(&self, cep: &Cep) -> Result<serde_json::Value, LookupError>;
}

/// ViaCEP HTTP client.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, e.g. `https://viacep.com.br/ws`.
    base_url: String,
}

impl ViaCepClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.http_timeout_ms {
            builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
        }

        let http = builder
            .build()
            .map_err(|e| LookupError::ClientBuild(e.to_string()))?;

        Ok(Self::with_http(http, config.lookup_base()))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the provider base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint for a CEP.
    pub fn endpoint(&self, cep: &Cep) -> String {
        format!("{}/{}/json/", self.base_url, cep)
    }
}

#[async_trait]
impl CepLookup for ViaCepClient {
    #[instrument(skip(self), fields(cep = %cep))]
    async fn lookup(&self, cep: &Cep) -> Result<LookupOutcome, LookupError> {
        let start = Instant::now();
        let response = self.http.get(self.endpoint(cep)).send().await;
        metrics::record_lookup_latency(start);

        let response = response.map_err(|e| {
            metrics::inc_lookups("error");
            e
        })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Provider rejected CEP");
            metrics::inc_lookups("not_found");
            return Ok(LookupOutcome::NotFound);
        }

        let body: ViaCepResponse = response.json().await.map_err(|e| {
            metrics::inc_lookups("error");
            LookupError::ParseError(e.to_string())
        })?;

        let outcome = LookupOutcome::from(body);
        if outcome.is_resolved() {
            metrics::inc_lookups("resolved");
            debug!("CEP resolved");
        } else {
            metrics::inc_lookups("not_found");
            debug!("Provider flagged CEP as unknown");
        }

        Ok(outcome)
    }

    #[instrument(skip(self), fields(cep = %cep))]
    async fn consult(&self, cep: &Cep) -> Result<serde_json::Value, LookupError> {
        let response = self.http.get(self.endpoint(cep)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Provider answered with non-success status");
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))
    }
}
