//! HTTP client for the Jupiter swap API.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::JupiterError;
use crate::jupiter::types::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse};

/// Default Jupiter API provided by the official Jupiter team.
/// For more info visit: <https://dev.jup.ag/docs>
pub const DEFAULT_API_URL: &str = "https://lite-api.jup.ag/swap/v1";

/// Client for the Jupiter swap API.
#[derive(Debug, Clone)]
pub struct JupiterClient {
    http: reqwest::Client,
    base_url: String,
}

impl JupiterClient {
    /// Creates a client. An empty URL selects the default public API.
    pub fn new(api_url: &str) -> Result<Self, JupiterError> {
        let base_url = if api_url.is_empty() {
            DEFAULT_API_URL
        } else {
            api_url
        };

        let http = reqwest::Client::builder()
            .build()
            .map_err(JupiterError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Requests a quote for a swap.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, JupiterError> {
        debug!(input_mint = %request.input_mint, output_mint = %request.output_mint, "requesting quote");

        let response = self
            .http
            .get(format!("{}/quote", self.base_url))
            .query(request)
            .send()
            .await
            .map_err(|source| JupiterError::Request {
                operation: "quote",
                source,
            })?;

        Self::decode("quote", response).await
    }

    /// Requests a swap transaction for a previously obtained quote.
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapResponse, JupiterError> {
        debug!(user = %request.user_public_key, "requesting swap transaction");

        let response = self
            .http
            .post(format!("{}/swap", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|source| JupiterError::Request {
                operation: "swap",
                source,
            })?;

        Self::decode("swap", response).await
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T, JupiterError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JupiterError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|source| JupiterError::Decode { operation, source })
    }
}
