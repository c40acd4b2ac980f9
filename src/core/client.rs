//! Claude Messages API client with timeout and bounded retry

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::provider::{MessagesRequest, MessagesResponse, ModelProvider};

/// Messages API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Error envelope returned by the Messages API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

/// HTTP client for the Claude Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl AnthropicClient {
    /// Create a new client
    pub fn new(config: Arc<TranslatorConfig>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, config })
    }

    /// Send with the configured retry budget
    async fn send_with_retry(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                debug!("Retry attempt {} for model {}", attempt, request.model);
                sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }

            match self.send_request(request).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!("Provider call succeeded after {} retries", attempt);
                    }
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    warn!("Provider call failed: {}, retrying", e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send actual HTTP request
    async fn send_request(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::TimeoutError
                } else {
                    TranslationError::NetworkError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<MessagesResponse>()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                });
        }

        let status_code = status.as_u16();
        let error_text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&error_text) {
            Ok(body) => format!("{}: {}", body.error.kind, body.error.message),
            Err(_) => error_text,
        };

        if status_code == 429 {
            return Err(TranslationError::RateLimitError { message });
        }

        Err(TranslationError::ApiError {
            status: status_code,
            message,
        })
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        self.send_with_retry(request).await
    }
}
