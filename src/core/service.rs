//! Translation request processing: validation, prompt assembly, provider call

use std::sync::Arc;
use tracing::info;

use crate::core::client::AnthropicClient;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{
    TranslationRequest, TranslationResponse, UsageStats, ValidatedRequest, PIVOT_LANGUAGE,
};
use crate::core::prompt::build_messages_request;
use crate::core::provider::{ContentBlock, ModelProvider};
use crate::core::resources::ResourceCache;

/// Handles translation requests against a model provider
#[derive(Clone)]
pub struct TranslationService {
    config: Arc<TranslatorConfig>,
    resources: Arc<ResourceCache>,
    provider: Arc<dyn ModelProvider>,
}

impl TranslationService {
    pub fn new(
        config: Arc<TranslatorConfig>,
        resources: Arc<ResourceCache>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            config,
            resources,
            provider,
        }
    }

    /// Build a service backed by the Claude API client
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let config = Arc::new(config);
        let resources = Arc::new(ResourceCache::from_config(&config));
        let provider = Arc::new(AnthropicClient::new(config.clone())?);
        Ok(Self::new(config, resources, provider))
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Check fields, length and language pairing, in that order
    pub fn validate(&self, request: &TranslationRequest) -> Result<ValidatedRequest> {
        let (source_text, source_language, target_language) = match (
            non_empty(&request.source_text),
            non_empty(&request.source_language),
            non_empty(&request.target_language),
        ) {
            (Some(text), Some(source), Some(target)) => (text, source, target),
            _ => return Err(TranslationError::MissingFields),
        };

        // Counted in UTF-16 units to agree with the browser-side counter.
        let length = source_text.encode_utf16().count();
        if length > self.config.max_characters {
            return Err(TranslationError::TextTooLong {
                max: self.config.max_characters,
                actual: length,
            });
        }

        if (source_language == PIVOT_LANGUAGE) == (target_language == PIVOT_LANGUAGE) {
            return Err(TranslationError::InvalidLanguagePair);
        }

        Ok(ValidatedRequest {
            source_text: source_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        })
    }

    /// Validate and translate a single request
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        let request = self.validate(request)?;

        let system_prompt = self.resources.system_prompt().await;
        let knowledge_base = self.resources.knowledge_base().await;

        let messages = build_messages_request(
            &self.config.model,
            &system_prompt,
            &knowledge_base,
            &request,
        );

        let response = self.provider.create_message(&messages).await?;

        let translation = match response.content.first() {
            Some(ContentBlock::Text { text }) => text.trim().to_string(),
            Some(ContentBlock::Other) => {
                return Err(TranslationError::InvalidResponseError {
                    message: "First content block is not text".to_string(),
                })
            }
            None => return Err(TranslationError::EmptyResponse),
        };

        let usage = UsageStats::from(&response.usage);
        info!(
            "Translation completed - Input: {}, Output: {}, Cache read: {}, Cache created: {}",
            usage.input_tokens, usage.output_tokens, usage.cache_read, usage.cache_created
        );

        Ok(TranslationResponse {
            translation,
            usage,
            source_language: request.source_language,
            target_language: request.target_language,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
