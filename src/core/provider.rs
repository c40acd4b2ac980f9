//! Model provider abstraction and Messages API wire types
//!
//! `TranslationService` only talks to a [`ModelProvider`], so the HTTP client
//! can be swapped for a stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::core::models::UsageStats;

/// A backend able to answer a Messages API request
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one request and return the provider's reply
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse>;
}

/// Provider-side cache hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    #[serde(rename = "type")]
    pub kind: String,
}

impl CacheControl {
    pub fn ephemeral() -> Self {
        Self {
            kind: "ephemeral".to_string(),
        }
    }
}

/// One system-level context segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

impl SystemBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
            cache_control: None,
        }
    }

    /// Mark this segment for server-side reuse
    pub fn cached(mut self) -> Self {
        self.cache_control = Some(CacheControl::ephemeral());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST /v1/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: Vec<SystemBlock>,
    pub messages: Vec<Message>,
}

/// Output segment of a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Token usage as reported by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
}

impl From<&ApiUsage> for UsageStats {
    fn from(usage: &ApiUsage) -> Self {
        UsageStats {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_read: usage.cache_read_input_tokens.unwrap_or(0),
            cache_created: usage.cache_creation_input_tokens.unwrap_or(0),
        }
    }
}

/// Reply body for `POST /v1/messages`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: ApiUsage,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Reply with a single text segment, mostly for stubs
    pub fn from_text(text: impl Into<String>, usage: ApiUsage) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            usage,
            ..Default::default()
        }
    }
}
