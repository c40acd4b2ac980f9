//! Ladino Translator - translation endpoint for Ladino, English, Spanish and Turkish
//!
//! This library validates translation requests, grounds them with a cached
//! system prompt and knowledge base, and forwards them to the Claude
//! Messages API.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use self::core::{
    client::AnthropicClient,
    config::TranslatorConfig,
    errors::TranslationError,
    models::{TranslationRequest, TranslationResponse, UsageStats},
    provider::ModelProvider,
    resources::ResourceCache,
    service::TranslationService,
};

pub use server::api::{create_router, run_server, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
