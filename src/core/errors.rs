//! Custom error types for translation operations

use thiserror::Error;

use crate::core::models::{PIVOT_LANGUAGE, PIVOT_LANGUAGE_NAME};

/// Message returned to clients for any provider or unexpected failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Translation failed. Please try again.";

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// One of the three request fields is absent or empty
    #[error("Missing required fields: source_text, source_language, target_language")]
    MissingFields,

    /// Source text is longer than the configured limit
    #[error("Text exceeds maximum length of {max} characters. Current length: {actual}")]
    TextTooLong {
        max: usize,
        actual: usize,
    },

    /// Neither or both sides of the pair are the pivot language
    #[error("One language must be {} ({})", PIVOT_LANGUAGE_NAME, PIVOT_LANGUAGE)]
    InvalidLanguagePair,

    /// HTTP method other than POST or OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Provider answered without any output segment
    #[error("Empty response from Claude API")]
    EmptyResponse,

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            TranslationError::MissingFields
            | TranslationError::TextTooLong { .. }
            | TranslationError::InvalidLanguagePair => 400,
            TranslationError::MethodNotAllowed => 405,
            _ => 500,
        }
    }

    /// Whether the caller caused this error (its message is safe to show as-is)
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Whether a second attempt against the provider could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError { .. }
            | TranslationError::TimeoutError
            | TranslationError::RateLimitError { .. } => true,
            TranslationError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
