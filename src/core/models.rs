//! Core data models for translation

use serde::{Deserialize, Serialize};

/// Language code that must appear on exactly one side of every request
pub const PIVOT_LANGUAGE: &str = "lad";

/// Short name of the pivot language, used in validation messages
pub const PIVOT_LANGUAGE_NAME: &str = "Ladino";

/// Supported language codes and their prompt names
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("lad", "Ladino (Judeo-Spanish)"),
    ("en", "English"),
    ("es", "Spanish"),
    ("tr", "Turkish"),
];

/// Human-readable name for a language code.
///
/// Unknown codes are returned verbatim.
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Inbound translation request.
///
/// Fields are optional so that absent and empty values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationRequest {
    #[serde(default)]
    pub source_text: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

impl TranslationRequest {
    pub fn new(
        source_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            source_text: Some(source_text.into()),
            source_language: Some(source_language.into()),
            target_language: Some(target_language.into()),
        }
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub source_text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Token counters reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read: u64,
    pub cache_created: u64,
}

/// Successful translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translation: String,
    pub usage: UsageStats,
    pub source_language: String,
    pub target_language: String,
}
