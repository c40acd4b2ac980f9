//! Configuration management

use std::path::PathBuf;
use tracing::info;

/// Default Claude model
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Default Messages API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Default character limit for `source_text`
pub const DEFAULT_MAX_CHARACTERS: usize = 500;

/// Configuration for translator
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub max_characters: usize,
    pub development: bool,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub system_prompt_path: PathBuf,
    pub resources_dir: PathBuf,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_characters: DEFAULT_MAX_CHARACTERS,
            development: false,
            timeout_ms: 60000,
            max_retries: 0,
            retry_delay_ms: 1000,
            system_prompt_path: PathBuf::from("public/prompts/system_prompt.txt"),
            resources_dir: PathBuf::from("public/resources"),
        }
    }
}

/// First non-empty value among the given environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_key = first_env(&["CLAUDE_API_KEY"])
            .ok_or_else(|| anyhow::anyhow!("CLAUDE_API_KEY environment variable is required"))?;

        let api_endpoint = first_env(&["CLAUDE_API_URL"]).unwrap_or(defaults.api_endpoint);
        let model = first_env(&["CLAUDE_MODEL"]).unwrap_or(defaults.model);

        let max_characters = match first_env(&["VUE_APP_MAX_CHARACTERS", "MAX_CHARACTERS"]) {
            Some(value) => value.trim().parse::<usize>()?,
            None => defaults.max_characters,
        };

        let development = first_env(&["APP_ENV", "NODE_ENV"])
            .map(|value| value.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "60000".to_string())
            .parse::<u64>()?;

        let max_retries = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<u32>()?;

        let retry_delay_ms = std::env::var("RETRY_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()?;

        let system_prompt_path = first_env(&["SYSTEM_PROMPT_PATH"])
            .map(PathBuf::from)
            .unwrap_or(defaults.system_prompt_path);

        let resources_dir = first_env(&["RESOURCES_DIR"])
            .map(PathBuf::from)
            .unwrap_or(defaults.resources_dir);

        let config = Self {
            api_key,
            api_endpoint,
            model,
            max_characters,
            development,
            timeout_ms,
            max_retries,
            retry_delay_ms,
            system_prompt_path,
            resources_dir,
        };

        info!(
            "Loaded configuration: model={}, max_characters={}, development={}",
            config.model, config.max_characters, config.development
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.model.is_empty() {
            return Err(anyhow::anyhow!("Model identifier is required"));
        }

        if self.max_characters == 0 {
            return Err(anyhow::anyhow!("max_characters must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        // At most one retry on top of the initial attempt.
        if self.max_retries > 1 {
            return Err(anyhow::anyhow!("max_retries must be 0 or 1"));
        }

        Ok(())
    }
}
