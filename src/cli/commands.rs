//! CLI command definitions and handlers

use clap::Subcommand;
use tracing::info;

use crate::core::config::TranslatorConfig;
use crate::core::models::TranslationRequest;
use crate::core::service::TranslationService;

/// Commands for the Ladino translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Expose error details in responses
        #[arg(long)]
        debug: bool,
    },

    /// Translate a single text and print the result
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Source language code (lad, en, es, tr)
        #[arg(short, long)]
        from: String,

        /// Target language code (lad, en, es, tr)
        #[arg(long)]
        to: String,
    },
}

/// Handle server command
pub async fn handle_server(host: String, port: u16, debug: bool) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let mut config = TranslatorConfig::from_env()?;
    if debug {
        config.development = true;
    }

    let service = TranslationService::from_config(config)?;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("📮 Translate endpoint: POST http://{}:{}/api/translate", host, port);

    run_server(service, host, port).await?;

    Ok(())
}

/// Handle translate command
pub async fn handle_translate(text: String, from: String, to: String) -> anyhow::Result<()> {
    let config = TranslatorConfig::from_env()?;
    let service = TranslationService::from_config(config)?;

    info!("Translating {} characters from {} to {}", text.chars().count(), from, to);

    let request = TranslationRequest::new(text, from, to);
    let response = service.translate(&request).await?;

    println!("{}", response.translation);
    println!(
        "\n📊 Tokens - input: {}, output: {}, cache read: {}, cache created: {}",
        response.usage.input_tokens,
        response.usage.output_tokens,
        response.usage.cache_read,
        response.usage.cache_created
    );

    Ok(())
}
