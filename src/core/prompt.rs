//! Prompt construction for translation calls

use crate::core::models::{language_name, ValidatedRequest};
use crate::core::provider::{Message, MessagesRequest, SystemBlock};

/// Sampling temperature for every translation call
pub const TEMPERATURE: f32 = 0.3;

/// Output token ceiling for every translation call
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Build the user instruction for a validated request
pub fn build_instruction(request: &ValidatedRequest) -> String {
    format!(
        "Translate the following text from {} to {}:\n\n\"{}\"\n\nProvide only the translation.",
        language_name(&request.source_language),
        language_name(&request.target_language),
        request.source_text
    )
}

/// Assemble the provider request.
///
/// The system prompt goes first, the knowledge base second with a
/// provider-side cache hint, and the instruction is the only user message.
pub fn build_messages_request(
    model: &str,
    system_prompt: &str,
    knowledge_base: &str,
    request: &ValidatedRequest,
) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens: MAX_OUTPUT_TOKENS,
        temperature: TEMPERATURE,
        system: vec![
            SystemBlock::text(system_prompt),
            SystemBlock::text(knowledge_base).cached(),
        ],
        messages: vec![Message::user(build_instruction(request))],
    }
}
