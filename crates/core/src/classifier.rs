use crate::error::AssistantError;
use crate::models::Intent;
use crate::prompts;
use providers::LlmProvider;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub intent: Intent,
    /// Model output exactly as returned, before normalisation.
    pub raw: String,
}

/// One model call mapping free text to an intent. Output that is not exactly
/// one of the four labels falls back to `Intent::None`; only a failed model
/// call is an error.
pub async fn classify(
    user_text: &str,
    llm: &dyn LlmProvider,
) -> Result<ClassificationOutcome, AssistantError> {
    let prompt = prompts::intent_prompt(user_text);
    let raw = llm
        .complete(&prompt)
        .await
        .map_err(AssistantError::Classification)?;
    let intent = Intent::parse_label(&raw);
    debug!(raw = %raw.trim(), %intent, "classified message");
    Ok(ClassificationOutcome { intent, raw })
}
