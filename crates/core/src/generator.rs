use crate::error::AssistantError;
use crate::models::Domain;
use crate::prompts;
use providers::LlmProvider;

/// Asks the model to answer `question` from `context`, returning its trimmed
/// text. An empty context is allowed; the model is expected to say it lacks
/// the information.
pub async fn answer(
    llm: &dyn LlmProvider,
    domain: Domain,
    question: &str,
    context: &str,
) -> Result<String, AssistantError> {
    let prompt = prompts::answer_prompt(domain, question, context);
    let reply = llm
        .complete(&prompt)
        .await
        .map_err(AssistantError::Generation)?;
    Ok(reply.trim().to_string())
}
