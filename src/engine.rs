//! The review and commit pipelines: changes in, prompt out, model called, text back.

use crate::change::ChangeRecord;
use crate::error::PipelineError;
use crate::llm::prompt_builder::{self, PromptPair};
use crate::llm::response;
use crate::llm::{ChatMessage, LlmClient, truncate};

/// Ask the model to review `changes`; its reply is returned unmodified.
pub fn review_changes(
    llm: &dyn LlmClient,
    model: &str,
    changes: &[ChangeRecord],
) -> Result<String, PipelineError> {
    if changes.is_empty() {
        return Err(PipelineError::EmptyChangeSet);
    }

    let prompts = prompt_builder::review_prompt(changes);
    log::trace!("Review prompt:\n{}", truncate(&prompts.user, 3000));

    let raw = invoke(llm, model, prompts)?;
    Ok(response::review_passthrough(raw))
}

/// Ask the model for a commit payload and render it into a commit message.
pub fn generate_commit_message(
    llm: &dyn LlmClient,
    model: &str,
    changes: &[ChangeRecord],
    user_context: Option<&str>,
    user_ticket: Option<&str>,
) -> Result<String, PipelineError> {
    if changes.is_empty() {
        return Err(PipelineError::EmptyChangeSet);
    }

    let prompts = prompt_builder::commit_message_prompt(changes, user_context, user_ticket);
    log::trace!("Commit-message prompt:\n{}", truncate(&prompts.user, 3000));

    let raw = invoke(llm, model, prompts)?;
    Ok(response::format_commit_response(&raw, user_ticket))
}

fn invoke(llm: &dyn LlmClient, model: &str, prompts: PromptPair) -> Result<String, PipelineError> {
    let messages = [ChatMessage::system(prompts.system), ChatMessage::user(prompts.user)];
    let raw = llm.chat(model, &messages)?;
    log::debug!("Model response ({} chars):\n{}", raw.len(), truncate(&raw, 2000));
    Ok(raw)
}
