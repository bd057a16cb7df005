use musli::json;
use musli::{Decode, Encode};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

use super::{ChatMessage, LlmClient};
use crate::error::ModelError;

#[derive(Debug, Encode, Decode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Decode)]
struct OllamaTag {
    name: String,
}

#[derive(Debug, Decode)]
struct OllamaTagsResponse {
    models: Vec<OllamaTag>,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Names of the models installed in the local Ollama instance.
    pub fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = format!("{}/api/tags", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| classify_send_error(&url, e))?
            .error_for_status()
            .map_err(|e| ModelError::Transport(format!("Ollama HTTP error from {url}: {e}")))?;

        let resp_text = resp
            .text()
            .map_err(|e| ModelError::Transport(format!("Failed to read Ollama tags body: {e}")))?;

        let parsed: OllamaTagsResponse = json::from_str(&resp_text)
            .map_err(|e| ModelError::Transport(format!("Failed to decode Ollama tags JSON: {e}")))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

impl LlmClient for OllamaClient {
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ModelError> {
        #[derive(Debug, Encode)]
        struct ChatRequest {
            model: String,
            stream: bool,
            messages: Vec<OllamaMessage>,
        }

        let req_body = ChatRequest {
            model: model.to_string(),
            stream: false,
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        };

        let body_str = json::to_string(&req_body)
            .map_err(|e| ModelError::Transport(format!("Failed to encode Ollama JSON request: {e}")))?;

        log::trace!("Ollama request body: {}", super::truncate(&body_str, 4000));
        log::info!("Calling Ollama model {model:?}");

        let url = format!("{}/api/chat", self.base_url);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| classify_send_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(classify_status(model, status, &text));
        }

        let resp_text = resp
            .text()
            .map_err(|e| ModelError::Transport(format!("Failed to read Ollama response body: {e}")))?;

        log::debug!("Ollama raw JSON response: {}", super::truncate(&resp_text, 4000));

        reply_content(&resp_text)
    }
}

/// Assistant text of a /api/chat response, exactly as the model produced it.
fn reply_content(resp_text: &str) -> Result<String, ModelError> {
    let parsed: OllamaChatResponse = json::from_str(resp_text)
        .map_err(|e| ModelError::Transport(format!("Failed to decode Ollama JSON: {e}")))?;
    Ok(parsed.message.content)
}

fn classify_send_error(url: &str, e: reqwest::Error) -> ModelError {
    if e.is_connect() {
        ModelError::Unavailable(format!("could not reach Ollama at {url}: {e}"))
    } else {
        ModelError::Transport(format!("Error calling Ollama at {url}: {e}"))
    }
}

/// A 404 from /api/chat means the model is not pulled.
fn classify_status(model: &str, status: StatusCode, body: &str) -> ModelError {
    if status == StatusCode::NOT_FOUND {
        ModelError::Unavailable(format!(
            "model {model:?} is not installed (HTTP 404): {}",
            body.trim()
        ))
    } else {
        ModelError::Transport(format!("Ollama API error: HTTP {} - {}", status.as_u16(), body.trim()))
    }
}
