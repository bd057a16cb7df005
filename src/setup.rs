use anyhow::{Result, bail};
use log::debug;

use crate::config::Config;
use crate::error::ModelError;
use crate::llm::ollama::OllamaClient;

/// Outcome of probing the Ollama server for the configured model.
#[derive(Debug, PartialEq, Eq)]
pub enum Availability {
    Ready,
    ModelMissing,
    Unreachable(String),
}

impl Availability {
    pub fn message(&self, model: &str, ollama_url: &str) -> String {
        match self {
            Availability::Ready => format!("Ollama is running and model '{model}' is installed"),
            Availability::ModelMissing => format!(
                "Ollama is running but model '{model}' is not installed. Install it with 'ollama pull {model}'"
            ),
            Availability::Unreachable(reason) => format!(
                "Ollama is not reachable at {ollama_url} ({reason}). Install it from https://ollama.ai and start it with 'ollama serve'"
            ),
        }
    }
}

/// Build the Ollama client from config.
pub fn build_llm_client(cfg: &Config) -> Result<OllamaClient> {
    debug!("Using OllamaClient at {} with model: {}", cfg.ollama_url, cfg.model);
    OllamaClient::new(cfg.ollama_url.clone(), cfg.timeout())
}

pub fn check_availability(client: &OllamaClient, model: &str) -> Availability {
    match client.list_models() {
        Ok(installed) if model_installed(&installed, model) => Availability::Ready,
        Ok(installed) => {
            debug!("Installed models: {installed:?}");
            Availability::ModelMissing
        }
        Err(ModelError::Unavailable(reason) | ModelError::Transport(reason)) => {
            Availability::Unreachable(reason)
        }
    }
}

/// Fail with an actionable message unless the model is ready to use.
pub fn verify_setup(client: &OllamaClient, cfg: &Config) -> Result<()> {
    let availability = check_availability(client, &cfg.model);
    if availability != Availability::Ready {
        bail!(
            "Ollama setup incomplete: {}",
            availability.message(&cfg.model, &cfg.ollama_url)
        );
    }
    Ok(())
}

/// Ollama tags carry a version suffix; a bare name means `:latest`.
fn model_installed(installed: &[String], model: &str) -> bool {
    installed.iter().any(|name| {
        name == model
            || (!model.contains(':')
                && name
                    .strip_prefix(model)
                    .is_some_and(|rest| rest.starts_with(':')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_name_matches_any_tag() {
        let installed = names(&["codellama:latest", "llama3:8b"]);
        assert!(model_installed(&installed, "codellama"));
        assert!(model_installed(&installed, "llama3"));
        assert!(model_installed(&installed, "llama3:8b"));
    }

    #[test]
    fn tagged_name_must_match_exactly() {
        let installed = names(&["llama3:8b"]);
        assert!(!model_installed(&installed, "llama3:70b"));
        assert!(!model_installed(&installed, "llama"));
        assert!(!model_installed(&[], "codellama"));
    }

    #[test]
    fn messages_name_the_fix() {
        let missing = Availability::ModelMissing.message("codellama", "http://localhost:11434");
        assert!(missing.contains("ollama pull codellama"));

        let down = Availability::Unreachable("connection refused".into())
            .message("codellama", "http://localhost:11434");
        assert!(down.contains("http://localhost:11434"));
        assert!(down.contains("connection refused"));
    }
}
