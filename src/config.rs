use crate::cli_args::Cli;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MODEL: &str = "codellama";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Keys understood by [`Config::value`].
pub const KEYS: &[&str] = &["model", "ollama_url", "timeout_secs"];

/// Final resolved configuration for codekoala.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub model: String,
    pub ollama_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--model`, `--ollama-url`)
    ///   2. Env vars `CODEKOALA_MODEL`, `OLLAMA_HOST`
    ///   3. TOML `~/.config/codekoala.toml`
    ///   4. Hardcoded defaults ("codellama", "http://localhost:11434")
    pub fn from_sources(cli: &Cli) -> Self {
        let file_cfg = load_file_config().unwrap_or_default();
        Self::resolve(cli, |key| env::var(key).ok(), file_cfg)
    }

    fn resolve(cli: &Cli, env_var: impl Fn(&str) -> Option<String>, file_cfg: FileConfig) -> Self {
        let model = cli
            .model
            .clone()
            .or_else(|| env_var("CODEKOALA_MODEL"))
            .or(file_cfg.model)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let ollama_url = cli
            .ollama_url
            .clone()
            .or_else(|| env_var("OLLAMA_HOST"))
            .or(file_cfg.ollama_url)
            .filter(|u| !u.trim().is_empty())
            .map(|u| normalize_url(&u))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let timeout_secs = file_cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            model,
            ollama_url,
            timeout_secs,
        }
    }

    /// Look up a single setting by key, as printed by `codekoala config <key>`.
    pub fn value(&self, key: &str) -> Option<String> {
        match key {
            "model" => Some(self.model.clone()),
            "ollama_url" => Some(self.ollama_url.clone()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    /// Default model to use when not provided via CLI or env.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Persist `model` as the default in the config file, keeping other settings.
pub fn save_default_model(model: &str) -> Result<PathBuf> {
    let path = config_path().context("could not determine home directory")?;
    let mut file_cfg = load_file_config().unwrap_or_default();
    file_cfg.model = Some(model.trim().to_string());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {:?}", parent))?;
    }
    let data = toml::to_string(&file_cfg).context("failed to serialize config")?;
    fs::write(&path, data).with_context(|| format!("failed to write config to {:?}", path))?;

    log::info!("Saved default model {model:?} to {:?}", path);
    Ok(path)
}

/// Return `~/.config/codekoala.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("codekoala.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Ignoring unreadable config {:?}: {e}", path);
            None
        }
    }
}

/// `OLLAMA_HOST` is often just `host:port`.
fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
