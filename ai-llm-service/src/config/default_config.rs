//! Default LLM configs loaded from environment variables.
//!
//! Four roles are resolved at startup:
//!
//! - **Primary**   → first worker model
//! - **Secondary** → second worker model
//! - **Judge**     → model that merges the two worker answers
//! - **Embedding** → embedding generator for the knowledge base
//!
//! # Environment variables
//!
//! Chat (workers + judge):
//! - `LLM_KIND`            = `openrouter` (default), `openai` or `ollama`
//! - `LLM_ENDPOINT`        = API base, default `https://openrouter.ai/api`
//! - `OPENROUTER_API_KEY` or `OPENAI_API_KEY` = required for OpenAI-compatible kinds
//! - `MODEL_PRIMARY`, `MODEL_SECONDARY`, `MODEL_JUDGE` = model ids
//! - `LLM_MAX_TOKENS`      = output cap, default `10000`
//! - `LLM_TIMEOUT_SECS`    = optional per-request timeout (unset = wait)
//!
//! Embeddings:
//! - `EMBEDDING_KIND`      = `ollama` (default) or `openai`
//! - `OLLAMA_URL` or `OLLAMA_PORT` = Ollama endpoint, default `http://localhost:11434`
//! - `EMBEDDING_MODEL`     = default `all-minilm`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, validate_http_endpoint},
};

pub const DEFAULT_PRIMARY_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
pub const DEFAULT_SECONDARY_MODEL: &str = "google/gemma-3-27b-it:free";
pub const DEFAULT_JUDGE_MODEL: &str = "mistralai/devstral-2512:free";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
pub const DEFAULT_MAX_TOKENS: u32 = 10_000;

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api";
const OPENAI_ENDPOINT: &str = "https://api.openai.com";
const OLLAMA_DEFAULT_PORT: &str = "11434";

/// The four model roles used by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmProfilesConfig {
    pub primary: LlmModelConfig,
    pub secondary: LlmModelConfig,
    pub judge: LlmModelConfig,
    pub embedding: LlmModelConfig,
}

impl LlmProfilesConfig {
    /// Reads all profiles from the process environment.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads all profiles through an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AiLlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let chat_kind: LlmProvider = vars
            .get("LLM_KIND")
            .unwrap_or_else(|| "openrouter".into())
            .parse()?;
        let base = chat_base(&vars, chat_kind)?;

        let primary = base.with_model(
            vars.get("MODEL_PRIMARY")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.into()),
        );
        let secondary = base.with_model(
            vars.get("MODEL_SECONDARY")
                .unwrap_or_else(|| DEFAULT_SECONDARY_MODEL.into()),
        );
        let judge = base.with_model(
            vars.get("MODEL_JUDGE")
                .unwrap_or_else(|| DEFAULT_JUDGE_MODEL.into()),
        );
        let embedding = embedding_config(&vars)?;

        Ok(Self {
            primary,
            secondary,
            judge,
            embedding,
        })
    }
}

/// Shared connection settings for the chat roles; the model is filled in per role.
fn chat_base<F>(vars: &Vars<F>, kind: LlmProvider) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let max_tokens = vars.opt_u32("LLM_MAX_TOKENS")?.or(Some(DEFAULT_MAX_TOKENS));
    let timeout_secs = vars.opt_u64("LLM_TIMEOUT_SECS")?;

    let (endpoint, api_key) = match kind {
        LlmProvider::OpenAI => {
            let kind_name = vars
                .get("LLM_KIND")
                .map(|k| k.to_ascii_lowercase());
            let default_endpoint = match kind_name.as_deref() {
                Some("openai") => OPENAI_ENDPOINT,
                _ => OPENROUTER_ENDPOINT,
            };
            let endpoint = vars
                .get("LLM_ENDPOINT")
                .unwrap_or_else(|| default_endpoint.into());
            validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;
            let key = vars
                .get("OPENROUTER_API_KEY")
                .or_else(|| vars.get("OPENAI_API_KEY"))
                .ok_or(ConfigError::MissingVar("OPENROUTER_API_KEY or OPENAI_API_KEY"))?;
            (endpoint, Some(key))
        }
        LlmProvider::Ollama => (ollama_endpoint(vars)?, None),
    };

    Ok(LlmModelConfig {
        provider: kind,
        model: String::new(),
        endpoint,
        api_key,
        max_tokens,
        temperature: None,
        top_p: None,
        timeout_secs,
    })
}

fn embedding_config<F>(vars: &Vars<F>) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let kind: LlmProvider = vars
        .get("EMBEDDING_KIND")
        .unwrap_or_else(|| "ollama".into())
        .parse()?;
    let model = vars
        .get("EMBEDDING_MODEL")
        .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into());

    let (endpoint, api_key) = match kind {
        LlmProvider::Ollama => (ollama_endpoint(vars)?, None),
        LlmProvider::OpenAI => {
            let endpoint = vars
                .get("EMBEDDING_ENDPOINT")
                .unwrap_or_else(|| OPENAI_ENDPOINT.into());
            validate_http_endpoint("EMBEDDING_ENDPOINT", &endpoint)?;
            let key = vars
                .get("OPENAI_API_KEY")
                .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
            (endpoint, Some(key))
        }
    };

    Ok(LlmModelConfig {
        provider: kind,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint<F>(vars: &Vars<F>) -> Result<String, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = vars.get("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    let port = vars
        .get("OLLAMA_PORT")
        .unwrap_or_else(|| OLLAMA_DEFAULT_PORT.into());
    port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
        var: "OLLAMA_PORT",
        reason: "expected u16 (1..=65535)",
    })?;
    Ok(format!("http://localhost:{port}"))
}

/// Variable lookup that treats blank values as unset.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn opt_u32(&self, name: &'static str) -> Result<Option<u32>, AiLlmError> {
        self.get(name)
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    AiLlmError::from(ConfigError::InvalidNumber {
                        var: name,
                        reason: "expected u32",
                    })
                })
            })
            .transpose()
    }

    fn opt_u64(&self, name: &'static str) -> Result<Option<u64>, AiLlmError> {
        self.get(name)
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    AiLlmError::from(ConfigError::InvalidNumber {
                        var: name,
                        reason: "expected u64",
                    })
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_target_openrouter_and_local_ollama() {
        let cfg = LlmProfilesConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-or-1")]))
            .unwrap();

        assert_eq!(cfg.primary.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.primary.model, DEFAULT_PRIMARY_MODEL);
        assert_eq!(cfg.secondary.model, DEFAULT_SECONDARY_MODEL);
        assert_eq!(cfg.judge.model, DEFAULT_JUDGE_MODEL);
        assert_eq!(cfg.primary.endpoint, "https://openrouter.ai/api");
        assert_eq!(cfg.primary.max_tokens, Some(10_000));
        assert_eq!(cfg.primary.timeout_secs, None);
        assert_eq!(cfg.embedding.provider, LlmProvider::Ollama);
        assert_eq!(cfg.embedding.endpoint, "http://localhost:11434");
        assert_eq!(cfg.embedding.model, "all-minilm");
    }

    #[test]
    fn api_key_is_required_for_openrouter() {
        let err = LlmProfilesConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn ollama_chat_needs_no_key() {
        let cfg = LlmProfilesConfig::from_lookup(lookup(&[
            ("LLM_KIND", "ollama"),
            ("OLLAMA_PORT", "11500"),
            ("MODEL_PRIMARY", "qwen3:14b"),
            ("LLM_TIMEOUT_SECS", "90"),
        ]))
        .unwrap();

        assert_eq!(cfg.primary.provider, LlmProvider::Ollama);
        assert_eq!(cfg.primary.endpoint, "http://localhost:11500");
        assert_eq!(cfg.primary.model, "qwen3:14b");
        assert_eq!(cfg.primary.api_key, None);
        assert_eq!(cfg.judge.timeout_secs, Some(90));
    }

    #[test]
    fn blank_values_fall_back_to_defaults_and_bad_numbers_fail() {
        let cfg = LlmProfilesConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("MODEL_JUDGE", "   "),
        ]))
        .unwrap();
        assert_eq!(cfg.judge.model, DEFAULT_JUDGE_MODEL);

        let err = LlmProfilesConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("LLM_MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LLM_MAX_TOKENS"));
    }

    #[test]
    fn openai_kind_is_case_insensitive_for_the_endpoint() {
        let cfg = LlmProfilesConfig::from_lookup(lookup(&[
            ("LLM_KIND", " OpenAI "),
            ("OPENAI_API_KEY", "sk-1"),
        ]))
        .unwrap();

        assert_eq!(cfg.primary.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.primary.endpoint, OPENAI_ENDPOINT);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = LlmProfilesConfig::from_lookup(lookup(&[("LLM_KIND", "carrier-pigeon")]))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported provider"));
    }
}
