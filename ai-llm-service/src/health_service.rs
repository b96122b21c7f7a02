//! Health probes for LLM backends (Ollama, OpenAI-compatible).
//!
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//! - OpenAI-compatible: `GET {endpoint}/v1/models` with Bearer auth
//!
//! [`HealthService::check`] never fails: any error becomes `ok=false` with a
//! message, which keeps a `/health` endpoint trivially serializable.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Ollama", "OpenAI").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

/// A health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with a client timeout (seconds, default 10).
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(timeout_secs = timeout.as_secs(), "HealthService initialized");

        Ok(Self { client })
    }

    /// Checks a single config, routing to the provider-specific probe.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
        };
        let latency_ms = started.elapsed().as_millis();

        let (ok, message) = match result {
            Ok(true) => (true, "model available".to_string()),
            Ok(false) => (true, "endpoint reachable, model not listed".to_string()),
            Err(e) => {
                warn!(provider = ?cfg.provider, endpoint = %cfg.endpoint, error = %e, "health probe failed");
                (false, e.to_string())
            }
        };

        HealthStatus {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message,
        }
    }

    /// Checks several configs sequentially.
    pub async fn check_many(&self, cfgs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(cfgs.len());
        for cfg in cfgs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Returns whether the model is listed by the Ollama instance.
    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<bool, AiLlmError> {
        #[derive(Deserialize)]
        struct Tags {
            models: Vec<Tag>,
        }
        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }

        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        let resp = check_status(LlmProvider::Ollama, resp, url).await?;
        let tags: Tags = resp.json().await.map_err(|e| {
            ProviderError::new(LlmProvider::Ollama, ProviderErrorKind::Decode(e.to_string()))
        })?;

        // Ollama reports `name:tag`; a bare model name matches `:latest`.
        Ok(tags.models.iter().any(|t| {
            t.name == cfg.model || t.name.strip_suffix(":latest") == Some(cfg.model.as_str())
        }))
    }

    /// Returns whether the model is listed by the OpenAI-compatible endpoint.
    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<bool, AiLlmError> {
        #[derive(Deserialize)]
        struct Models {
            data: Vec<Model>,
        }
        #[derive(Deserialize)]
        struct Model {
            id: String,
        }

        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
        let mut req = self.client.get(&url);
        if let Some(key) = &cfg.api_key {
            req = req.bearer_auth(key);
        }
        debug!("GET {url}");
        let resp = req.send().await?;
        let resp = check_status(LlmProvider::OpenAI, resp, url).await?;
        let models: Models = resp.json().await.map_err(|e| {
            ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::Decode(e.to_string()))
        })?;

        Ok(models.data.iter().any(|m| m.id == cfg.model))
    }
}

async fn check_status(
    provider: LlmProvider,
    resp: reqwest::Response,
    url: String,
) -> Result<reqwest::Response, AiLlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let snippet = make_snippet(&resp.text().await.unwrap_or_default());
    Err(ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url,
            snippet,
        }),
    )
    .into())
}
