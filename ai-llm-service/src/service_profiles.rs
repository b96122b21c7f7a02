//! Shared LLM service with four profiles: `primary`, `secondary`, `judge` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+key+timeout).
//! - Implements [`ChatBackend`]: a request for any model id is served with the
//!   connection settings of the profile that owns that id, or of `primary`
//!   for ids no profile owns.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatBackend, ChatMessage, ChatRequest, LlmProfilesConfig, LlmServiceProfiles};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(LlmProfilesConfig::from_env()?, None)?);
//!
//! let messages = [ChatMessage::user("Hello world")];
//! let model = svc.profiles().primary.model.clone();
//! let txt = svc
//!     .chat(ChatRequest { model: &model, messages: &messages, max_tokens: None })
//!     .await?;
//! println!("{txt}");
//!
//! let emb = svc.embed("Ferris").await?;
//! println!("Embedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    chat::{BoxFuture, ChatBackend, ChatRequest},
    config::{
        default_config::LlmProfilesConfig, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service that manages the worker, judge and embedding profiles.
///
/// Internally, it caches Ollama/OpenAI clients keyed by their connection
/// settings to avoid recreating HTTP clients on each call.
pub struct LlmServiceProfiles {
    profiles: LlmProfilesConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service from resolved profiles.
    ///
    /// `health_timeout_secs` bounds each health probe (default 10s).
    pub fn new(
        profiles: LlmProfilesConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            profiles,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Current profiles.
    pub fn profiles(&self) -> &LlmProfilesConfig {
        &self.profiles
    }

    /// Computes embeddings using the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let cfg = &self.profiles.embedding;
        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(cfg, ClientKey::embedding(cfg)).await?;
                cli.embeddings(input).await
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(cfg, ClientKey::embedding(cfg)).await?;
                cli.embeddings(input).await
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let p = &self.profiles;
        let mut list: Vec<LlmModelConfig> = Vec::with_capacity(4);
        for cfg in [&p.primary, &p.secondary, &p.judge, &p.embedding] {
            if !list.contains(cfg) {
                list.push(cfg.clone());
            }
        }
        self.health.check_many(&list).await
    }

    /* --------------------- Internals --------------------- */

    /// Profile config that owns `model`, falling back to `primary`'s connection.
    fn config_for(&self, model: &str) -> LlmModelConfig {
        let p = &self.profiles;
        [&p.primary, &p.secondary, &p.judge]
            .into_iter()
            .find(|cfg| cfg.model == model)
            .cloned()
            .unwrap_or_else(|| p.primary.with_model(model))
    }

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
        key: ClientKey,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
        key: ClientKey,
    ) -> Result<Arc<OpenAiService>, AiLlmError> {
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

impl ChatBackend for LlmServiceProfiles {
    fn chat<'a>(&'a self, request: ChatRequest<'a>) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async move {
            let cfg = self.config_for(request.model);
            match cfg.provider {
                LlmProvider::Ollama => {
                    let cli = self.get_or_init_ollama(&cfg, ClientKey::chat(&cfg)).await?;
                    cli.chat(request.model, request.messages, request.max_tokens)
                        .await
                }
                LlmProvider::OpenAI => {
                    let cli = self.get_or_init_openai(&cfg, ClientKey::chat(&cfg)).await?;
                    cli.chat(request.model, request.messages, request.max_tokens)
                        .await
                }
            }
        })
    }

    fn health(&self) -> BoxFuture<'_, Vec<HealthStatus>> {
        Box::pin(self.health_all())
    }
}

/// Internal cache key to identify unique client connections.
///
/// Chat clients receive the model per request, so one chat client serves every
/// model on an endpoint. Embedding clients embed with their configured model,
/// which therefore becomes part of the key.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<u64>,
    embedding_model: Option<String>,
}

impl ClientKey {
    fn chat(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
            embedding_model: None,
        }
    }

    fn embedding(cfg: &LlmModelConfig) -> Self {
        Self {
            embedding_model: Some(cfg.model.clone()),
            ..Self::chat(cfg)
        }
    }
}
