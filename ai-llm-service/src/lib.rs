//! Shared LLM service for the aggregator backend.
//!
//! Provides provider clients (OpenAI-compatible and Ollama), a profile registry
//! for the two worker models, the judge model and the embedding model, a
//! [`chat::ChatBackend`] seam used by the orchestration layer, health probes and
//! a tracing layer for binaries.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use chat::{BoxFuture, ChatBackend, ChatMessage, ChatRequest, ChatRole};
pub use config::{
    default_config::LlmProfilesConfig, llm_model_config::LlmModelConfig,
    llm_provider::LlmProvider,
};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
