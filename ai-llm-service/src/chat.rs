//! Provider-agnostic chat types and the [`ChatBackend`] seam.
//!
//! The orchestration layer only talks to a `dyn ChatBackend`, so tests can
//! swap the HTTP-backed [`crate::LlmServiceProfiles`] for a scripted fake.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

use crate::{error_handler::AiLlmError, health_service::HealthStatus};

/// Boxed, sendable future used by the object-safe traits in this workspace.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Role of a single chat message. Serialized with the names both the
/// OpenAI-compatible and the Ollama chat APIs accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single non-streaming completion request.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model identifier as understood by the provider.
    pub model: &'a str,
    /// Full message list: system first, then prior turns, then the new user turn.
    pub messages: &'a [ChatMessage],
    /// Output token cap; `None` keeps the profile default.
    pub max_tokens: Option<u32>,
}

/// Anything that can turn a [`ChatRequest`] into generated text.
pub trait ChatBackend: Send + Sync {
    /// Runs one completion and returns the assistant text.
    fn chat<'a>(&'a self, request: ChatRequest<'a>) -> BoxFuture<'a, Result<String, AiLlmError>>;

    /// Health snapshot of the upstream providers. Backends without a notion of
    /// health report nothing.
    fn health(&self) -> BoxFuture<'_, Vec<HealthStatus>> {
        Box::pin(async { Vec::new() })
    }
}
