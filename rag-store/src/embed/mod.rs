use std::sync::Arc;

use ai_llm_service::{BoxFuture, LlmServiceProfiles};

use crate::errors::RagError;

/// Provider interface for embedding generation.
///
/// Async is required because real providers (Ollama, OpenAI) perform HTTP
/// requests. Implement this trait to plug in another backend or a test fake.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;
}

/// Embeds through the `embedding` profile of the shared LLM service and
/// rejects vectors whose length differs from the configured dimension.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            check_dim(v, self.dim)
        })
    }
}

pub(crate) fn check_dim(v: Vec<f32>, want: usize) -> Result<Vec<f32>, RagError> {
    if v.len() != want {
        return Err(RagError::VectorSizeMismatch { got: v.len(), want });
    }
    Ok(v)
}
