//! GET /health: upstream probes plus knowledge-base size.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub llm: Vec<HealthStatus>,
    pub knowledge_base: KnowledgeBaseHealth,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeBaseHealth {
    pub collection: String,
    pub ok: bool,
    /// `None` when the vector store could not be reached.
    pub chunks: Option<u64>,
}

/// Handler: GET /health
///
/// Always 200; individual probes report their own `ok` flag.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (llm, count) = tokio::join!(state.llm.health(), state.rag.chunk_count());

    let chunks = match count {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(error = %e, "health: vector store unreachable");
            None
        }
    };

    Json(HealthResponse {
        llm,
        knowledge_base: KnowledgeBaseHealth {
            collection: state.rag.collection().to_string(),
            ok: chunks.is_some(),
            chunks,
        },
    })
}
