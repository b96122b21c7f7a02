//! Typed error for the aggregator crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    /// A worker or judge completion failed.
    #[error("[Aggregator] {stage} failed: {source}")]
    Llm {
        stage: &'static str,
        #[source]
        source: ai_llm_service::AiLlmError,
    },

    /// Document retrieval failed (embedding or vector index).
    #[error("[Aggregator] document context failed: {0}")]
    Context(#[from] rag_store::RagError),

    /// The exchange could not be written to the history table.
    #[error("[Aggregator] persisting history failed: {0}")]
    History(#[from] request_history::HistoryError),

    #[error("[Aggregator] invalid configuration: {0}")]
    Config(String),
}

impl AggregatorError {
    pub(crate) fn llm(stage: &'static str) -> impl FnOnce(ai_llm_service::AiLlmError) -> Self {
        move |source| Self::Llm { stage, source }
    }
}
