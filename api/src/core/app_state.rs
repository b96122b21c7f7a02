use std::sync::Arc;

use aggregator::{Aggregator, AggregatorConfig, web_search_from_config};
use ai_llm_service::{ChatBackend, LlmProfilesConfig, LlmServiceProfiles};
use rag_store::{LlmEmbedder, RagConfig, RagStore};
use request_history::{HistoryStore, db_path_from_env};
use tracing::info;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers. Built once at startup.
pub struct AppState {
    pub aggregator: Aggregator,
    pub rag: Arc<RagStore>,
    pub history: HistoryStore,
    /// Used by `/health` to probe upstream providers.
    pub llm: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        rag: Arc<RagStore>,
        history: HistoryStore,
        llm: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            aggregator,
            rag,
            history,
            llm,
        }
    }

    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let profiles = LlmProfilesConfig::from_env()?;
        let agg_cfg = AggregatorConfig::from_env(&profiles)?;
        let rag_cfg = RagConfig::from_env()?;

        let svc = Arc::new(LlmServiceProfiles::new(profiles, None)?);
        let embedder = Arc::new(LlmEmbedder::new(Arc::clone(&svc), rag_cfg.embedding_dim));
        let rag = Arc::new(RagStore::new(rag_cfg, embedder)?);

        let db_path = db_path_from_env();
        let history = HistoryStore::open(&db_path)?;

        let web = web_search_from_config(&agg_cfg)?;
        let llm: Arc<dyn ChatBackend> = svc;

        info!(
            model1 = %agg_cfg.primary_model,
            model2 = %agg_cfg.secondary_model,
            judge = %agg_cfg.judge_model,
            collection = rag.collection(),
            db = %db_path,
            "application state ready"
        );

        let aggregator = Aggregator::new(
            agg_cfg,
            Arc::clone(&llm),
            Arc::clone(&rag),
            web,
            history.clone(),
        );
        Ok(Self::new(aggregator, rag, history, llm))
    }
}
