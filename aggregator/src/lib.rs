//! Two-model answer aggregation.
//!
//! Public API: [`Aggregator::ask`]. It gathers document context from
//! `rag-store` and web context from a [`WebSearch`] concurrently, asks two
//! worker models in parallel over the merged context, lets a judge model merge
//! their answers (skipped when both start identically), logs all three answers
//! to `request-history`, and returns them with timings.

mod config;
mod error;
mod generator;
mod judge;
mod orchestrator;

pub mod context;

pub use config::{AggregatorConfig, DEFAULT_JUDGE_PREFIX_CHARS, DEFAULT_WEB_TOP_K};
pub use context::web_search::{
    DisabledWebSearch, TavilySearch, WebHit, WebSearch, WebSearchError, get_web_context,
};
pub use context::{gather_context, merge_contexts};
pub use error::AggregatorError;
pub use generator::{AnswerGenerator, EMPTY_CONTEXT_PLACEHOLDER, TimedAnswer, system_prompt};
pub use judge::{Judge, SHORTCUT_DURATION, merge_prompt, shares_prefix};
pub use orchestrator::{Aggregator, AskInput, AskOutcome, ModelAnswer};

use std::sync::Arc;

/// Tavily when an API key is configured, otherwise a search that always
/// fails (and therefore contributes an empty web context).
pub fn web_search_from_config(cfg: &AggregatorConfig) -> Result<Arc<dyn WebSearch>, AggregatorError> {
    match &cfg.tavily_api_key {
        Some(key) => {
            let search = TavilySearch::new(key.clone())
                .map_err(|e| AggregatorError::Config(e.to_string()))?;
            Ok(Arc::new(search))
        }
        None => {
            tracing::warn!("TAVILY_API_KEY not set, web context disabled");
            Ok(Arc::new(DisabledWebSearch))
        }
    }
}
