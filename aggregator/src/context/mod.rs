//! Context providers: document retrieval and web search, fetched together
//! and merged into the block both workers receive.

pub mod web_search;

use rag_store::RagStore;
use tracing::debug;

use crate::error::AggregatorError;
use web_search::{WebSearch, get_web_context};

pub use rag_store::CONTEXT_SEPARATOR;

/// Fetches document and web context concurrently and merges them.
///
/// Web failures were already absorbed into an empty string; document
/// failures propagate.
pub async fn gather_context(
    rag: &RagStore,
    web: &dyn WebSearch,
    question: &str,
    web_top_k: u32,
) -> Result<String, AggregatorError> {
    let (doc, web) = tokio::join!(
        rag.context_for(question),
        get_web_context(web, question, web_top_k)
    );
    let doc = doc?;
    debug!(doc_chars = doc.len(), web_chars = web.len(), "context gathered");
    Ok(merge_contexts(&doc, &web))
}

/// `--- PDF DATA ---` block followed by the `--- WEB DATA ---` block.
pub fn merge_contexts(doc: &str, web: &str) -> String {
    format!("--- PDF DATA ---\n{doc}\n\n--- WEB DATA ---\n{web}")
}
