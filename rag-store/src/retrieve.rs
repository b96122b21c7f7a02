//! Retrieval helpers: query embedding, top-K search and context assembly.

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{RagHit, RagQuery};

use tracing::trace;

/// Separator placed between retrieved chunks in a context block.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Embeds the query text and returns the nearest chunks, best first.
///
/// An empty index (or a missing collection) yields no hits without calling
/// the embedder.
///
/// # Errors
/// Returns embedding/provider errors or index failures.
pub async fn rag_context(
    index: &dyn VectorIndex,
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RagHit>, RagError> {
    trace!(top_k = query.top_k, "retrieve::rag_context");

    if index.count().await? == 0 {
        trace!("retrieve::rag_context: index empty");
        return Ok(Vec::new());
    }

    let qv = provider.embed(query.text).await?;
    let hits = index.search(qv, query.top_k).await?;

    trace!(hits = hits.len(), "retrieve::rag_context done");
    Ok(hits)
}

/// Joins hit texts with [`CONTEXT_SEPARATOR`], preserving rank order.
pub fn join_hits(hits: &[RagHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
