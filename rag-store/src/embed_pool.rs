//! Embedding executor with concurrency and dimension checks.

use std::sync::Arc;

use crate::{
    embed::{EmbeddingsProvider, check_dim},
    errors::RagError,
    record::{ChunkRecord, EmbeddedChunk},
};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Embeds every chunk, keeping at most `concurrency` requests in flight.
///
/// Output order matches input order.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if a vector has the wrong size,
/// or the first provider error encountered.
pub async fn embed_all(
    records: Vec<ChunkRecord>,
    provider: Arc<dyn EmbeddingsProvider>,
    expected_dim: usize,
    concurrency: usize,
) -> Result<Vec<EmbeddedChunk>, RagError> {
    info!(
        total = records.len(),
        concurrency, "embed_pool::embed_all"
    );

    if records.is_empty() {
        debug!("embed_pool::embed_all: nothing to embed");
        return Ok(Vec::new());
    }

    // Stream items own their text so the pool future stays `Send`.
    let texts: Vec<(usize, String)> = records
        .iter()
        .map(|r| r.text.clone())
        .enumerate()
        .collect();

    let mut results: Vec<(usize, Vec<f32>)> = stream::iter(texts)
        .map(|(i, text)| {
            let provider = Arc::clone(&provider);
            async move {
                let v = provider.embed(&text).await?;
                Ok::<(usize, Vec<f32>), RagError>((i, check_dim(v, expected_dim)?))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    results.sort_by_key(|(i, _)| *i);

    let out = records
        .into_iter()
        .zip(results)
        .map(|(record, (_, vector))| EmbeddedChunk { record, vector })
        .collect::<Vec<_>>();

    debug!(embedded = out.len(), "embed_pool::embed_all: done");
    Ok(out)
}
