//! Ingestion pipeline: pages → chunks → embeddings → vector index.
//!
//! Every chunk becomes a new point with a random id; ingesting the same
//! document twice stores its chunks twice.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::chunking::TextSplitter;
use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_all;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::pdf::extract_pages;
use crate::record::ChunkRecord;

/// Splits each page into chunks tagged with `source` and the 1-based page number.
pub fn chunk_pages(pages: &[String], source: &str, splitter: &TextSplitter) -> Vec<ChunkRecord> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(page, text)| {
            splitter
                .split(text)
                .into_iter()
                .map(move |text| ChunkRecord {
                    text,
                    source: source.to_string(),
                    page: page as u32 + 1,
                })
        })
        .collect()
}

/// Chunks, embeds and stores already-extracted page texts.
///
/// Returns the number of chunks written. Pages without text contribute nothing;
/// a document with no chunks at all writes nothing and returns 0.
#[instrument(skip_all, fields(source = %source, pages = pages.len()))]
pub async fn ingest_pages(
    cfg: &RagConfig,
    pages: &[String],
    source: &str,
    provider: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn VectorIndex>,
) -> Result<u64, RagError> {
    let splitter = TextSplitter::new(cfg.chunk_size, cfg.chunk_overlap);
    let records = chunk_pages(pages, source, &splitter);
    if records.is_empty() {
        debug!("No chunks produced");
        return Ok(0);
    }
    debug!(chunks = records.len(), "document chunked");

    let embedded = embed_all(
        records,
        provider,
        cfg.embedding_dim,
        cfg.embedding_concurrency,
    )
    .await?;

    index.ensure(cfg.vector_space()).await?;

    let mut total: u64 = 0;
    let mut embedded = embedded.into_iter().peekable();
    while embedded.peek().is_some() {
        let batch: Vec<_> = embedded.by_ref().take(cfg.upsert_batch.max(1)).collect();
        total += index.upsert(batch).await?;
    }

    info!(chunks = total, collection = index.name(), "document ingested");
    Ok(total)
}

/// Extracts a PDF and ingests it under `source`.
pub async fn ingest_pdf_file(
    cfg: &RagConfig,
    path: impl AsRef<Path>,
    source: &str,
    provider: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn VectorIndex>,
) -> Result<u64, RagError> {
    let pages = extract_pages(path).await?;
    ingest_pages(cfg, &pages, source, provider, index).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chunks_carry_source_and_page() {
        let pages = vec!["first page".to_string(), "   ".to_string(), "third".to_string()];
        let records = chunk_pages(&pages, "manual.pdf", &TextSplitter::default());
        assert_eq!(
            records,
            vec![
                ChunkRecord {
                    text: "first page".into(),
                    source: "manual.pdf".into(),
                    page: 1,
                },
                ChunkRecord {
                    text: "third".into(),
                    source: "manual.pdf".into(),
                    page: 3,
                },
            ]
        );
    }
}
