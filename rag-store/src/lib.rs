//! High-level knowledge-base facade: PDF ingestion + retrieval over a vector index.
//!
//! This crate provides a clean API to:
//! - Extract PDF pages, split them into overlapping chunks and store their embeddings
//! - Retrieve top‑K context for a textual query
//!
//! The design is flat (no deep nesting) and splits responsibilities into focused modules.

mod chunking;
mod config;
mod embed;
mod embed_pool;
mod errors;
mod index;
mod ingest;
mod memory_index;
mod pdf;
mod qdrant_facade;
mod record;
mod retrieve;

use std::path::Path;
use std::sync::Arc;

pub use chunking::TextSplitter;
pub use config::{DistanceKind, RagConfig, VectorBackend, VectorSpace};
pub use embed::{EmbeddingsProvider, LlmEmbedder};
pub use errors::RagError;
pub use index::VectorIndex;
pub use ingest::chunk_pages;
pub use memory_index::MemoryIndex;
pub use pdf::extract_pages;
pub use qdrant_facade::QdrantFacade;
pub use record::{ChunkRecord, EmbeddedChunk, RagHit, RagQuery};
pub use retrieve::{CONTEXT_SEPARATOR, join_hits};

use tracing::{debug, trace};

/// High-level facade that wires configuration, embedder and vector index.
///
/// This is the single entry point recommended for application code. It is
/// cheap to share behind an `Arc` and safe to use from concurrent requests.
pub struct RagStore {
    cfg: RagConfig,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl RagStore {
    /// Constructs a store over the backend selected by `cfg.backend`.
    ///
    /// # Errors
    /// Returns `RagError::Config` / `RagError::Qdrant` if the client initialization fails.
    pub fn new(cfg: RagConfig, embedder: Arc<dyn EmbeddingsProvider>) -> Result<Self, RagError> {
        trace!(collection = %cfg.collection, backend = ?cfg.backend, "RagStore::new");
        let index: Arc<dyn VectorIndex> = match cfg.backend {
            VectorBackend::Qdrant => Arc::new(QdrantFacade::new(&cfg)?),
            VectorBackend::Memory => Arc::new(MemoryIndex::new(cfg.collection.clone())),
        };
        Ok(Self::with_index(cfg, index, embedder))
    }

    /// Constructs a store over an explicit index.
    pub fn with_index(
        cfg: RagConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        Self {
            cfg,
            index,
            embedder,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Extracts, chunks, embeds and stores a PDF. Returns the chunk count.
    ///
    /// # Errors
    /// Returns errors on I/O, PDF parsing, embedding, vector size mismatch, or index failures.
    pub async fn ingest_pdf(&self, path: impl AsRef<Path>, source: &str) -> Result<u64, RagError> {
        debug!(path = ?path.as_ref(), source, "RagStore::ingest_pdf");
        ingest::ingest_pdf_file(
            &self.cfg,
            path,
            source,
            Arc::clone(&self.embedder),
            Arc::clone(&self.index),
        )
        .await
    }

    /// Same as [`RagStore::ingest_pdf`] for pages extracted elsewhere.
    pub async fn ingest_pages(&self, pages: &[String], source: &str) -> Result<u64, RagError> {
        ingest::ingest_pages(
            &self.cfg,
            pages,
            source,
            Arc::clone(&self.embedder),
            Arc::clone(&self.index),
        )
        .await
    }

    /// Returns the `top_k` chunks nearest to `query`.
    ///
    /// # Errors
    /// Returns embedding errors or index failures.
    pub async fn rag_context(&self, query: RagQuery<'_>) -> Result<Vec<RagHit>, RagError> {
        trace!(top_k = query.top_k, "RagStore::rag_context");
        retrieve::rag_context(self.index.as_ref(), query, self.embedder.as_ref()).await
    }

    /// Document context for `question`: the configured top-K chunk texts
    /// joined with [`CONTEXT_SEPARATOR`]. Empty when nothing is stored.
    pub async fn context_for(&self, question: &str) -> Result<String, RagError> {
        let hits = self
            .rag_context(RagQuery {
                text: question,
                top_k: self.cfg.top_k,
            })
            .await?;
        Ok(join_hits(&hits))
    }

    /// Number of chunks in the knowledge base.
    pub async fn chunk_count(&self) -> Result<u64, RagError> {
        self.index.count().await
    }

    pub fn collection(&self) -> &str {
        self.index.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::BoxFuture;
    use pretty_assertions::assert_eq;

    /// Maps text onto a 3-dim bag of letters so related texts land close together.
    struct LetterEmbedder;

    impl EmbeddingsProvider for LetterEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async move {
                let count = |c: char| text.chars().filter(|x| *x == c).count() as f32;
                Ok(vec![count('a') + 0.01, count('b') + 0.01, count('c') + 0.01])
            })
        }
    }

    struct DownEmbedder;

    impl EmbeddingsProvider for DownEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async { Err(RagError::Config("embedding service down".into())) })
        }
    }

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/two_pages.pdf");

    fn assert_send<T: Send>(_: &T) {}

    fn store() -> RagStore {
        let mut cfg = RagConfig::new_default("http://unused", "kb");
        cfg.backend = VectorBackend::Memory;
        cfg.embedding_dim = 3;
        cfg.top_k = 2;
        RagStore::new(cfg, Arc::new(LetterEmbedder)).unwrap()
    }

    #[tokio::test]
    async fn empty_store_gives_empty_context() {
        let store = store();
        assert_eq!(store.context_for("anything").await.unwrap(), "");
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_store_does_not_need_the_embedder() {
        let mut cfg = RagConfig::new_default("http://unused", "kb");
        cfg.backend = VectorBackend::Memory;
        let store = RagStore::new(cfg, Arc::new(DownEmbedder)).unwrap();

        assert_eq!(store.context_for("anything").await.unwrap(), "");
    }

    #[tokio::test]
    async fn embedder_failure_surfaces_once_chunks_exist() {
        let good = store();
        good.ingest_pages(&["abc".to_string()], "doc.pdf").await.unwrap();
        let cfg = good.config().clone();
        let down = RagStore::with_index(cfg, Arc::clone(&good.index), Arc::new(DownEmbedder));

        let err = down.context_for("abc").await.unwrap_err();
        assert!(matches!(err, RagError::Config(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn pdf_ingest_future_is_send_and_stores_every_page() {
        let store = store();

        let fut = store.ingest_pdf(FIXTURE, "two_pages.pdf");
        assert_send(&fut);
        assert_eq!(fut.await.unwrap(), 2);

        assert_eq!(store.ingest_pdf(FIXTURE, "two_pages.pdf").await.unwrap(), 2);
        assert_eq!(store.chunk_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn context_joins_top_k_hits_in_rank_order() {
        let store = store();
        let pages = vec!["aaaa".to_string(), "bbbb".to_string(), "cccc".to_string()];
        assert_eq!(store.ingest_pages(&pages, "abc.pdf").await.unwrap(), 3);

        let ctx = store.context_for("aaa b").await.unwrap();
        assert_eq!(ctx, "aaaa\n---\nbbbb");
    }

    #[tokio::test]
    async fn reingesting_adds_the_same_number_of_chunks_again() {
        let store = store();
        let pages = vec!["alpha beta".to_string(), "gamma".to_string()];

        let first = store.ingest_pages(&pages, "doc.pdf").await.unwrap();
        let second = store.ingest_pages(&pages, "doc.pdf").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.chunk_count().await.unwrap(), first * 2);
    }

    #[tokio::test]
    async fn wrong_embedding_dimension_fails_ingest() {
        let mut cfg = RagConfig::new_default("http://unused", "kb");
        cfg.backend = VectorBackend::Memory;
        cfg.embedding_dim = 384;
        let store = RagStore::new(cfg, Arc::new(LetterEmbedder)).unwrap();

        let err = store
            .ingest_pages(&["abc".to_string()], "doc.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 384 }));
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }
}
