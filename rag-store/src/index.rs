//! Vector index seam shared by the Qdrant and in-memory backends.

use ai_llm_service::BoxFuture;

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::record::{EmbeddedChunk, RagHit};

/// Storage for embedded chunks with nearest-neighbour search.
pub trait VectorIndex: Send + Sync {
    /// Human-readable collection name.
    fn name(&self) -> &str;

    /// Creates the collection if it does not exist yet.
    fn ensure(&self, space: VectorSpace) -> BoxFuture<'_, Result<(), RagError>>;

    /// Stores chunks; returns how many were written.
    fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> BoxFuture<'_, Result<u64, RagError>>;

    /// Returns up to `top_k` hits, best first. An empty or missing collection
    /// yields an empty list.
    fn search(&self, vector: Vec<f32>, top_k: u64) -> BoxFuture<'_, Result<Vec<RagHit>, RagError>>;

    /// Number of stored chunks.
    fn count(&self) -> BoxFuture<'_, Result<u64, RagError>>;
}
