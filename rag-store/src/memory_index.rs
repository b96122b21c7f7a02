//! Process-local [`VectorIndex`] with brute-force similarity search.

use ai_llm_service::BoxFuture;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{DistanceKind, VectorSpace};
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{EmbeddedChunk, RagHit};

pub struct MemoryIndex {
    name: String,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    space: Option<VectorSpace>,
    chunks: Vec<EmbeddedChunk>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn ensure(&self, space: VectorSpace) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if let Some(existing) = &inner.space {
                if existing.size != space.size {
                    return Err(RagError::VectorSizeMismatch {
                        got: space.size,
                        want: existing.size,
                    });
                }
                return Ok(());
            }
            debug!(collection = %self.name, size = space.size, "memory index created");
            inner.space = Some(space);
            Ok(())
        })
    }

    fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if let Some(space) = &inner.space {
                if let Some(bad) = chunks.iter().find(|c| c.vector.len() != space.size) {
                    return Err(RagError::VectorSizeMismatch {
                        got: bad.vector.len(),
                        want: space.size,
                    });
                }
            }
            let n = chunks.len() as u64;
            inner.chunks.extend(chunks);
            Ok(n)
        })
    }

    fn search(&self, vector: Vec<f32>, top_k: u64) -> BoxFuture<'_, Result<Vec<RagHit>, RagError>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let distance = inner
                .space
                .as_ref()
                .map(|s| s.distance)
                .unwrap_or(DistanceKind::Cosine);

            let mut scored: Vec<(f32, &EmbeddedChunk)> = inner
                .chunks
                .iter()
                .map(|c| (score(distance, &vector, &c.vector), c))
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));

            Ok(scored
                .into_iter()
                .take(top_k as usize)
                .map(|(score, c)| RagHit {
                    score,
                    text: c.record.text.clone(),
                    source: Some(c.record.source.clone()),
                    page: Some(c.record.page),
                })
                .collect())
        })
    }

    fn count(&self) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(async move { Ok(self.inner.read().await.chunks.len() as u64) })
    }
}

/// Higher is better for every distance kind, matching Qdrant's scoring.
fn score(distance: DistanceKind, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match distance {
        DistanceKind::Dot => dot,
        DistanceKind::Cosine => {
            let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if na == 0.0 || nb == 0.0 {
                0.0
            } else {
                dot / (na * nb)
            }
        }
        DistanceKind::Euclid => -a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}
