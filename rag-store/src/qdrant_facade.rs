//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind [`VectorIndex`],
//! hiding away the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`.

use std::collections::HashMap;

use ai_llm_service::BoxFuture;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointId, PointStruct,
    SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder, value,
};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{EmbeddedChunk, RagHit};

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    exact: bool,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports
    /// optional API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            exact: cfg.exact_search,
        })
    }

    async fn exists(&self) -> Result<bool, RagError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))
    }

    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the given vector space configuration.
    async fn ensure_collection(&self, space: VectorSpace) -> Result<(), RagError> {
        if self.exists().await? {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(());
        }

        info!(
            collection = %self.collection,
            size = space.size,
            distance = ?space.distance,
            "creating collection"
        );

        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(())
    }

    /// Upserts a batch of points; every chunk gets a fresh random id.
    async fn upsert_points(&self, chunks: Vec<EmbeddedChunk>) -> Result<u64, RagError> {
        if chunks.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let points: Vec<PointStruct> = chunks.into_iter().map(to_point).collect();
        let n = points.len() as u64;

        info!(points = n, collection = %self.collection, "upserting points");

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!("Upsert operation result={:?}", res.result);
        Ok(n)
    }

    async fn search_points(&self, vector: Vec<f32>, top_k: u64) -> Result<Vec<RagHit>, RagError> {
        if !self.exists().await? {
            warn!(collection = %self.collection, "search on missing collection");
            return Ok(Vec::new());
        }

        debug!(collection = %self.collection, top_k, exact = self.exact, "searching");

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<RagHit> = res
            .result
            .into_iter()
            .map(|p| payload_to_hit(p.score, p.payload))
            .collect();

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }

    async fn count_points(&self) -> Result<u64, RagError> {
        if !self.exists().await? {
            return Ok(0);
        }
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }
}

impl VectorIndex for QdrantFacade {
    fn name(&self) -> &str {
        &self.collection
    }

    fn ensure(&self, space: VectorSpace) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(self.ensure_collection(space))
    }

    fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(self.upsert_points(chunks))
    }

    fn search(&self, vector: Vec<f32>, top_k: u64) -> BoxFuture<'_, Result<Vec<RagHit>, RagError>> {
        Box::pin(self.search_points(vector, top_k))
    }

    fn count(&self) -> BoxFuture<'_, Result<u64, RagError>> {
        Box::pin(self.count_points())
    }
}

fn to_point(chunk: EmbeddedChunk) -> PointStruct {
    let mut payload: HashMap<String, QValue> = HashMap::with_capacity(3);
    payload.insert("text".into(), qstring(chunk.record.text));
    payload.insert("source".into(), qstring(chunk.record.source));
    payload.insert(
        "page".into(),
        QValue {
            kind: Some(value::Kind::IntegerValue(i64::from(chunk.record.page))),
        },
    );

    let pid: PointId = uuid::Uuid::new_v4().to_string().into();

    PointStruct {
        id: Some(pid),
        payload,
        vectors: Some(chunk.vector.into()),
        ..Default::default()
    }
}

fn qstring(s: String) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s)),
    }
}

/// Reads `text`, `source` and `page` back out of a stored payload.
fn payload_to_hit(score: f32, mut payload: HashMap<String, QValue>) -> RagHit {
    use value::Kind as K;

    let mut take_str = |key: &str| match payload.remove(key).and_then(|v| v.kind) {
        Some(K::StringValue(s)) => Some(s),
        _ => None,
    };
    let text = take_str("text").unwrap_or_default();
    let source = take_str("source");
    let page = match payload.remove("page").and_then(|v| v.kind) {
        Some(K::IntegerValue(i)) => u32::try_from(i).ok(),
        Some(K::DoubleValue(f)) if f >= 0.0 => Some(f as u32),
        _ => None,
    };

    RagHit {
        score,
        text,
        source,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChunkRecord;

    #[test]
    fn point_payload_round_trips_into_a_hit() {
        let point = to_point(EmbeddedChunk {
            record: ChunkRecord {
                text: "alpha".into(),
                source: "a.pdf".into(),
                page: 2,
            },
            vector: vec![0.1, 0.2],
        });
        assert!(point.id.is_some());

        let hit = payload_to_hit(0.5, point.payload);
        assert_eq!(hit.text, "alpha");
        assert_eq!(hit.source.as_deref(), Some("a.pdf"));
        assert_eq!(hit.page, Some(2));
    }

    #[test]
    fn every_point_gets_a_fresh_id() {
        let chunk = EmbeddedChunk {
            record: ChunkRecord {
                text: "same".into(),
                source: "same.pdf".into(),
                page: 0,
            },
            vector: vec![1.0],
        };
        let a = to_point(chunk.clone());
        let b = to_point(chunk);
        assert_ne!(a.id, b.id);
    }
}
