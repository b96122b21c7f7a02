//! Runtime and collection configuration.

use std::str::FromStr;

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Which vector index backs the knowledge base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorBackend {
    /// Persistent Qdrant collection.
    Qdrant,
    /// Process-local index, lost on restart.
    Memory,
}

impl FromStr for VectorBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(RagError::Config(format!(
                "unsupported VECTOR_STORE '{other}' (expected qdrant|memory)"
            ))),
        }
    }
}

/// Configuration for ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    pub backend: VectorBackend,
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Expected embedding dimension; every vector is checked against it.
    pub embedding_dim: usize,
    /// Maximum number of in-flight embedding requests during ingestion.
    pub embedding_concurrency: usize,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Number of chunks returned per query.
    pub top_k: u64,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            embedding_dim: 384,
            embedding_concurrency: 4,
            upsert_batch: 256,
            exact_search: false,
            top_k: 3,
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }

    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, RagError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`RagConfig::from_env`] with an injectable variable source.
    ///
    /// Recognized: `VECTOR_STORE`, `QDRANT_URL`, `QDRANT_API_KEY`,
    /// `QDRANT_COLLECTION`, `EMBEDDING_DIM`, `EMBEDDING_CONCURRENCY`,
    /// `RAG_TOP_K`, `QDRANT_EXACT_SEARCH`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let mut cfg = Self::new_default(
            get("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".into()),
            get("QDRANT_COLLECTION").unwrap_or_else(|| "knowledge_base".into()),
        );
        if let Some(v) = get("VECTOR_STORE") {
            cfg.backend = v.parse()?;
        }
        cfg.qdrant_api_key = get("QDRANT_API_KEY");
        if let Some(v) = get("EMBEDDING_DIM") {
            cfg.embedding_dim = parse_num("EMBEDDING_DIM", &v)?;
        }
        if let Some(v) = get("EMBEDDING_CONCURRENCY") {
            cfg.embedding_concurrency = parse_num("EMBEDDING_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("RAG_TOP_K") {
            cfg.top_k = parse_num("RAG_TOP_K", &v)?;
        }
        if let Some(v) = get("QDRANT_EXACT_SEARCH") {
            cfg.exact_search = matches!(v.trim(), "1" | "true" | "yes");
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.backend == VectorBackend::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == 0 {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn vector_space(&self) -> VectorSpace {
        VectorSpace {
            size: self.embedding_dim,
            distance: self.distance,
        }
    }
}

fn parse_num<T: FromStr>(var: &str, raw: &str) -> Result<T, RagError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| RagError::Config(format!("{var}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = RagConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.backend, VectorBackend::Qdrant);
        assert_eq!(cfg.collection, "knowledge_base");
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.embedding_dim, 384);
        assert_eq!((cfg.chunk_size, cfg.chunk_overlap), (500, 50));
    }

    #[test]
    fn memory_backend_and_numbers_are_parsed() {
        let cfg = RagConfig::from_lookup(|k| match k {
            "VECTOR_STORE" => Some("memory".into()),
            "RAG_TOP_K" => Some("5".into()),
            "EMBEDDING_DIM" => Some("768".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.backend, VectorBackend::Memory);
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.embedding_dim, 768);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = RagConfig::from_lookup(|k| (k == "RAG_TOP_K").then(|| "three".into()))
            .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));

        let err = RagConfig::from_lookup(|k| (k == "VECTOR_STORE").then(|| "chroma".into()))
            .unwrap_err();
        assert!(err.to_string().contains("chroma"));
    }
}
