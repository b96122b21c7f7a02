//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// One chunk of document text together with where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    /// Original file name of the uploaded document.
    pub source: String,
    /// 1-based page number the chunk was cut from.
    pub page: u32,
}

/// A chunk paired with its embedding, ready for upsert.
#[derive(Clone, Debug)]
pub struct EmbeddedChunk {
    pub record: ChunkRecord,
    pub vector: Vec<f32>,
}

/// A single retrieval hit with score, text and provenance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RagHit {
    pub score: f32,
    pub text: String,
    pub source: Option<String>,
    pub page: Option<u32>,
}

/// Query parameters for retrieval.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: u64,
}
