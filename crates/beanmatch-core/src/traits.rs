use crate::error::Result;
use crate::types::{Document, SearchHit};

/// Text-embedding model. Implementations return L2-normalized vectors of
/// `dim()` floats, one per input, in input order.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Lexical (term-match) index collaborator.
pub trait TextIndexer: Send + Sync {
    fn index(&self, docs: &[Document]) -> anyhow::Result<()>;
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Dense-vector index collaborator. Scores are similarities, higher is better.
pub trait VectorIndexer: Send + Sync {
    fn index(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Produces the ranked candidate pool the orchestrator post-processes.
pub trait CandidateSource: Send + Sync {
    /// Ranked candidates for a free-text query.
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
    /// Ranked candidates for a precomputed query embedding (vector search only).
    fn retrieve_by_vector(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;
}
