use std::sync::Arc;
use tracing::{debug, info};

use beanmatch_core::error::{Error, Result};
use beanmatch_core::traits::{CandidateSource, TextIndexer, VectorIndexer};
use beanmatch_core::types::{Document, SearchHit, SourceKind};
use beanmatch_flavor::EmbeddingProvider;

use crate::fusion::{fuse, FusionWeights};

const INDEX_BATCH: usize = 64;

/// Vector plus lexical retrieval merged by weighted rank fusion.
pub struct HybridRetriever {
    provider: Arc<EmbeddingProvider>,
    vector: Arc<dyn VectorIndexer>,
    text: Arc<dyn TextIndexer>,
    weights: FusionWeights,
}

impl HybridRetriever {
    pub fn new(
        provider: Arc<EmbeddingProvider>,
        vector: Arc<dyn VectorIndexer>,
        text: Arc<dyn TextIndexer>,
        weights: FusionWeights,
    ) -> Self {
        Self { provider, vector, text, weights }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    pub fn set_weights(&mut self, weights: FusionWeights) {
        self.weights = weights;
    }

    /// Embeds `docs` in batches and writes them to both indexes.
    pub fn index(&self, docs: &[Document]) -> Result<()> {
        let mut embeddings = Vec::with_capacity(docs.len());
        for batch in docs.chunks(INDEX_BATCH) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            embeddings.extend(self.provider.embed_batch(&texts)?);
        }
        self.vector
            .index(docs, &embeddings)
            .map_err(|e| Error::retrieval(SourceKind::Vector, e))?;
        self.text.index(docs).map_err(|e| Error::retrieval(SourceKind::Text, e))?;
        info!(docs = docs.len(), "documents indexed");
        Ok(())
    }

    fn vector_hits(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.vector
            .search_vec(query_vec, k)
            .map_err(|e| Error::retrieval(SourceKind::Vector, e))
    }
}

impl CandidateSource for HybridRetriever {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_vec = self.provider.embed(query)?;
        let semantic = self.vector_hits(&query_vec, k)?;
        let lexical = self.text.search(query, k).map_err(|e| Error::retrieval(SourceKind::Text, e))?;
        let mut fused = fuse(&[(&semantic[..], self.weights.semantic), (&lexical[..], self.weights.lexical)], self.weights.rrf_k);
        fused.truncate(k);
        debug!(semantic = semantic.len(), lexical = lexical.len(), fused = fused.len(), "hybrid retrieval");
        Ok(fused)
    }

    fn retrieve_by_vector(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.vector_hits(query_vec, k)
    }
}
