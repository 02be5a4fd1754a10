use anyhow::{anyhow, ensure, Result};
use std::sync::RwLock;

use beanmatch_core::traits::VectorIndexer;
use beanmatch_core::types::{Document, SearchHit, SourceKind};
use beanmatch_core::vector::cosine_similarity;

/// Exhaustive cosine search over an in-memory list. Like the lance table it
/// only appends: chunks sharing an id are all kept, and duplicates are left
/// to the caller's id dedup.
#[derive(Default)]
pub struct MemoryVectorIndex {
    entries: RwLock<Vec<(Document, Vec<f32>)>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VectorIndexer for MemoryVectorIndex {
    fn index(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> Result<()> {
        ensure!(docs.len() == embeddings.len(), "{} documents but {} embeddings", docs.len(), embeddings.len());
        let mut entries = self.entries.write().map_err(|_| anyhow!("vector index lock poisoned"))?;
        entries.extend(docs.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(())
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let entries = self.entries.read().map_err(|_| anyhow!("vector index lock poisoned"))?;
        if let Some((_, emb)) = entries.iter().find(|(_, e)| e.len() != query_vec.len()) {
            return Err(anyhow!("query has {} dims, index holds {}", query_vec.len(), emb.len()));
        }
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|(doc, emb)| SearchHit::new(doc.clone(), cosine_similarity(query_vec, emb), SourceKind::Vector))
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }
}
