use std::sync::Arc;
use tracing::info;

use beanmatch_core::error::{Error, Result};
use beanmatch_core::flavor::FlavorTerm;
use beanmatch_core::traits::Embedder;
use beanmatch_core::types::TextInput;
use beanmatch_core::vector::{add_scaled, cosine_similarity, normalize};

/// Shared embedding front-end.
///
/// Holds the embedding model and the embeddings of the ten flavor terms,
/// computed in one batch at construction and read-only afterwards. Built once
/// and handed to every component by `Arc`.
pub struct EmbeddingProvider {
    embedder: Arc<dyn Embedder>,
    terms: Vec<Vec<f32>>,
}

impl EmbeddingProvider {
    pub fn new(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let vocab: Vec<String> = FlavorTerm::ALL.iter().map(|t| t.as_str().to_string()).collect();
        let mut provider = Self { embedder, terms: Vec::new() };
        provider.terms = provider.embed_batch(&vocab)?;
        info!(dim = provider.dim(), terms = provider.terms.len(), "flavor term embeddings cached");
        Ok(provider)
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text.to_string()])?;
        out.pop().ok_or_else(|| Error::EmbeddingFailure("model returned no embedding".into()))
    }

    /// One model call for all `texts`. The model must answer with exactly one
    /// `dim()`-wide vector per input.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.embedder.embed_batch(texts).map_err(Error::embedding)?;
        if vectors.len() != texts.len() {
            return Err(Error::EmbeddingFailure(format!(
                "model returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        let dim = self.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::EmbeddingFailure(format!("expected {dim}-dim embedding, got {}", bad.len())));
        }
        Ok(vectors)
    }

    pub fn embed_input(&self, input: &TextInput) -> Result<Vec<f32>> {
        self.embed(&input.canonical())
    }

    pub fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    pub fn batch_cosine_similarities(&self, query: &[f32], candidates: &[Vec<f32>]) -> Vec<f32> {
        candidates.iter().map(|c| cosine_similarity(query, c)).collect()
    }

    pub fn term_embedding(&self, term: FlavorTerm) -> &[f32] {
        &self.terms[term.index()]
    }

    /// Unit centroid of all term embeddings: a query that leans toward no
    /// particular flavor.
    pub fn neutral_query(&self) -> Vec<f32> {
        let mut acc = vec![0f32; self.dim()];
        for term in &self.terms {
            add_scaled(&mut acc, term, 1.0);
        }
        normalize(&mut acc);
        acc
    }
}
