use std::sync::Arc;
use tracing::debug;

use beanmatch_core::config::ExclusionSettings;
use beanmatch_core::error::Result;
use beanmatch_core::fuzzy::{tokenize, FuzzyMatcher};
use beanmatch_core::types::Document;

use crate::provider::EmbeddingProvider;

/// Drops documents that match any negative term, lexically or semantically.
///
/// The lexical pass runs over every document first; only survivors are
/// embedded, in a single batch together with the negative terms.
pub struct ExclusionFilter {
    provider: Arc<EmbeddingProvider>,
    matcher: FuzzyMatcher,
    similarity_threshold: f32,
}

impl ExclusionFilter {
    pub fn new(provider: Arc<EmbeddingProvider>, settings: &ExclusionSettings) -> Self {
        Self {
            provider,
            matcher: FuzzyMatcher::new(settings.fuzzy_threshold),
            similarity_threshold: settings.similarity_threshold,
        }
    }

    /// Keeps the input order. With no (non-blank) negative terms the input is
    /// returned untouched and nothing is embedded.
    pub fn apply<T: AsRef<Document>>(&self, docs: Vec<T>, negative_terms: &[String]) -> Result<Vec<T>> {
        let terms: Vec<String> = negative_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if terms.is_empty() || docs.is_empty() {
            return Ok(docs);
        }

        let before = docs.len();
        let survivors: Vec<T> = docs
            .into_iter()
            .filter(|doc| {
                let blocked = self.lexically_blocked(&doc.as_ref().text, &terms);
                if blocked {
                    debug!(id = %doc.as_ref().id, "excluded by lexical match");
                }
                !blocked
            })
            .collect();
        if survivors.is_empty() {
            debug!(before, "every document excluded lexically");
            return Ok(survivors);
        }

        let term_embeddings = self.provider.embed_batch(&terms)?;
        let texts: Vec<String> = survivors.iter().map(|d| d.as_ref().text.clone()).collect();
        let doc_embeddings = self.provider.embed_batch(&texts)?;

        let kept: Vec<T> = survivors
            .into_iter()
            .zip(doc_embeddings)
            .filter(|(doc, emb)| {
                let sims = self.provider.batch_cosine_similarities(emb, &term_embeddings);
                let keep = sims.iter().all(|s| *s < self.similarity_threshold);
                if !keep {
                    debug!(id = %doc.as_ref().id, ?sims, "excluded by semantic match");
                }
                keep
            })
            .map(|(doc, _)| doc)
            .collect();
        debug!(before, after = kept.len(), "exclusion applied");
        Ok(kept)
    }

    fn lexically_blocked(&self, text: &str, terms: &[String]) -> bool {
        let tokens = tokenize(text);
        terms.iter().any(|term| self.matcher.contains(&tokens, term))
    }
}
