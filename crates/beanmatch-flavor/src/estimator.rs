use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use beanmatch_core::config::FlavorSettings;
use beanmatch_core::error::Result;
use beanmatch_core::flavor::{FlavorTerm, FlavorVector};
use beanmatch_core::fuzzy::{tokenize, FuzzyMatcher};
use beanmatch_core::vector::round3;

use crate::provider::EmbeddingProvider;

/// Scores text against the ten flavor terms.
///
/// Per term: `round3((cos(text, term) + 1) / 2)` plus a lexical boost of
/// `boost_per_match` for every token fuzzily matching the term, capped at
/// `max_lexical_boost`; the sum is clamped to `[0, 1]` and rounded again.
pub struct FlavorVectorEstimator {
    provider: Arc<EmbeddingProvider>,
    matcher: FuzzyMatcher,
    boost_per_match: f32,
    max_lexical_boost: f32,
}

impl FlavorVectorEstimator {
    pub fn new(provider: Arc<EmbeddingProvider>, settings: &FlavorSettings) -> Self {
        Self {
            provider,
            matcher: FuzzyMatcher::new(settings.fuzzy_threshold),
            boost_per_match: settings.boost_per_match,
            max_lexical_boost: settings.max_lexical_boost,
        }
    }

    pub fn score_text(&self, text: &str) -> Result<FlavorVector> {
        let embedding = self.provider.embed(text)?;
        Ok(self.score_embedded(text, &embedding))
    }

    /// Scores many texts with one embedding call; the per-text scoring runs
    /// in parallel since each text is independent.
    pub fn score_batch(&self, texts: &[String]) -> Result<Vec<FlavorVector>> {
        let embeddings = self.provider.embed_batch(texts)?;
        debug!(texts = texts.len(), "scoring flavor profiles");
        Ok(texts
            .par_iter()
            .zip(embeddings.par_iter())
            .map(|(text, emb)| self.score_embedded(text, emb))
            .collect())
    }

    fn score_embedded(&self, text: &str, embedding: &[f32]) -> FlavorVector {
        let tokens = tokenize(text);
        let mut out = FlavorVector::uniform(0.0);
        for term in FlavorTerm::ALL {
            let sim = self.provider.cosine_similarity(embedding, self.provider.term_embedding(term));
            let semantic = round3((sim + 1.0) / 2.0);
            let score = (semantic + self.lexical_boost(&tokens, term)).clamp(0.0, 1.0);
            out.set(term, round3(score));
        }
        out
    }

    fn lexical_boost(&self, tokens: &[String], term: FlavorTerm) -> f32 {
        let count = self.matcher.count_matches(tokens, term.as_str());
        (count as f32 * self.boost_per_match).min(self.max_lexical_boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanmatch_testkit::ConceptEmbedder;

    fn estimator() -> FlavorVectorEstimator {
        let provider = Arc::new(EmbeddingProvider::new(Arc::new(ConceptEmbedder::new())).unwrap());
        FlavorVectorEstimator::new(provider, &FlavorSettings::default())
    }

    #[test]
    fn every_term_is_scored_within_unit_range() {
        let est = estimator();
        for text in ["", "   ", "!!!", "sweet sweet sweet sweet sweet", "Dark cocoa, cedar and burnt sugar"] {
            let v = est.score_text(text).unwrap();
            assert_eq!(v.iter().count(), 10);
            assert!(v.iter().all(|(_, s)| (0.0..=1.0).contains(&s)), "{text:?} -> {v:?}");
        }
    }

    #[test]
    fn lexical_boost_is_capped() {
        let est = estimator();
        let tokens = tokenize("sweet sweet sweet sweet sweet");
        assert!((est.lexical_boost(&tokens, FlavorTerm::Sweet) - 0.3).abs() < 1e-6);
        assert_eq!(est.lexical_boost(&tokens, FlavorTerm::Bitter), 0.0);
    }

    #[test]
    fn boost_is_per_term() {
        let est = estimator();
        let tokens = tokenize("fruity and chocolatey");
        assert!((est.lexical_boost(&tokens, FlavorTerm::Fruit) - 0.1).abs() < 1e-6);
        assert!((est.lexical_boost(&tokens, FlavorTerm::Chocolate) - 0.1).abs() < 1e-6);
        assert_eq!(est.lexical_boost(&tokens, FlavorTerm::Citrus), 0.0);
    }

    #[test]
    fn scores_are_rounded_to_three_decimals() {
        let v = estimator().score_text("honey and plum").unwrap();
        for (_, s) in v.iter() {
            assert!(((s * 1000.0).round() - s * 1000.0).abs() < 1e-3);
        }
    }

    #[test]
    fn batch_matches_single() {
        let est = estimator();
        let texts = vec!["lemon zest".to_string(), "cedar smoke".to_string()];
        let batch = est.score_batch(&texts).unwrap();
        assert_eq!(batch[0], est.score_text("lemon zest").unwrap());
        assert_eq!(batch[1], est.score_text("cedar smoke").unwrap());
    }
}
