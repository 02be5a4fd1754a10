use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use beanmatch_core::config::Settings;
use beanmatch_core::error::{Error, Result};
use beanmatch_core::flavor::{FlavorVector, SliderPreferences};
use beanmatch_core::traits::CandidateSource;
use beanmatch_core::types::{FilterSpec, RankedResult, SearchHit, TextInput};
use beanmatch_flavor::{EmbeddingProvider, ExclusionFilter, FlavorProfiler, QueryPreferenceBuilder};

/// End-to-end search: candidate pool, dedup, metadata filter, exclusion,
/// optional rejection rerank, top-N.
pub struct SearchOrchestrator {
    retriever: Arc<dyn CandidateSource>,
    provider: Arc<EmbeddingProvider>,
    profiler: FlavorProfiler,
    exclusion: ExclusionFilter,
    preferences: QueryPreferenceBuilder,
    candidate_pool: usize,
    top_n: usize,
    rejection_weight: f32,
}

impl SearchOrchestrator {
    pub fn new(retriever: Arc<dyn CandidateSource>, provider: Arc<EmbeddingProvider>, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            retriever,
            profiler: FlavorProfiler::new(provider.clone(), &settings.flavor),
            exclusion: ExclusionFilter::new(provider.clone(), &settings.exclusion),
            preferences: QueryPreferenceBuilder::new(provider.clone()),
            provider,
            candidate_pool: settings.retrieval.candidate_pool,
            top_n: settings.retrieval.top_n,
            rejection_weight: settings.rerank.rejection_weight,
        })
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Free-text search. An empty query is rejected; an empty result is not
    /// an error.
    pub fn search(&self, query: impl Into<TextInput>, filters: &FilterSpec, negative_terms: &[String]) -> Result<Vec<RankedResult>> {
        let input: TextInput = query.into();
        let canonical = input.canonical();
        let query = canonical.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }
        let pool = self.retriever.retrieve(query, self.candidate_pool)?;
        info!(query, pool = pool.len(), "candidate pool retrieved");
        let survivors = self.post_process(pool, filters, negative_terms)?;
        Ok(finalize(survivors, self.top_n))
    }

    /// Slider search: the positive preference embedding (or a neutral query
    /// when no slider leans right) drives vector retrieval; when some slider
    /// leans left, survivors are reranked by
    /// `score - rejection_weight * cos(doc, negative)`.
    pub fn search_by_flavor_preferences(
        &self,
        preferences: &SliderPreferences,
        filters: &FilterSpec,
        negative_terms: &[String],
    ) -> Result<Vec<RankedResult>> {
        let pair = self.preferences.build_query_embedding(preferences)?;
        let query_vec = if pair.has_positive() {
            pair.positive.clone()
        } else {
            debug!("no positive preference, using neutral flavor query");
            self.provider.neutral_query()
        };
        let pool = self.retriever.retrieve_by_vector(&query_vec, self.candidate_pool)?;
        info!(pool = pool.len(), "preference candidate pool retrieved");

        let survivors = self.post_process(pool, filters, negative_terms)?;
        let mut results: Vec<RankedResult> = survivors.into_iter().map(RankedResult::from).collect();
        if pair.has_negative() && !results.is_empty() {
            let texts: Vec<String> = results.iter().map(|r| r.document.text.clone()).collect();
            let embeddings = self.provider.embed_batch(&texts)?;
            for (result, emb) in results.iter_mut().zip(&embeddings) {
                result.rejection_penalty = Some(self.provider.cosine_similarity(emb, &pair.negative));
            }
            let w = self.rejection_weight;
            results.sort_by(|a, b| b.final_score(w).total_cmp(&a.final_score(w)));
            debug!(results = results.len(), "rejection rerank applied");
        }
        results.truncate(self.top_n);
        Ok(assign_ranks(results))
    }

    /// Estimated flavor profile of `text` with axis contrast applied once.
    pub fn analyze_flavor(&self, text: impl Into<TextInput>) -> Result<FlavorVector> {
        let input: TextInput = text.into();
        self.profiler.profile(&input.canonical())
    }

    /// Attaches a flavor profile to every result.
    pub fn annotate(&self, results: &mut [RankedResult]) -> Result<()> {
        let texts: Vec<String> = results.iter().map(|r| r.document.text.clone()).collect();
        let profiles = self.profiler.profile_batch(&texts)?;
        for (result, profile) in results.iter_mut().zip(profiles) {
            result.flavor_profile = Some(profile);
        }
        Ok(())
    }

    fn post_process(&self, pool: Vec<SearchHit>, filters: &FilterSpec, negative_terms: &[String]) -> Result<Vec<SearchHit>> {
        if pool.is_empty() {
            warn!("retriever returned no candidates");
        }
        let unique = dedup_by_id(pool, self.top_n);
        let unique_count = unique.len();
        let filtered: Vec<SearchHit> = unique.into_iter().filter(|h| h.document.matches_filters(filters)).collect();
        let filtered_count = filtered.len();
        let kept = self.exclusion.apply(filtered, negative_terms)?;
        info!(unique = unique_count, filtered = filtered_count, kept = kept.len(), "candidates post-processed");
        Ok(kept)
    }
}

/// First occurrence of each id, in order, stopping once `limit` are kept.
fn dedup_by_id(hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(limit.min(hits.len()));
    for hit in hits {
        if out.len() >= limit {
            break;
        }
        if seen.insert(hit.document.id.clone()) {
            out.push(hit);
        }
    }
    out
}

fn finalize(hits: Vec<SearchHit>, top_n: usize) -> Vec<RankedResult> {
    assign_ranks(hits.into_iter().take(top_n).map(RankedResult::from).collect())
}

fn assign_ranks(mut results: Vec<RankedResult>) -> Vec<RankedResult> {
    for (i, r) in results.iter_mut().enumerate() {
        r.rank = i + 1;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanmatch_core::types::{Document, SourceKind};

    fn hits(ids: &[&str]) -> Vec<SearchHit> {
        ids.iter().map(|id| SearchHit::new(Document::new(*id, *id), 1.0, SourceKind::Hybrid)).collect()
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let out = dedup_by_id(hits(&["a", "a", "b", "c", "a", "d"]), 10);
        let ids: Vec<_> = out.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn dedup_stops_at_limit() {
        let out = dedup_by_id(hits(&["a", "b", "b", "c", "d"]), 2);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn ranks_are_one_based() {
        let ranked = finalize(hits(&["x", "y", "z"]), 2);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
    }
}
