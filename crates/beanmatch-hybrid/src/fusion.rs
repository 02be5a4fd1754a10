use std::collections::HashMap;

use beanmatch_core::config::RetrievalSettings;
use beanmatch_core::error::{Error, Result};
use beanmatch_core::types::{SearchHit, SourceKind};

/// Weights of the semantic and lexical lists and the smoothing constant `c`
/// of `weight / (rank + c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub semantic: f32,
    pub lexical: f32,
    pub rrf_k: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { semantic: 0.7, lexical: 0.3, rrf_k: 60.0 }
    }
}

impl FusionWeights {
    pub fn new(semantic: f32, lexical: f32, rrf_k: f32) -> Result<Self> {
        if !(semantic >= 0.0 && lexical >= 0.0) || semantic + lexical <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fusion weights must be non-negative and not both zero, got {semantic}/{lexical}"
            )));
        }
        if !(rrf_k >= 0.0) {
            return Err(Error::InvalidConfig(format!("rrf_k must be non-negative, got {rrf_k}")));
        }
        Ok(Self { semantic, lexical, rrf_k })
    }
}

impl TryFrom<&RetrievalSettings> for FusionWeights {
    type Error = Error;

    fn try_from(s: &RetrievalSettings) -> Result<Self> {
        Self::new(s.semantic_weight, s.lexical_weight, s.rrf_k)
    }
}

/// Weighted reciprocal rank fusion.
///
/// Every list contributes `weight / (rank + rrf_k)` (rank is 1-based) to each
/// document it contains; documents are keyed by their text, so the same
/// passage reached by both retrievers accumulates both contributions. The
/// first occurrence of a key is the one returned. Ties keep first-seen order.
pub fn fuse(lists: &[(&[SearchHit], f32)], rrf_k: f32) -> Vec<SearchHit> {
    let mut order: Vec<SearchHit> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut scores: Vec<f32> = Vec::new();

    for (hits, weight) in lists {
        for (i, hit) in hits.iter().enumerate() {
            let contribution = weight / ((i + 1) as f32 + rrf_k);
            match slot.get(&hit.document.text) {
                Some(&idx) => scores[idx] += contribution,
                None => {
                    slot.insert(hit.document.text.clone(), order.len());
                    order.push(hit.clone());
                    scores.push(contribution);
                }
            }
        }
    }

    let mut fused: Vec<SearchHit> = order
        .into_iter()
        .zip(scores)
        .map(|(hit, score)| SearchHit::new(hit.document, score, SourceKind::Hybrid))
        .collect();
    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused
}
