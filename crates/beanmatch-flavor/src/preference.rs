use std::sync::Arc;
use tracing::debug;

use beanmatch_core::error::Result;
use beanmatch_core::flavor::{QueryEmbeddingPair, SliderPreferences, AXES};
use beanmatch_core::vector::{add_scaled, normalize};

use crate::provider::EmbeddingProvider;

/// Turns slider positions into attraction and aversion query embeddings.
pub struct QueryPreferenceBuilder {
    provider: Arc<EmbeddingProvider>,
}

impl QueryPreferenceBuilder {
    pub fn new(provider: Arc<EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// A positive weight adds `right * w` to the positive side, a negative
    /// weight adds `left * |w|` to the negative side. Each side is normalized
    /// only if something contributed to it, so an untouched side stays zero.
    /// Labels outside the five axes are ignored.
    pub fn build_query_embedding(&self, preferences: &SliderPreferences) -> Result<QueryEmbeddingPair> {
        preferences.validate()?;
        let dim = self.provider.dim();
        let mut positive = vec![0f32; dim];
        let mut negative = vec![0f32; dim];
        let (mut pos_axes, mut neg_axes) = (0usize, 0usize);

        for axis in &AXES {
            let weight = preferences.weight(axis);
            if weight > 0.0 {
                add_scaled(&mut positive, self.provider.term_embedding(axis.right), weight);
                pos_axes += 1;
            } else if weight < 0.0 {
                add_scaled(&mut negative, self.provider.term_embedding(axis.left), weight.abs());
                neg_axes += 1;
            }
        }
        if pos_axes > 0 {
            normalize(&mut positive);
        }
        if neg_axes > 0 {
            normalize(&mut negative);
        }
        debug!(pos_axes, neg_axes, "built preference query");
        Ok(QueryEmbeddingPair { positive, negative })
    }
}
