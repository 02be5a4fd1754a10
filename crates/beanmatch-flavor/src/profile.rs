use std::sync::Arc;

use beanmatch_core::config::FlavorSettings;
use beanmatch_core::error::Result;
use beanmatch_core::flavor::FlavorVector;

use crate::contrast::ContrastEnhancer;
use crate::estimator::FlavorVectorEstimator;
use crate::provider::EmbeddingProvider;

/// Reported flavor profile: estimated scores with axis contrast applied once.
pub struct FlavorProfiler {
    estimator: FlavorVectorEstimator,
    contrast_factor: f32,
}

impl FlavorProfiler {
    pub fn new(provider: Arc<EmbeddingProvider>, settings: &FlavorSettings) -> Self {
        Self { estimator: FlavorVectorEstimator::new(provider, settings), contrast_factor: settings.contrast_factor }
    }

    pub fn profile(&self, text: &str) -> Result<FlavorVector> {
        let raw = self.estimator.score_text(text)?;
        Ok(ContrastEnhancer::enhance(&raw, self.contrast_factor))
    }

    /// One embedding call for all `texts`.
    pub fn profile_batch(&self, texts: &[String]) -> Result<Vec<FlavorVector>> {
        let raw = self.estimator.score_batch(texts)?;
        Ok(raw.iter().map(|v| ContrastEnhancer::enhance(v, self.contrast_factor)).collect())
    }
}
