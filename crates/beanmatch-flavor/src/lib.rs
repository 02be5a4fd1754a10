//! beanmatch-flavor
//!
//! Flavor-aware scoring built on a shared [`EmbeddingProvider`]: per-term
//! flavor profiles, axis contrast and the reported profile combining the
//! two, slider query embeddings, negative-term exclusion.

pub mod contrast;
pub mod estimator;
pub mod exclusion;
pub mod preference;
pub mod profile;
pub mod provider;

pub use contrast::ContrastEnhancer;
pub use estimator::FlavorVectorEstimator;
pub use exclusion::ExclusionFilter;
pub use preference::QueryPreferenceBuilder;
pub use profile::FlavorProfiler;
pub use provider::EmbeddingProvider;
