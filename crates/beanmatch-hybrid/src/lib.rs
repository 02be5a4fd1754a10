//! beanmatch-hybrid
//!
//! Merges the vector and lexical retrievers with weighted rank fusion and runs
//! the end-to-end search pipeline on top of the fused candidates.

pub mod fusion;
pub mod orchestrator;
pub mod retriever;

pub use fusion::{fuse, FusionWeights};
pub use orchestrator::SearchOrchestrator;
pub use retriever::HybridRetriever;
