use thiserror::Error;

use crate::types::SourceKind;

/// Failure kinds surfaced by the search core.
///
/// Collaborator failures keep their rendered message; the core never retries
/// them and never turns them into an empty result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Embedding failed: {0}")]
    EmbeddingFailure(String),

    #[error("{retriever:?} retrieval failed: {message}")]
    RetrievalFailure { retriever: SourceKind, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn embedding(err: anyhow::Error) -> Self {
        Self::EmbeddingFailure(format!("{err:#}"))
    }

    pub fn retrieval(retriever: SourceKind, err: anyhow::Error) -> Self {
        Self::RetrievalFailure { retriever, message: format!("{err:#}") }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
