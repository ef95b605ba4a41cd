use thiserror::Error;

use crate::embedding::{EmbeddingError, RerankerError};
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reranker error: {0}")]
    Reranker(#[from] RerankerError),

    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}
