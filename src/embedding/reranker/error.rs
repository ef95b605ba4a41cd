use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("invalid reranker configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to load reranker model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("reranker inference failed: {reason}")]
    InferenceFailed { reason: String },
}

impl From<candle_core::Error> for RerankerError {
    fn from(err: candle_core::Error) -> Self {
        RerankerError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
