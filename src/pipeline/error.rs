use thiserror::Error;

use crate::document::ExtractionError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("encoder embedding dim {encoder} does not match corpus dim {corpus}")]
    EmbeddingDimMismatch { encoder: usize, corpus: usize },
}
