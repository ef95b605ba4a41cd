use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metadata record on line {line} of {path}: {reason}")]
    InvalidMetadata {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("reference corpus is empty")]
    EmptyCorpus,

    #[error("embedding file {path} is not a whole number of f32 values ({len} bytes)")]
    MalformedEmbeddingFile { path: PathBuf, len: usize },

    #[error(
        "embedding matrix shape mismatch: {records} metadata records but {rows} embedding rows"
    )]
    CountMismatch { records: usize, rows: usize },

    #[error("index vectors must be twice the primary dimension: primary {primary}, index {index}")]
    IndexDimensionMismatch { primary: usize, index: usize },

    #[error("embedding data length {len} is not divisible by dimension {dim}")]
    BadMatrixShape { len: usize, dim: usize },
}
