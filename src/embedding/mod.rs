//! Embedding and model utilities.
//!
//! - [`encoder`] produces the dual clause embeddings used for identity and
//!   retrieval.
//! - [`reranker`] provides cross-encoder pair scoring used by
//!   [`crate::scoring`].

/// Candle BERT wrappers (sentence encoder + cross-encoder).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Dual-vector clause encoder.
pub mod encoder;
mod error;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{ClauseEncoder, DualEmbedding, EncoderConfig};
pub use error::EmbeddingError;
pub use reranker::{Reranker, RerankerConfig, RerankerError};
