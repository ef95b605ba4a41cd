//! Lexrisk: contract clause risk classification.
//!
//! Splits contract documents into candidate clauses, retrieves the nearest
//! labeled reference clauses with dual-vector embeddings, rescores the
//! candidates with a cross-encoder, and bands every label signal into
//! low / review / high risk with a document-level rollup.
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`Analyzer`], [`DocumentReport`] - Document analysis entry points
//! - [`Page`], [`PageExtractor`], [`PlainTextExtractor`] - Page extraction
//!   boundary (PDF/OCR implementations live outside this crate)
//! - [`ReferenceCorpus`], [`CorpusPaths`] - Labeled reference corpus
//! - [`ClauseEncoder`], [`Reranker`] - Embedding and cross-encoder models
//!   (deterministic stub backends when no model path is configured)
//! - [`ClauseScorer`], [`ClauseScore`] - Per-clause scoring
//! - [`RiskBand`], [`ThresholdTable`], [`LabelSignal`] - Risk banding
//! - [`chunk_pages`], [`deduplicate_chunks`] - Clause segmentation
//!
//! Many tuning constants are exported from [`constants`] for consistency
//! across modules; prefer [`Config`] for runtime configuration.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod pipeline;
pub mod retrieval;
pub mod risk;
pub mod scoring;
pub mod segment;

pub use config::{Config, ConfigError};
pub use constants::FusionWeights;
pub use corpus::{CorpusError, CorpusPaths, ReferenceCorpus, ReferenceRecord};
pub use document::{ExtractionError, Page, PageExtractor, PlainTextExtractor};
pub use embedding::{
    ClauseEncoder, DualEmbedding, EmbeddingError, EncoderConfig, Reranker, RerankerConfig,
    RerankerError,
};
pub use pipeline::{
    Analyzer, ClauseResult, DocumentReport, DocumentRisk, LabelStats, PipelineError,
};
pub use retrieval::{ProbeConfig, Retriever};
pub use risk::{LabelSignal, RiskBand, ThresholdTable, normalize_label};
pub use scoring::{ClauseScore, ClauseScorer, ReferenceMatch, ScoringConfig, ScoringError};
pub use segment::{ClauseChunk, SegmenterConfig, chunk_pages, deduplicate_chunks};
