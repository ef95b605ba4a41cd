//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `LEXRISK_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_MIN_CLAUSE_LEN, DEFAULT_TOP_K_RERANK, DEFAULT_TOP_K_RETRIEVAL,
};
use crate::corpus::CorpusPaths;
use crate::embedding::{EncoderConfig, RerankerConfig};
use crate::scoring::ScoringConfig;
use crate::segment::SegmenterConfig;

/// Metadata file expected inside the corpus directory.
pub const CORPUS_METADATA_FILE: &str = "metadata.jsonl";
/// Primary embedding matrix file (raw little-endian f32).
pub const CORPUS_PRIMARY_FILE: &str = "primary_embeddings.f32";
/// Concatenated primary+context matrix file used by retrieval.
pub const CORPUS_INDEX_FILE: &str = "index_embeddings.f32";

/// Analyzer configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LEXRISK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the reference corpus artifacts. Default: `./corpus`.
    pub corpus_dir: PathBuf,

    /// Path to the sentence-encoder model directory. `None` selects the
    /// deterministic stub backend.
    pub encoder_path: Option<PathBuf>,

    /// Path to the cross-encoder model directory. `None` selects the
    /// deterministic stub backend.
    pub reranker_path: Option<PathBuf>,

    /// Primary embedding dimension. Default: `1024`.
    pub embedding_dim: usize,

    /// Nearest-neighbor candidates fetched per probe. Default: `25`.
    pub top_k_retrieve: usize,

    /// Candidates kept per clause after reranking. Default: `10`.
    pub top_k_rerank: usize,

    /// Shortest text accepted as a clause, in characters. Default: `40`.
    pub min_clause_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("./corpus"),
            encoder_path: None,
            reranker_path: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            top_k_retrieve: DEFAULT_TOP_K_RETRIEVAL,
            top_k_rerank: DEFAULT_TOP_K_RERANK,
            min_clause_len: DEFAULT_MIN_CLAUSE_LEN,
        }
    }
}

impl Config {
    const ENV_CORPUS_DIR: &'static str = "LEXRISK_CORPUS_DIR";
    const ENV_EMBEDDING_DIM: &'static str = "LEXRISK_EMBEDDING_DIM";
    const ENV_TOP_K_RETRIEVE: &'static str = "LEXRISK_TOP_K_RETRIEVE";
    const ENV_TOP_K_RERANK: &'static str = "LEXRISK_TOP_K_RERANK";
    const ENV_MIN_CLAUSE_LEN: &'static str = "LEXRISK_MIN_CLAUSE_LEN";

    /// Loads configuration from environment variables (falling back to
    /// defaults). Model paths reuse the encoder/reranker env vars.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            corpus_dir: Self::parse_path_from_env(Self::ENV_CORPUS_DIR, defaults.corpus_dir),
            encoder_path: Self::parse_optional_path_from_env(EncoderConfig::ENV_MODEL_PATH),
            reranker_path: Self::parse_optional_path_from_env(RerankerConfig::ENV_MODEL_PATH),
            embedding_dim: Self::parse_usize_from_env(
                Self::ENV_EMBEDDING_DIM,
                defaults.embedding_dim,
            ),
            top_k_retrieve: Self::parse_usize_from_env(
                Self::ENV_TOP_K_RETRIEVE,
                defaults.top_k_retrieve,
            ),
            top_k_rerank: Self::parse_usize_from_env(
                Self::ENV_TOP_K_RERANK,
                defaults.top_k_rerank,
            ),
            min_clause_len: Self::parse_usize_from_env(
                Self::ENV_MIN_CLAUSE_LEN,
                defaults.min_clause_len,
            ),
        }
    }

    /// Validates paths and basic invariants (does not touch the corpus
    /// contents; loading enforces those).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.corpus_dir.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.corpus_dir.clone(),
            });
        }
        if !self.corpus_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.corpus_dir.clone(),
            });
        }

        let paths = self.corpus_paths();
        for file in [
            &paths.metadata,
            &paths.primary_embeddings,
            &paths.index_embeddings,
        ] {
            if !file.exists() {
                return Err(ConfigError::PathNotFound { path: file.clone() });
            }
            if !file.is_file() {
                return Err(ConfigError::NotAFile { path: file.clone() });
            }
        }

        for dir in [&self.encoder_path, &self.reranker_path].into_iter().flatten() {
            if !dir.exists() {
                return Err(ConfigError::PathNotFound { path: dir.clone() });
            }
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: "embedding_dim",
                reason: "must be positive".to_string(),
            });
        }
        if self.top_k_retrieve == 0 {
            return Err(ConfigError::InvalidValue {
                name: "top_k_retrieve",
                reason: "must be positive".to_string(),
            });
        }
        if self.top_k_rerank == 0 {
            return Err(ConfigError::InvalidValue {
                name: "top_k_rerank",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Corpus artifact locations inside [`Config::corpus_dir`].
    pub fn corpus_paths(&self) -> CorpusPaths {
        CorpusPaths {
            metadata: self.corpus_dir.join(CORPUS_METADATA_FILE),
            primary_embeddings: self.corpus_dir.join(CORPUS_PRIMARY_FILE),
            index_embeddings: self.corpus_dir.join(CORPUS_INDEX_FILE),
        }
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        let config = match self.encoder_path {
            Some(ref path) => EncoderConfig::new(path.clone()),
            None => EncoderConfig::stub(),
        };
        config.with_embedding_dim(self.embedding_dim)
    }

    pub fn reranker_config(&self) -> RerankerConfig {
        match self.reranker_path {
            Some(ref path) => RerankerConfig::new(path.clone()),
            None => RerankerConfig::stub(),
        }
    }

    pub fn scoring_config(&self) -> ScoringConfig {
        let mut config = ScoringConfig::default();
        config.top_k_rerank = self.top_k_rerank;
        config.retriever.top_k = self.top_k_retrieve;
        config
    }

    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            min_clause_len: self.min_clause_len,
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
