//! Dual-vector clause encoder.
//!
//! Every clause gets two L2-normalized embeddings: the raw text (primary)
//! and the text prefixed with [`CONTEXT_PREFIX`] (secondary). The primary
//! vector alone drives identity scoring; their concatenation is the
//! retrieval query. Use [`EncoderConfig::stub`] for tests without model
//! files.

pub mod config;

#[cfg(test)]
mod tests;

pub use config::EncoderConfig;

use candle_core::{Device, IndexOp, Tensor};
use tracing::{debug, info, warn};

use crate::constants::CONTEXT_PREFIX;
use crate::embedding::bert::BertSentenceEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_tokenizer_with_truncation;

/// The two embeddings computed per clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DualEmbedding {
    /// Embedding of the raw clause text.
    pub primary: Vec<f32>,
    /// Embedding of the context-prefixed clause text.
    pub context: Vec<f32>,
}

impl DualEmbedding {
    /// Concatenated `primary ++ context` retrieval query vector.
    pub fn query_vector(&self) -> Vec<f32> {
        let mut query = Vec::with_capacity(self.primary.len() + self.context.len());
        query.extend_from_slice(&self.primary);
        query.extend_from_slice(&self.context);
        query
    }
}

enum EncoderBackend {
    Model {
        model: BertSentenceEncoder,
        tokenizer: tokenizers::Tokenizer,
        device: Device,
    },
    Stub,
}

/// Clause embedding generator (supports stub mode).
pub struct ClauseEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for ClauseEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClauseEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl ClauseEncoder {
    /// Loads the encoder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Clause encoder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for clause encoder");

        let model = BertSentenceEncoder::load(&config.model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("failed to load encoder model: {}", e),
            }
        })?;

        if config.embedding_dim > model.hidden_size() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) exceeds model hidden_size ({})",
                    config.embedding_dim,
                    model.hidden_size()
                ),
            });
        }

        let tokenizer = load_tokenizer_with_truncation(&config.model_path, config.max_seq_len)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("failed to load tokenizer: {}", e),
            })?;

        info!(
            model_path = %config.model_path.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Clause encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    /// Creates a stub encoder.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    /// Embeds a single text (L2-normalized).
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_with_model(text, model, tokenizer, device),
            EncoderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Embeds a batch of texts.
    ///
    /// The batch path runs each item through the same code as [`embed`], so
    /// single and batched calls are numerically identical.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Computes the dual (primary + context) embedding for one clause.
    pub fn embed_dual(&self, text: &str) -> Result<DualEmbedding, EmbeddingError> {
        let primary = self.embed(text)?;
        let context = self.embed(&format!("{}{}", CONTEXT_PREFIX, text))?;
        Ok(DualEmbedding { primary, context })
    }

    /// Computes dual embeddings for a batch of clauses.
    pub fn embed_dual_batch(&self, texts: &[&str]) -> Result<Vec<DualEmbedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed_dual(text)).collect()
    }

    fn embed_with_model(
        &self,
        text: &str,
        model: &BertSentenceEncoder,
        tokenizer: &tokenizers::Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding clause"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = model
            .forward_pooled(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let embedding = pooled
            .i((0, ..self.config.embedding_dim))?
            .to_vec1::<f32>()?;

        Ok(l2_normalize(embedding))
    }

    /// Deterministic text-seeded embedding for tests: identical text always
    /// yields an identical unit vector.
    fn embed_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        let mut embedding = Vec::with_capacity(self.config.embedding_dim);
        for _ in 0..self.config.embedding_dim {
            // xorshift64* keeps the stream well mixed per component.
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            let sample = state.wrapping_mul(0x2545_f491_4f6c_dd1d);
            embedding.push(((sample >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0);
        }

        l2_normalize(embedding)
    }

    /// Output dimension of a single vector.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Dimension of the concatenated retrieval query vector.
    pub fn query_dim(&self) -> usize {
        self.config.embedding_dim * 2
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

fn l2_normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}
