//! Cross-encoder reranker.
//!
//! Scores (query clause, candidate reference text) pairs with a pairwise
//! relevance model and returns raw logits; the scoring layer applies the
//! sigmoid calibration so the stub and model backends are treated the same
//! way. With no model path configured the reranker runs in stub mode and
//! scores lexical overlap instead.

pub mod config;
pub mod error;


pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::BertCrossEncoder;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer_with_truncation;

pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<BertCrossEncoder>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device().map_err(|e| RerankerError::ModelLoadFailed {
            reason: e.to_string(),
        })?;
        debug!(?device, "Selected compute device for reranker");

        let Some(ref model_path) = config.model_path else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        };

        for required in ["config.json", "model.safetensors"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("missing {} in {}", required, model_path.display()),
                });
            }
        }

        info!(model_path = %model_path.display(), "Loading reranker model");

        let model = BertCrossEncoder::load(model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("failed to load cross-encoder: {}", e),
            }
        })?;

        let tokenizer =
            load_tokenizer_with_truncation(model_path, MAX_SEQ_LEN).map_err(|e| {
                RerankerError::ModelLoadFailed {
                    reason: format!("failed to load tokenizer: {}", e),
                }
            })?;

        info!("Reranker model loaded");

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Scores one (query, candidate) pair, returning a raw relevance logit.
    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        if let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) {
            let tokens = tokenizer.encode((query, candidate), true).map_err(|e| {
                RerankerError::TokenizationFailed {
                    reason: e.to_string(),
                }
            })?;

            let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
            let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
            // The tokenizer's attention mask matters once padding is
            // present; ones_like would mis-score padded pairs.
            let attention_mask =
                Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

            let logits = model
                .forward(&token_ids, &type_ids, Some(&attention_mask))
                .map_err(|e| RerankerError::InferenceFailed {
                    reason: e.to_string(),
                })?;

            let score = logits.flatten_all()?.to_vec1::<f32>()?[0];
            return Ok(score);
        }

        Ok(self.stub_logit(query, candidate))
    }

    /// Scores a batch of pairs in input order, one raw logit per pair.
    pub fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        debug!(num_pairs = pairs.len(), "Scoring reranker pairs");
        pairs
            .iter()
            .map(|(query, candidate)| self.score(query, candidate))
            .collect()
    }

    /// Stub relevance: content-word recall blended with Jaccard overlap,
    /// mapped onto a logit scale so the downstream sigmoid lands in [0, 1].
    fn stub_logit(&self, query: &str, candidate: &str) -> f32 {
        let query_words = content_words(query);
        let candidate_words = content_words(candidate);

        if query_words.is_empty() || candidate_words.is_empty() {
            return -4.0;
        }

        let matches = query_words.intersection(&candidate_words).count() as f32;
        let recall = matches / query_words.len() as f32;
        let union = query_words.union(&candidate_words).count() as f32;
        let jaccard = matches / union;

        let overlap = 0.6 * recall + 0.4 * jaccard;

        // Map [0, 1] overlap to roughly [-4, 4].
        8.0 * (overlap - 0.5)
    }
}

fn content_words(text: &str) -> std::collections::HashSet<String> {
    const STOP_WORDS: [&str; 32] = [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "of", "in", "for", "on",
        "with", "at", "by", "from", "as", "to", "and", "but", "if", "or", "this", "that",
        "these", "those", "it", "its", "any", "all", "such",
    ];

    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}
