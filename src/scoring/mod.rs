//! Clause scoring: identity, retrieval, reranking, calibration and fusion.
//!
//! The scorer is the only component that touches all three signals. A
//! clause with an empty candidate set scores as `None` and is skipped by
//! the pipeline; it never aborts the batch.

mod error;
mod types;


pub use error::ScoringError;
pub use types::{ClauseScore, ReferenceMatch};

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::constants::{DEFAULT_TOP_K_RERANK, FusionWeights};
use crate::corpus::ReferenceCorpus;
use crate::embedding::{ClauseEncoder, Reranker};
use crate::retrieval::Retriever;

/// Logistic calibration from a raw cross-encoder logit to [0, 1].
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Margin between the two best calibrated scores (descending input not
/// required). Zero with fewer than two scores.
pub fn compute_margin(scores: &[f32]) -> f32 {
    if scores.len() < 2 {
        return 0.0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    sorted[0] - sorted[1]
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Candidates kept per clause after reranking.
    pub top_k_rerank: usize,
    pub weights: FusionWeights,
    pub retriever: Retriever,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k_rerank: DEFAULT_TOP_K_RERANK,
            weights: FusionWeights::default(),
            retriever: Retriever::default(),
        }
    }
}

/// Scores clauses against a reference corpus.
pub struct ClauseScorer {
    encoder: Arc<ClauseEncoder>,
    reranker: Arc<Reranker>,
    config: ScoringConfig,
}

impl std::fmt::Debug for ClauseScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClauseScorer")
            .field("encoder", &self.encoder)
            .field("reranker", &self.reranker)
            .field("top_k_rerank", &self.config.top_k_rerank)
            .finish()
    }
}

impl ClauseScorer {
    pub fn new(
        encoder: Arc<ClauseEncoder>,
        reranker: Arc<Reranker>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            encoder,
            reranker,
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// Scores a single clause. `None` means no candidates were retrieved.
    pub fn score_clause(
        &self,
        corpus: &ReferenceCorpus,
        text: &str,
    ) -> Result<Option<ClauseScore>, ScoringError> {
        Ok(self.score_batch(corpus, &[text])?.pop().flatten())
    }

    /// Scores a batch of clauses. Output is positionally aligned with the
    /// input; a clause whose candidate set comes back empty yields `None`.
    pub fn score_batch(
        &self,
        corpus: &ReferenceCorpus,
        texts: &[&str],
    ) -> Result<Vec<Option<ClauseScore>>, ScoringError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(clauses = texts.len(), "Scoring clause batch");

        let duals = self.encoder.embed_dual_batch(texts)?;

        let identities: Vec<f32> = duals
            .iter()
            .map(|dual| corpus.max_primary_similarity(&dual.primary))
            .collect::<Result<_, _>>()
            .map_err(crate::retrieval::RetrievalError::from)?;

        let mut candidates_per_clause: Vec<Vec<usize>> = Vec::with_capacity(texts.len());
        for (text, dual) in texts.iter().zip(&duals) {
            let candidates =
                self.config
                    .retriever
                    .candidates(&self.encoder, corpus, text, dual)?;
            candidates_per_clause.push(candidates);
        }

        // Flatten every (clause, candidate) pair into one reranker batch,
        // then scatter calibrated scores back per clause.
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let mut pair_origin: Vec<(usize, usize)> = Vec::new();
        for (qi, candidates) in candidates_per_clause.iter().enumerate() {
            for &idx in candidates {
                if let Some(record) = corpus.record(idx) {
                    pairs.push((texts[qi], record.answer_text.as_str()));
                    pair_origin.push((qi, idx));
                }
            }
        }

        if pairs.is_empty() {
            return Ok(vec![None; texts.len()]);
        }

        let logits = self.reranker.score_pairs(&pairs)?;

        let mut scored_per_clause: Vec<Vec<(usize, f32)>> = vec![Vec::new(); texts.len()];
        for (&(qi, idx), &logit) in pair_origin.iter().zip(&logits) {
            scored_per_clause[qi].push((idx, sigmoid(logit)));
        }

        let outputs = scored_per_clause
            .into_iter()
            .enumerate()
            .map(|(qi, mut scored)| {
                if scored.is_empty() {
                    return None;
                }

                scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
                scored.truncate(self.config.top_k_rerank);

                let top_matches: Vec<ReferenceMatch> = scored
                    .iter()
                    .filter_map(|&(idx, score)| {
                        corpus.record(idx).map(|record| ReferenceMatch {
                            index_id: idx,
                            score,
                            label: record.label.clone(),
                            answer_text: record.answer_text.clone(),
                            source_title: record.source_title.clone(),
                        })
                    })
                    .collect();

                let scores: Vec<f32> = top_matches.iter().map(|m| m.score).collect();
                let semantic = scores.iter().copied().fold(0.0f32, f32::max);
                let margin = compute_margin(&scores);
                let identity = identities[qi];
                let final_score = self.config.weights.fuse(identity, semantic, margin);

                Some(ClauseScore {
                    final_score,
                    identity,
                    semantic,
                    margin,
                    top_matches,
                })
            })
            .collect();

        Ok(outputs)
    }
}
