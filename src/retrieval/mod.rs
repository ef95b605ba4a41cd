//! Candidate retrieval with sub-clause probing.
//!
//! A single fixed-size query embedding under-represents long clauses, so
//! clauses longer than the probe window are additionally queried through
//! overlapping sub-windows and the candidate sets are unioned.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::constants::{DEFAULT_PROBE_STRIDE, DEFAULT_PROBE_WINDOW, DEFAULT_TOP_K_RETRIEVAL};
use crate::corpus::{DimensionMismatch, ReferenceCorpus};
use crate::embedding::{ClauseEncoder, DualEmbedding, EmbeddingError};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
}

/// Probe geometry for long clauses.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// Clauses longer than this (in characters) are windowed.
    pub window: usize,
    /// Offset between consecutive windows.
    pub stride: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_PROBE_WINDOW,
            stride: DEFAULT_PROBE_STRIDE,
        }
    }
}

/// Splits a clause into overlapping character windows covering the full
/// text. Text at or under the window size yields just the trimmed text.
pub fn subwindows<'a>(text: &'a str, config: &ProbeConfig) -> Vec<&'a str> {
    let text = text.trim();
    let char_offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = char_offsets.len() - 1;

    if char_len <= config.window || config.stride == 0 {
        return vec![text];
    }

    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        if start + config.window >= char_len {
            // Final window is anchored to the end so the tail is covered.
            windows.push(&text[char_offsets[char_len - config.window]..]);
            break;
        }
        windows.push(&text[char_offsets[start]..char_offsets[start + config.window]]);
        start += config.stride;
    }

    windows
}

/// Retrieves candidate reference rows for clauses.
#[derive(Debug, Clone, Copy)]
pub struct Retriever {
    pub top_k: usize,
    pub probe: ProbeConfig,
}

impl Default for Retriever {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K_RETRIEVAL,
            probe: ProbeConfig::default(),
        }
    }
}

impl Retriever {
    /// Collects the candidate set for one clause: the full-text query plus,
    /// for long clauses, one query per sub-window. Results are the union of
    /// all returned indices, in ascending order.
    pub fn candidates(
        &self,
        encoder: &ClauseEncoder,
        corpus: &ReferenceCorpus,
        clause_text: &str,
        full_query: &DualEmbedding,
    ) -> Result<Vec<usize>, RetrievalError> {
        let mut union: BTreeSet<usize> = BTreeSet::new();

        for hit in corpus.search(&full_query.query_vector(), self.top_k)? {
            union.insert(hit.index);
        }

        let windows = subwindows(clause_text, &self.probe);
        if windows.len() > 1 {
            debug!(
                clause_len = clause_text.len(),
                probes = windows.len(),
                "Probing long clause with sub-windows"
            );
            for window in windows {
                let probe = encoder.embed_dual(window)?;
                for hit in corpus.search(&probe.query_vector(), self.top_k)? {
                    union.insert(hit.index);
                }
            }
        }

        Ok(union.into_iter().collect())
    }
}
