//! Document-level analysis pipeline.
//!
//! [`Analyzer`] wires extraction, segmentation, scoring and risk banding
//! into the two entry points `analyze_document` and `analyze_pages`. The
//! analyzer is immutable after construction and safe to share across
//! threads.

mod error;
mod types;


pub use error::PipelineError;
pub use types::{ClauseResult, DocumentReport, DocumentRisk, LabelStats};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::corpus::ReferenceCorpus;
use crate::document::{Page, PageExtractor, PlainTextExtractor};
use crate::embedding::{ClauseEncoder, Reranker};
use crate::risk::{RiskBand, ThresholdTable, apply_label_gates, extract_label_signals};
use crate::scoring::{ClauseScorer, ScoringConfig};
use crate::segment::{
    ClauseChunk, SegmenterConfig, chunk_pages, deduplicate_chunks, normalize_clause_key,
};

/// Fully wired clause-risk analyzer.
pub struct Analyzer {
    scorer: ClauseScorer,
    corpus: ReferenceCorpus,
    thresholds: ThresholdTable,
    segmenter: SegmenterConfig,
    extractor: Box<dyn PageExtractor>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("corpus_len", &self.corpus.len())
            .field("segmenter", &self.segmenter)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Builds an analyzer over a loaded corpus and model pair.
    ///
    /// Fails fast when the encoder and corpus disagree on the embedding
    /// dimension; every later request would fail otherwise.
    pub fn new(
        encoder: Arc<ClauseEncoder>,
        reranker: Arc<Reranker>,
        corpus: ReferenceCorpus,
    ) -> Result<Self, PipelineError> {
        if encoder.embedding_dim() != corpus.embedding_dim() {
            return Err(PipelineError::EmbeddingDimMismatch {
                encoder: encoder.embedding_dim(),
                corpus: corpus.embedding_dim(),
            });
        }

        Ok(Self {
            scorer: ClauseScorer::new(encoder, reranker, ScoringConfig::default()),
            corpus,
            thresholds: ThresholdTable::default(),
            segmenter: SegmenterConfig::default(),
            extractor: Box::new(PlainTextExtractor),
        })
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_scoring(mut self, config: ScoringConfig) -> Self {
        self.scorer = self.scorer.with_config(config);
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn corpus(&self) -> &ReferenceCorpus {
        &self.corpus
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Extracts pages from raw document bytes and analyzes them.
    pub fn analyze_document(&self, bytes: &[u8]) -> Result<DocumentReport, PipelineError> {
        let pages = self.extractor.extract_pages(bytes)?;
        self.analyze_pages(&pages)
    }

    /// Analyzes pre-extracted pages into a document report.
    pub fn analyze_pages(&self, pages: &[Page]) -> Result<DocumentReport, PipelineError> {
        let chunks = deduplicate_chunks(chunk_pages(pages, &self.segmenter));
        info!(
            pages = pages.len(),
            clauses = chunks.len(),
            "Segmented document"
        );

        let flagged = self.analyze_clauses(&chunks)?;
        let merged = merge_clause_results(flagged);
        let report = aggregate(merged, &self.thresholds);
        info!(
            document_risk = %report.document_risk,
            doc_score = report.doc_score,
            flagged = report.clauses.len(),
            "Analyzed document"
        );
        Ok(report)
    }

    /// Scores chunks and keeps those with at least one above-low label.
    fn analyze_clauses(
        &self,
        chunks: &[ClauseChunk],
    ) -> Result<Vec<ClauseResult>, PipelineError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.clause_text.as_str()).collect();
        let scores = self.scorer.score_batch(&self.corpus, &texts)?;

        let weights = self.scorer.config().weights;
        let mut results = Vec::new();
        for (chunk, score) in chunks.iter().zip(scores) {
            let Some(score) = score else {
                debug!(page_no = chunk.page_no, "No candidates retrieved, skipping clause");
                continue;
            };

            let signals = extract_label_signals(&score, &weights, &self.thresholds);
            let mut signals = apply_label_gates(signals, &chunk.clause_text);
            signals.retain(|s| s.band != RiskBand::Low);
            if signals.is_empty() {
                continue;
            }

            // Signals are sorted best first.
            let final_score = signals[0].final_score;
            results.push(ClauseResult {
                clause_text: chunk.clause_text.clone(),
                page_no: chunk.page_no,
                final_score,
                identity: score.identity,
                semantic: score.semantic,
                margin: score.margin,
                labels: signals,
                top_matches: score.top_matches,
            });
        }

        Ok(results)
    }
}

/// Merges near-duplicate flagged clauses (same normalized text).
///
/// The first occurrence is the representative; each label keeps its best
/// signal across the group and the clause score is the best label score.
/// Output is sorted best first.
pub fn merge_clause_results(results: Vec<ClauseResult>) -> Vec<ClauseResult> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, ClauseResult> = BTreeMap::new();

    for result in results {
        let key = normalize_clause_key(&result.clause_text);
        match groups.get_mut(&key) {
            None => {
                order.push(key.clone());
                groups.insert(key, result);
            }
            Some(existing) => {
                for signal in result.labels {
                    match existing.labels.iter_mut().find(|s| s.label == signal.label) {
                        Some(kept) if kept.final_score >= signal.final_score => {}
                        Some(kept) => *kept = signal,
                        None => existing.labels.push(signal),
                    }
                }
            }
        }
    }

    let mut merged: Vec<ClauseResult> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|mut result| {
            result.labels.sort_by(|a, b| {
                b.final_score
                    .partial_cmp(&a.final_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            result.final_score = result.labels[0].final_score;
            result
        })
        .collect();

    merged.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged
}

/// Rolls flagged clauses up into the document report.
pub fn aggregate(clauses: Vec<ClauseResult>, thresholds: &ThresholdTable) -> DocumentReport {
    let mut label_summary: BTreeMap<String, LabelStats> = BTreeMap::new();

    for clause in &clauses {
        for signal in &clause.labels {
            let stats = label_summary.entry(signal.label.clone()).or_default();
            stats.total_clauses += 1;
            stats.max_score = stats.max_score.max(signal.final_score);
            if signal.final_score >= thresholds.high(&signal.label) {
                stats.high_risk_clauses += 1;
            }
        }
    }

    let doc_score = if clauses.is_empty() {
        0
    } else {
        let mean =
            clauses.iter().map(|c| c.final_score).sum::<f32>() / clauses.len() as f32;
        (mean * 10.0).round() as u32
    };

    let document_risk = if label_summary.values().any(|s| s.high_risk_clauses > 0) {
        DocumentRisk::HighRisk
    } else {
        DocumentRisk::LowRisk
    };

    DocumentReport {
        document_risk,
        doc_score,
        label_summary,
        clauses,
    }
}
