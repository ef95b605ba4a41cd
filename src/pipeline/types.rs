use std::collections::BTreeMap;

use serde::Serialize;

use crate::risk::LabelSignal;
use crate::scoring::ReferenceMatch;

/// One flagged clause in the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseResult {
    pub clause_text: String,
    /// 1-based page of the first occurrence.
    pub page_no: u32,
    /// Best final score across the clause's surviving labels.
    pub final_score: f32,
    /// Max similarity to any reference primary embedding, in [0, 1].
    pub identity: f32,
    /// Best calibrated cross-encoder score, in [0, 1].
    pub semantic: f32,
    /// Gap between the two best calibrated scores.
    pub margin: f32,
    /// Surviving label signals, best first. Never empty.
    pub labels: Vec<LabelSignal>,
    pub top_matches: Vec<ReferenceMatch>,
}

/// Per-label rollup over all flagged clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelStats {
    /// Best final score seen for this label.
    pub max_score: f32,
    /// Clauses whose final score reached the label's high threshold.
    pub high_risk_clauses: usize,
    /// Clauses carrying this label at all.
    pub total_clauses: usize,
}

/// Document-level verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRisk {
    LowRisk,
    HighRisk,
}

impl std::fmt::Display for DocumentRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRisk::LowRisk => write!(f, "low_risk"),
            DocumentRisk::HighRisk => write!(f, "high_risk"),
        }
    }
}

/// Full analysis output for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub document_risk: DocumentRisk,
    /// `round(mean(final_score) * 10)` over flagged clauses, 0 when none.
    pub doc_score: u32,
    pub label_summary: BTreeMap<String, LabelStats>,
    /// Flagged clauses, best first.
    pub clauses: Vec<ClauseResult>,
}
