use serde::Serialize;

/// A reference clause matched during retrieval, with its calibrated
/// cross-encoder score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMatch {
    /// Row in the reference corpus.
    pub index_id: usize,
    /// Calibrated (sigmoid) relevance score in [0, 1].
    pub score: f32,
    /// Canonical label of the reference clause.
    pub label: String,
    pub answer_text: String,
    pub source_title: Option<String>,
}

/// Raw scoring output for one clause, before label extraction and banding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseScore {
    /// Weighted fusion of identity, semantic and margin.
    pub final_score: f32,
    /// Max similarity to any reference primary embedding, in [0, 1].
    pub identity: f32,
    /// Best calibrated cross-encoder score, in [0, 1].
    pub semantic: f32,
    /// Gap between the two best calibrated scores; 0 with fewer than two
    /// candidates.
    pub margin: f32,
    /// Top scored matches, best first, capped at the rerank depth.
    pub top_matches: Vec<ReferenceMatch>,
}
