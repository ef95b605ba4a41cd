//! Risk banding and label semantics.
//!
//! Per-label thresholds, the identity override, label-signal extraction
//! from scored matches, and the non-compete semantic gate. The gate term
//! sets are hand-tuned against observed false positives and are contract,
//! not placeholders.


use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::constants::{FusionWeights, IDENTITY_OVERRIDE_THRESHOLD};
use crate::scoring::ClauseScore;

/// Canonical label for clauses restricting economic competition.
pub const NON_COMPETE_LABEL: &str = "non_compete";

/// Canonicalizes a raw label: lowercase, spaces and hyphens become
/// underscores. Applied once at corpus load and once at label extraction;
/// the normalized form is the identifier everywhere else.
pub fn normalize_label(raw: &str) -> String {
    raw.to_lowercase().replace(['-', ' '], "_")
}

/// Risk tier for a single label signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Review,
    High,
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Review => write!(f, "review"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// Per-label `(low, high)` semantic-score thresholds with a default
/// fallback for labels outside the table.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    thresholds: BTreeMap<String, (f32, f32)>,
    default: (f32, f32),
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let mut thresholds = BTreeMap::new();
        thresholds.insert("termination_for_convenience".to_string(), (0.60, 0.75));
        thresholds.insert(NON_COMPETE_LABEL.to_string(), (0.58, 0.72));
        thresholds.insert("uncapped_liability".to_string(), (0.60, 0.70));
        Self {
            thresholds,
            default: (0.60, 0.70),
        }
    }
}

impl ThresholdTable {
    pub fn new(thresholds: BTreeMap<String, (f32, f32)>, default: (f32, f32)) -> Self {
        Self {
            thresholds,
            default,
        }
    }

    /// Overrides or adds one label's threshold pair.
    pub fn with_label(mut self, label: &str, low: f32, high: f32) -> Self {
        self.thresholds.insert(normalize_label(label), (low, high));
        self
    }

    /// Returns the `(low, high)` pair for a canonical label, warning (non
    /// fatally) and falling back to the default for unknown labels.
    pub fn get(&self, label: &str) -> (f32, f32) {
        match self.thresholds.get(label) {
            Some(pair) => *pair,
            None => {
                warn!(label, "Unknown label, using default risk thresholds");
                self.default
            }
        }
    }

    /// High threshold for a canonical label (same fallback rules).
    pub fn high(&self, label: &str) -> f32 {
        self.get(label).1
    }
}

/// Assigns a band for one label signal.
///
/// An identity at or above [`IDENTITY_OVERRIDE_THRESHOLD`] is a
/// near-verbatim match to a known clause and bands high unconditionally;
/// otherwise the clamped semantic score is compared against the label's
/// thresholds.
pub fn assign_band(
    semantic_score: f32,
    identity: f32,
    label: &str,
    table: &ThresholdTable,
) -> RiskBand {
    if identity >= IDENTITY_OVERRIDE_THRESHOLD {
        return RiskBand::High;
    }

    let semantic_score = semantic_score.clamp(0.0, 1.0);
    let (low, high) = table.get(label);

    if semantic_score >= high {
        RiskBand::High
    } else if semantic_score >= low {
        RiskBand::Review
    } else {
        RiskBand::Low
    }
}

/// Per-label risk signal derived from a clause's scored matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSignal {
    pub label: String,
    pub semantic_score: f32,
    pub final_score: f32,
    pub band: RiskBand,
}

/// Converts a clause's top matches into per-label signals.
///
/// Matches are grouped by canonical label taking the max calibrated score
/// per label; each label's final score fuses the clause-level identity and
/// margin with that label's semantic score. Output is sorted by descending
/// final score.
pub fn extract_label_signals(
    score: &ClauseScore,
    weights: &FusionWeights,
    table: &ThresholdTable,
) -> Vec<LabelSignal> {
    let mut label_to_score: BTreeMap<String, f32> = BTreeMap::new();

    for m in &score.top_matches {
        let label = normalize_label(&m.label);
        let entry = label_to_score.entry(label).or_insert(0.0);
        *entry = entry.max(m.score);
    }

    let mut signals: Vec<LabelSignal> = label_to_score
        .into_iter()
        .map(|(label, semantic_score)| {
            let final_score = weights.fuse(score.identity, semantic_score, score.margin);
            let band = assign_band(semantic_score, score.identity, &label, table);
            LabelSignal {
                label,
                semantic_score,
                final_score,
                band,
            }
        })
        .collect();

    signals.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    signals
}

/// Restriction-verb phrases a genuine non-compete must carry.
pub const NON_COMPETE_RESTRICTION_VERBS: [&str; 8] = [
    "will not",
    "shall not",
    "may not",
    "not enter into",
    "agrees not to",
    "cannot",
    "prohibited",
    "restricted",
];

/// Competition-domain terms a genuine non-compete must carry.
pub const NON_COMPETE_COMPETITION_TERMS: [&str; 16] = [
    "competitor",
    "competitors",
    "competing",
    "competitive",
    "products",
    "employment",
    "engage",
    "operate",
    "ownership",
    "interest",
    "promote",
    "promotion",
    "advertising",
    "display",
    "sales",
    "market",
];

/// A non-compete must restrict economic competition, not merely speech or
/// conduct. Requires both a restriction verb and a competition-domain term
/// in the clause text.
pub fn passes_non_compete_gate(clause_text: &str) -> bool {
    let t = clause_text.to_lowercase();
    NON_COMPETE_RESTRICTION_VERBS.iter().any(|v| t.contains(v))
        && NON_COMPETE_COMPETITION_TERMS.iter().any(|c| t.contains(c))
}

/// Drops label signals that fail their label-specific semantic gate.
/// Currently only `non_compete` is gated.
pub fn apply_label_gates(signals: Vec<LabelSignal>, clause_text: &str) -> Vec<LabelSignal> {
    signals
        .into_iter()
        .filter(|signal| {
            signal.label != NON_COMPETE_LABEL || passes_non_compete_gate(clause_text)
        })
        .collect()
}
