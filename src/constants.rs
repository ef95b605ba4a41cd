//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary values from these rather than repeating
//! literals in module code. The fusion weights and the identity override
//! threshold are contract values, not tuning knobs.

/// Number of index candidates retrieved per query.
pub const DEFAULT_TOP_K_RETRIEVAL: usize = 25;

/// Number of reranked candidates retained as top matches.
pub const DEFAULT_TOP_K_RERANK: usize = 10;

/// Minimum clause length in characters; shorter fragments are packed or
/// discarded by the segmenter.
pub const DEFAULT_MIN_CLAUSE_LEN: usize = 40;

/// Sub-window size (characters) for probing long clauses at retrieval time.
pub const DEFAULT_PROBE_WINDOW: usize = 240;

/// Stride (characters) between overlapping probe windows.
pub const DEFAULT_PROBE_STRIDE: usize = 120;

/// Identity score at or above which every emitted label signal is banded
/// high regardless of per-label thresholds (near-verbatim match).
pub const IDENTITY_OVERRIDE_THRESHOLD: f32 = 0.98;

/// Marker prepended to clause text for the secondary ("context") embedding.
pub const CONTEXT_PREFIX: &str = "CONTEXT:\n";

/// Default embedding dimension (primary vector). The retrieval query is the
/// concatenation of primary + context vectors, so the index dimension is
/// twice this.
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

/// Default max tokens for both the encoder and the cross-encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

pub const DEFAULT_IDENTITY_WEIGHT: f32 = 0.5;
pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.4;
pub const DEFAULT_MARGIN_WEIGHT: f32 = 0.1;

/// Weights for fusing identity, semantic and margin signals into a final
/// score. The defaults implement `0.5·identity + 0.4·semantic + 0.1·margin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub identity: f32,
    pub semantic: f32,
    pub margin: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            identity: DEFAULT_IDENTITY_WEIGHT,
            semantic: DEFAULT_SEMANTIC_WEIGHT,
            margin: DEFAULT_MARGIN_WEIGHT,
        }
    }
}

impl FusionWeights {
    /// Applies the weighted fusion to the three signals.
    #[inline]
    pub fn fuse(&self, identity: f32, semantic: f32, margin: f32) -> f32 {
        self.identity * identity + self.semantic * semantic + self.margin * margin
    }

    /// Validates that each weight is a non-negative finite number and that
    /// at least one is positive.
    pub fn validate(&self) -> Result<(), FusionWeightsError> {
        for (name, w) in [
            ("identity", self.identity),
            ("semantic", self.semantic),
            ("margin", self.margin),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(FusionWeightsError::InvalidWeight { name, value: w });
            }
        }
        if self.identity + self.semantic + self.margin <= 0.0 {
            return Err(FusionWeightsError::AllZero);
        }
        Ok(())
    }
}

/// Error returned when fusion weights fail validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FusionWeightsError {
    InvalidWeight { name: &'static str, value: f32 },
    AllZero,
}

impl std::fmt::Display for FusionWeightsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWeight { name, value } => write!(
                f,
                "fusion weight '{}' must be a non-negative finite number, got {}",
                name, value
            ),
            Self::AllZero => write!(f, "at least one fusion weight must be positive"),
        }
    }
}

impl std::error::Error for FusionWeightsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_contract() {
        let w = FusionWeights::default();
        assert_eq!(w.identity, 0.5);
        assert_eq!(w.semantic, 0.4);
        assert_eq!(w.margin, 0.1);
    }

    #[test]
    fn fuse_is_the_weighted_sum() {
        let w = FusionWeights::default();
        let fused = w.fuse(0.9, 0.8, 0.1);
        assert!((fused - (0.5 * 0.9 + 0.4 * 0.8 + 0.1 * 0.1)).abs() < 1e-6);
    }

    #[test]
    fn negative_weight_rejected() {
        let w = FusionWeights {
            identity: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            w.validate(),
            Err(FusionWeightsError::InvalidWeight {
                name: "identity",
                ..
            })
        ));
    }

    #[test]
    fn all_zero_rejected() {
        let w = FusionWeights {
            identity: 0.0,
            semantic: 0.0,
            margin: 0.0,
        };
        assert_eq!(w.validate(), Err(FusionWeightsError::AllZero));
    }

    #[test]
    fn default_weights_validate() {
        assert!(FusionWeights::default().validate().is_ok());
    }
}
