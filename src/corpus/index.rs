//! In-process flat inner-product index.
//!
//! The reference corpus is small enough that an exact scan beats an
//! approximate index; vectors are unit-normalized so inner product equals
//! cosine similarity.

use std::cmp::Ordering;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("query dimension {actual} does not match index dimension {expected}")]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Dense row-major matrix of embeddings.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Builds a matrix from row-major data. Returns `None` when the data
    /// length is not a multiple of `dim` or `dim` is zero.
    pub fn from_vec(data: Vec<f32>, dim: usize) -> Option<Self> {
        if dim == 0 || !data.len().is_multiple_of(dim) {
            return None;
        }
        Some(Self { data, dim })
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Maximum inner product between `query` and any row; `0.0` for an
    /// empty matrix.
    pub fn max_dot(&self, query: &[f32]) -> Result<f32, DimensionMismatch> {
        self.check_dim(query)?;
        Ok(self
            .data
            .chunks_exact(self.dim)
            .map(|row| dot(query, row))
            .fold(0.0f32, f32::max))
    }

    fn check_dim(&self, query: &[f32]) -> Result<(), DimensionMismatch> {
        if query.len() != self.dim {
            return Err(DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        Ok(())
    }
}

/// A single index search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    pub score: f32,
}

/// Exact top-k inner-product search over an [`EmbeddingMatrix`].
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    matrix: EmbeddingMatrix,
}

impl FlatIpIndex {
    pub fn new(matrix: EmbeddingMatrix) -> Self {
        Self { matrix }
    }

    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.rows() == 0
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Returns up to `k` nearest rows by inner product, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, DimensionMismatch> {
        if query.len() != self.matrix.dim() {
            return Err(DimensionMismatch {
                expected: self.matrix.dim(),
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = (0..self.matrix.rows())
            .map(|i| SearchHit {
                index: i,
                score: dot(query, self.matrix.row(i)),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        Ok(hits)
    }
}

#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
