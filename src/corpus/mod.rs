//! Reference corpus: labeled clause records, primary embeddings, and the
//! retrieval index over concatenated dual vectors.
//!
//! All shape invariants are enforced here, at load time. A corpus that
//! loads successfully can be scored against without further validation.

pub mod error;
pub mod index;


pub use error::CorpusError;
pub use index::{DimensionMismatch, EmbeddingMatrix, FlatIpIndex, SearchHit, dot};

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::risk::normalize_label;

/// One curated reference clause. Labels are canonicalized at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    /// Row position in the embedding matrices.
    pub index_id: usize,
    /// Canonical (normalized) risk label.
    pub label: String,
    pub answer_text: String,
    pub source_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    label: String,
    answer_text: String,
    #[serde(default)]
    source_title: Option<String>,
}

/// File locations for a corpus on disk.
#[derive(Debug, Clone)]
pub struct CorpusPaths {
    /// JSONL metadata, one record per line.
    pub metadata: PathBuf,
    /// Raw little-endian f32 matrix of primary embeddings, row per record.
    pub primary_embeddings: PathBuf,
    /// Raw little-endian f32 matrix of concatenated (primary + context)
    /// embeddings, row per record.
    pub index_embeddings: PathBuf,
}

/// Loaded, immutable reference corpus.
#[derive(Debug)]
pub struct ReferenceCorpus {
    records: Vec<ReferenceRecord>,
    primary: EmbeddingMatrix,
    index: FlatIpIndex,
}

impl ReferenceCorpus {
    /// Loads and validates a corpus. Any missing artifact, malformed file,
    /// or count/shape mismatch is fatal here so it can never surface at
    /// request time.
    pub fn load(paths: &CorpusPaths, embedding_dim: usize) -> Result<Self, CorpusError> {
        let records = load_metadata(&paths.metadata)?;
        info!(
            path = %paths.metadata.display(),
            records = records.len(),
            "Loaded corpus metadata"
        );

        let primary = load_matrix(&paths.primary_embeddings, embedding_dim)?;
        info!(
            path = %paths.primary_embeddings.display(),
            rows = primary.rows(),
            dim = primary.dim(),
            "Loaded primary embeddings"
        );

        let combined = load_matrix(&paths.index_embeddings, embedding_dim * 2)?;
        info!(
            path = %paths.index_embeddings.display(),
            rows = combined.rows(),
            dim = combined.dim(),
            "Loaded index embeddings"
        );

        Self::from_parts(records, primary, combined)
    }

    /// Assembles a corpus from in-memory parts, enforcing the same
    /// invariants as [`load`](Self::load). Record labels are normalized
    /// and `index_id`s assigned by position.
    pub fn from_parts(
        mut records: Vec<ReferenceRecord>,
        primary: EmbeddingMatrix,
        combined: EmbeddingMatrix,
    ) -> Result<Self, CorpusError> {
        if records.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        for (i, record) in records.iter_mut().enumerate() {
            record.index_id = i;
            record.label = normalize_label(&record.label);
        }

        if primary.rows() != records.len() {
            return Err(CorpusError::CountMismatch {
                records: records.len(),
                rows: primary.rows(),
            });
        }

        if combined.rows() != records.len() {
            return Err(CorpusError::CountMismatch {
                records: records.len(),
                rows: combined.rows(),
            });
        }

        if combined.dim() != primary.dim() * 2 {
            return Err(CorpusError::IndexDimensionMismatch {
                primary: primary.dim(),
                index: combined.dim(),
            });
        }

        Ok(Self {
            records,
            primary,
            index: FlatIpIndex::new(combined),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index_id: usize) -> Option<&ReferenceRecord> {
        self.records.get(index_id)
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    /// Dimension of a primary embedding.
    pub fn embedding_dim(&self) -> usize {
        self.primary.dim()
    }

    /// Dimension of a concatenated retrieval query.
    pub fn query_dim(&self) -> usize {
        self.index.dim()
    }

    /// Identity signal: maximum similarity between the query's primary
    /// embedding and every stored primary embedding, clamped to [0, 1].
    pub fn max_primary_similarity(&self, primary_query: &[f32]) -> Result<f32, DimensionMismatch> {
        Ok(self.primary.max_dot(primary_query)?.clamp(0.0, 1.0))
    }

    /// Top-k nearest reference rows for a concatenated query vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, DimensionMismatch> {
        self.index.search(query, k)
    }
}

fn load_metadata(path: &Path) -> Result<Vec<ReferenceRecord>, CorpusError> {
    let file = std::fs::File::open(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (line_no, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawRecord =
            serde_json::from_str(&line).map_err(|e| CorpusError::InvalidMetadata {
                path: path.to_path_buf(),
                line: line_no + 1,
                reason: e.to_string(),
            })?;

        records.push(ReferenceRecord {
            index_id: records.len(),
            label: raw.label,
            answer_text: raw.answer_text,
            source_title: raw.source_title,
        });
    }

    if records.is_empty() {
        return Err(CorpusError::EmptyCorpus);
    }

    Ok(records)
}

fn load_matrix(path: &Path, dim: usize) -> Result<EmbeddingMatrix, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !bytes.len().is_multiple_of(std::mem::size_of::<f32>()) {
        return Err(CorpusError::MalformedEmbeddingFile {
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    let data: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes);

    EmbeddingMatrix::from_vec(data, dim).ok_or(CorpusError::BadMatrixShape {
        len: bytes.len() / std::mem::size_of::<f32>(),
        dim,
    })
}
