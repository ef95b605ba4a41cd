//! Shared fixtures: stub models and an in-memory reference corpus.

use std::sync::Arc;

use lexrisk::corpus::{EmbeddingMatrix, ReferenceCorpus, ReferenceRecord};
use lexrisk::embedding::{ClauseEncoder, EncoderConfig, Reranker};
use lexrisk::pipeline::Analyzer;

pub const DIM: usize = 32;

pub fn stub_encoder() -> Arc<ClauseEncoder> {
    Arc::new(
        ClauseEncoder::load(EncoderConfig::stub().with_embedding_dim(DIM))
            .expect("stub encoder loads"),
    )
}

pub fn stub_reranker() -> Arc<Reranker> {
    Arc::new(Reranker::stub().expect("stub reranker loads"))
}

/// Builds a corpus whose embeddings come from the stub encoder, so a
/// verbatim clause scores identity 1.0 against its reference row.
pub fn reference_corpus(
    encoder: &ClauseEncoder,
    entries: &[(&str, &str)],
) -> ReferenceCorpus {
    let records = entries
        .iter()
        .map(|(label, answer)| ReferenceRecord {
            index_id: 0,
            label: label.to_string(),
            answer_text: answer.to_string(),
            source_title: None,
        })
        .collect();

    let mut primary = Vec::new();
    let mut combined = Vec::new();
    for (_, answer) in entries {
        let dual = encoder.embed_dual(answer).expect("stub embed");
        primary.extend_from_slice(&dual.primary);
        combined.extend(dual.query_vector());
    }

    ReferenceCorpus::from_parts(
        records,
        EmbeddingMatrix::from_vec(primary, DIM).expect("primary shape"),
        EmbeddingMatrix::from_vec(combined, DIM * 2).expect("combined shape"),
    )
    .expect("valid corpus")
}

pub fn analyzer(entries: &[(&str, &str)]) -> Analyzer {
    let encoder = stub_encoder();
    let corpus = reference_corpus(&encoder, entries);
    Analyzer::new(encoder, stub_reranker(), corpus).expect("analyzer builds")
}
