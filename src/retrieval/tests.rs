use super::*;

use crate::corpus::{EmbeddingMatrix, ReferenceRecord};
use crate::embedding::EncoderConfig;

const DIM: usize = 16;

fn encoder() -> ClauseEncoder {
    ClauseEncoder::load(EncoderConfig::stub().with_embedding_dim(DIM)).expect("stub encoder")
}

fn corpus_from_texts(encoder: &ClauseEncoder, texts: &[&str]) -> ReferenceCorpus {
    let records = texts
        .iter()
        .map(|t| ReferenceRecord {
            index_id: 0,
            label: "uncapped_liability".to_string(),
            answer_text: t.to_string(),
            source_title: None,
        })
        .collect();

    let mut primary = Vec::new();
    let mut combined = Vec::new();
    for text in texts {
        let dual = encoder.embed_dual(text).expect("stub embed");
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

mod windows {
    use super::*;

    fn probe(window: usize, stride: usize) -> ProbeConfig {
        ProbeConfig { window, stride }
    }

    #[test]
    fn short_text_is_a_single_window() {
        let text = "a short clause";
        assert_eq!(subwindows(text, &ProbeConfig::default()), vec![text]);
    }

    #[test]
    fn text_at_window_size_is_not_split() {
        let text = "x".repeat(DEFAULT_PROBE_WINDOW);
        assert_eq!(subwindows(&text, &ProbeConfig::default()).len(), 1);
    }

    #[test]
    fn long_text_produces_overlapping_windows() {
        let text: String = ('a'..='z').cycle().take(30).collect();
        let windows = subwindows(&text, &probe(10, 5));
        assert!(windows.len() > 1);
        for w in &windows {
            assert_eq!(w.chars().count(), 10);
        }
        // Consecutive windows overlap by window - stride characters.
        assert_eq!(&windows[0][5..], &windows[1][..5]);
    }

    #[test]
    fn windows_cover_the_tail() {
        let text: String = ('a'..='z').cycle().take(33).collect();
        let windows = subwindows(&text, &probe(10, 5));
        let last = windows.last().unwrap();
        assert!(text.ends_with(last));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "§".repeat(30);
        let windows = subwindows(&text, &probe(10, 5));
        for w in &windows {
            assert_eq!(w.chars().count(), 10);
        }
    }
}

#[test]
fn short_clause_uses_only_the_full_query() {
    let encoder = encoder();
    let corpus = corpus_from_texts(
        &encoder,
        &[
            "liability is unlimited for all claims",
            "termination for convenience with notice",
            "employee shall not compete after termination",
        ],
    );

    let retriever = Retriever {
        top_k: 2,
        probe: ProbeConfig::default(),
    };

    let text = "liability is unlimited for all claims";
    let dual = encoder.embed_dual(text).unwrap();
    let candidates = retriever
        .candidates(&encoder, &corpus, text, &dual)
        .unwrap();

    // Exactly top_k hits from the single full-text query.
    assert_eq!(candidates.len(), 2);
    assert!(candidates.contains(&0));
}

#[test]
fn long_clause_unions_probe_candidates() {
    let encoder = encoder();
    let corpus = corpus_from_texts(
        &encoder,
        &[
            "first reference clause text",
            "second reference clause text",
            "third reference clause text",
            "fourth reference clause text",
        ],
    );

    let retriever = Retriever {
        top_k: 1,
        probe: ProbeConfig {
            window: 40,
            stride: 20,
        },
    };

    let long_text = "The Supplier shall indemnify the Purchaser against all claims, \
                     losses and expenses arising from defects in the goods, and the \
                     Purchaser may terminate this Agreement for convenience at any time.";
    let dual = encoder.embed_dual(long_text).unwrap();
    let candidates = retriever
        .candidates(&encoder, &corpus, long_text, &dual)
        .unwrap();

    // top_k = 1 per query; probing can only add candidates.
    assert!(!candidates.is_empty());
    assert!(candidates.windows(2).all(|w| w[0] < w[1]), "sorted unique");
}

#[test]
fn candidate_indices_are_valid_rows() {
    let encoder = encoder();
    let texts = ["alpha clause", "beta clause", "gamma clause"];
    let corpus = corpus_from_texts(&encoder, &texts);

    let retriever = Retriever::default();
    let text = "alpha clause";
    let dual = encoder.embed_dual(text).unwrap();
    let candidates = retriever
        .candidates(&encoder, &corpus, text, &dual)
        .unwrap();

    assert!(candidates.iter().all(|&i| i < corpus.len()));
}
