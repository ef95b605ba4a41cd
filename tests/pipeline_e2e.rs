//! End-to-end document analysis with stub models.

mod common;

use common::{DIM, analyzer, reference_corpus, stub_encoder, stub_reranker};

use lexrisk::document::Page;
use lexrisk::embedding::{ClauseEncoder, EncoderConfig};
use lexrisk::pipeline::{Analyzer, DocumentRisk, PipelineError};
use lexrisk::risk::RiskBand;

const NON_COMPETE_REF: &str = "During the term of employment the Employee shall not engage in any \
     business competing with the Company or solicit its customers.";
const LIABILITY_REF: &str = "Each party's liability under this agreement shall be unlimited and \
     no cap shall apply to claims arising from breach.";
const TERMINATION_REF: &str = "Either party may terminate this agreement at any time for \
     convenience upon thirty days written notice.";

fn references() -> Vec<(&'static str, &'static str)> {
    vec![
        ("non_compete", NON_COMPETE_REF),
        ("uncapped_liability", LIABILITY_REF),
        ("termination_for_convenience", TERMINATION_REF),
    ]
}

#[test]
fn verbatim_reference_clause_makes_the_document_high_risk() {
    let analyzer = analyzer(&references());

    let report = analyzer
        .analyze_pages(&[Page::new(1, LIABILITY_REF)])
        .unwrap();

    assert_eq!(report.document_risk, DocumentRisk::HighRisk);
    assert_eq!(report.clauses.len(), 1);

    let clause = &report.clauses[0];
    assert_eq!(clause.page_no, 1);
    // Identity override: verbatim match bands high and dominates fusion.
    assert!(clause.identity > 0.999);
    assert!(clause.final_score > 0.8);
    let liability = clause
        .labels
        .iter()
        .find(|s| s.label == "uncapped_liability")
        .expect("liability signal present");
    assert_eq!(liability.band, RiskBand::High);

    let stats = &report.label_summary["uncapped_liability"];
    assert!(stats.high_risk_clauses >= 1);
    assert!(report.doc_score >= 7);
}

#[test]
fn paraphrase_with_heavy_overlap_is_flagged() {
    let analyzer = analyzer(&references());

    let clause = "The Employee shall not engage in any competing business with the Company \
         and shall not solicit customers of the Company.";
    let report = analyzer.analyze_pages(&[Page::new(1, clause)]).unwrap();

    assert_eq!(report.clauses.len(), 1);
    let non_compete = report.clauses[0]
        .labels
        .iter()
        .find(|s| s.label == "non_compete")
        .expect("non_compete signal present");
    assert!(non_compete.semantic_score >= 0.72);
    assert_eq!(non_compete.band, RiskBand::High);
    // No verbatim reference row, so the override must not have fired.
    assert!(report.clauses[0].labels.iter().all(|s| s.final_score < 1.0));
}

#[test]
fn non_compete_without_a_restriction_verb_is_gated_out() {
    let analyzer = analyzer(&references());

    // Heavy overlap with the non-compete reference, but nothing is being
    // restricted, so the gate must drop the signal.
    let clause = "The Employee is welcome to engage in any competing business with the \
         Company and may solicit customers of the Company.";
    let report = analyzer.analyze_pages(&[Page::new(1, clause)]).unwrap();

    assert!(report.clauses.is_empty());
    assert_eq!(report.document_risk, DocumentRisk::LowRisk);
    assert_eq!(report.doc_score, 0);
}

#[test]
fn benign_document_is_low_risk() {
    let analyzer = analyzer(&references());

    let report = analyzer
        .analyze_pages(&[Page::new(
            1,
            "The office kitchen shall be cleaned every Friday afternoon by the catering \
             vendor according to the posted rota schedule.",
        )])
        .unwrap();

    assert_eq!(report.document_risk, DocumentRisk::LowRisk);
    assert!(report.clauses.is_empty());
    assert!(report.label_summary.is_empty());
    assert_eq!(report.doc_score, 0);
}

#[test]
fn duplicate_clauses_across_pages_merge_into_one() {
    let analyzer = analyzer(&references());

    let report = analyzer
        .analyze_pages(&[
            Page::new(1, LIABILITY_REF),
            Page::new(2, "This page discusses invoicing and address changes only."),
            Page::new(3, LIABILITY_REF),
        ])
        .unwrap();

    assert_eq!(report.clauses.len(), 1);
    assert_eq!(report.clauses[0].page_no, 1);
    assert_eq!(report.label_summary["uncapped_liability"].total_clauses, 1);
}

#[test]
fn analyze_document_splits_plain_text_on_form_feeds() {
    let analyzer = analyzer(&references());

    let text = format!("General introduction page without any clauses.\u{0c}{LIABILITY_REF}");
    let report = analyzer.analyze_document(text.as_bytes()).unwrap();

    assert_eq!(report.document_risk, DocumentRisk::HighRisk);
    assert_eq!(report.clauses[0].page_no, 2);
}

#[test]
fn fragments_below_the_length_floor_are_ignored() {
    let analyzer = analyzer(&references());

    let report = analyzer
        .analyze_pages(&[Page::new(1, "Hello. Short. Very brief page.")])
        .unwrap();

    assert!(report.clauses.is_empty());
    assert_eq!(report.doc_score, 0);
}

#[test]
fn mismatched_encoder_and_corpus_dims_fail_at_construction() {
    let encoder = stub_encoder();
    let corpus = reference_corpus(&encoder, &references());

    let narrow = ClauseEncoder::load(EncoderConfig::stub().with_embedding_dim(DIM / 2))
        .expect("stub encoder loads");
    let err = Analyzer::new(std::sync::Arc::new(narrow), stub_reranker(), corpus).unwrap_err();
    assert!(matches!(err, PipelineError::EmbeddingDimMismatch { .. }));
}
