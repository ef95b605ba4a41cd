use super::*;

fn config() -> SegmenterConfig {
    SegmenterConfig::default()
}

mod normalization {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(
            normalize_page_text("The  Company\n\tshall   pay"),
            "The Company shall pay"
        );
    }

    #[test]
    fn repairs_pdf_hyphenation() {
        assert_eq!(
            normalize_page_text("the termi-\nnation clause"),
            "the termination clause"
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_page_text("  text  "), "text");
    }
}

mod splitting {
    use super::*;

    #[test]
    fn splits_after_period_and_semicolon() {
        let text = "The Employee shall maintain strict confidentiality at all times. \
                    The Company may audit compliance upon reasonable written notice; \
                    audits occur no more than twice per calendar year in any case.";
        let chunks = chunk_page(text, 1, &config());
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].clause_text.ends_with('.'));
        assert!(chunks[1].clause_text.ends_with(';'));
    }

    #[test]
    fn splits_after_paren_before_capital() {
        let text = "The obligations survive termination under Section 9(b) \
                    The Company retains all intellectual property rights hereunder";
        let chunks = chunk_page(text, 1, &config());
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].clause_text.ends_with("9(b)"));
        assert!(chunks[1].clause_text.starts_with("The Company"));
    }

    #[test]
    fn paren_before_lowercase_is_not_a_boundary() {
        let text = "as described in Section 4(a) and elsewhere in this Agreement, \
                    the Employee agrees to comply with all applicable policies.";
        let chunks = chunk_page(text, 1, &config());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn preserves_reading_order_and_page_numbers() {
        let pages = vec![
            Page::new(1, "This clause appears on the very first page of the contract."),
            Page::new(2, "This clause appears on the second page of the contract text."),
        ];
        let chunks = chunk_pages(&pages, &config());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_no, 1);
        assert_eq!(chunks[1].page_no, 2);
    }
}

mod exception_merging {
    use super::*;

    #[test]
    fn notwithstanding_fragment_binds_forward() {
        let text = "Either party may terminate this Agreement upon 30 days written notice. \
                    Notwithstanding the foregoing, termination requires board approval.";
        let chunks = chunk_page(text, 1, &config());
        // The exception fragment must not stand alone.
        assert!(chunks.iter().all(|c| !c
            .clause_text
            .to_lowercase()
            .starts_with("notwithstanding")
            || c.clause_text.contains("board approval")));
        let merged = chunks
            .iter()
            .find(|c| c.clause_text.contains("Notwithstanding"))
            .expect("exception fragment retained");
        assert!(merged.clause_text.contains("board approval"));
    }

    #[test]
    fn trailing_provided_that_appends_to_previous() {
        let text = "The Contractor may subcontract portions of the work with prior consent. \
                    provided that the Contractor remains fully liable for performance hereunder.";
        let chunks = chunk_page(text, 1, &config());
        // "provided that ..." contains a cue in its head, so it forward-binds
        // where possible; with nothing after it, it must still not appear as
        // a standalone leading fragment.
        assert!(!chunks.is_empty());
        assert!(chunks
            .iter()
            .any(|c| c.clause_text.contains("remains fully liable")));
        assert!(!chunks[0]
            .clause_text
            .to_lowercase()
            .starts_with("provided that"));
    }

    #[test]
    fn unrelated_fragments_are_not_merged() {
        let text = "The Employee shall devote full business time to the Company's affairs. \
                    The Company shall reimburse reasonable documented business expenses.";
        let chunks = chunk_page(text, 1, &config());
        assert_eq!(chunks.len(), 2);
    }
}

mod packing {
    use super::*;

    #[test]
    fn short_fragments_accumulate_until_flushed() {
        // Short enumerated items pack together rather than being dropped
        // one by one.
        let text = "1. Scope. 2. Term. 3. Fees. \
                    The Supplier shall deliver the goods to the designated facility.";
        let chunks = chunk_page(text, 1, &config());
        assert!(!chunks.is_empty());
        // No surviving chunk is below the floor.
        assert!(chunks
            .iter()
            .all(|c| c.clause_text.chars().count() >= DEFAULT_MIN_CLAUSE_LEN));
    }

    #[test]
    fn two_long_fragments_stay_separate() {
        let a = "The Employee shall not disclose confidential information to any third party.";
        let b = "The Company shall indemnify the Employee against third party claims arising hereunder.";
        let chunks = chunk_page(&format!("{} {}", a, b), 1, &config());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn undersized_leftovers_are_discarded() {
        let chunks = chunk_page("Short text.", 1, &config());
        assert!(chunks.is_empty());
    }
}

mod idempotence {
    use super::*;

    #[test]
    fn resegmenting_output_does_not_lose_clauses() {
        let text = "The Employee shall maintain strict confidentiality at all times. \
                    The Company may audit compliance upon reasonable written notice; \
                    Notwithstanding the foregoing, audits require five business days notice. \
                    All disputes shall be resolved exclusively by binding arbitration.";
        let first = chunk_page(text, 1, &config());
        let rejoined = first
            .iter()
            .map(|c| c.clause_text.as_str())
            .collect::<Vec<_>>();

        let mut second = Vec::new();
        for clause in &rejoined {
            second.extend(chunk_page(clause, 1, &config()));
        }
        assert!(second.len() >= first.len());
        // Nothing falls below the minimum-length floor on a second pass.
        assert!(second
            .iter()
            .all(|c| c.clause_text.chars().count() >= DEFAULT_MIN_CLAUSE_LEN));
    }
}

mod dedup {
    use super::*;

    fn chunk(page_no: u32, text: &str) -> ClauseChunk {
        ClauseChunk {
            page_no,
            clause_text: text.to_string(),
        }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let chunks = vec![
            chunk(1, "The Employee shall not compete."),
            chunk(2, "the  employee shall NOT compete."),
            chunk(2, "The Company shall indemnify."),
        ];
        let unique = deduplicate_chunks(chunks);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].page_no, 1);
        assert_eq!(unique[1].clause_text, "The Company shall indemnify.");
    }

    #[test]
    fn dedup_is_idempotent() {
        let chunks = vec![
            chunk(1, "Alpha clause text for the first entry."),
            chunk(1, "Alpha   clause text for the first entry."),
            chunk(3, "Beta clause text for the second entry."),
        ];
        let once = deduplicate_chunks(chunks);
        let twice = deduplicate_chunks(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn key_normalization_lowercases_and_collapses() {
        assert_eq!(
            normalize_clause_key("  The   PARTIES\nhereto  "),
            "the parties hereto"
        );
    }
}
