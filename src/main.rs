//! Lexrisk CLI entrypoint.
//!
//! Analyzes one document and prints the JSON report. Input is either a
//! pre-extracted pages file (`.json`, an array of `{page_no, text}`) or a
//! plain-text document with form-feed page breaks.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};

use lexrisk::config::Config;
use lexrisk::corpus::ReferenceCorpus;
use lexrisk::document::Page;
use lexrisk::embedding::{ClauseEncoder, Reranker};
use lexrisk::pipeline::Analyzer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: lexrisk <document.txt|pages.json>");
    };

    let config = Config::from_env();
    config.validate()?;

    let encoder_config = config.encoder_config();
    if encoder_config.testing_stub {
        tracing::warn!("No LEXRISK_ENCODER_PATH configured, running encoder in stub mode");
    }
    let encoder = Arc::new(ClauseEncoder::load(encoder_config)?);

    let reranker_config = config.reranker_config();
    if reranker_config.model_path.is_none() {
        tracing::warn!("No LEXRISK_RERANKER_PATH configured, running reranker in stub mode");
    }
    let reranker = Arc::new(Reranker::load(reranker_config)?);

    let corpus = ReferenceCorpus::load(&config.corpus_paths(), config.embedding_dim)
        .context("failed to load reference corpus")?;
    tracing::info!(records = corpus.len(), "Loaded reference corpus");

    let analyzer = Analyzer::new(encoder, reranker, corpus)?
        .with_scoring(config.scoring_config())
        .with_segmenter(config.segmenter_config());

    let report = if input.extension().is_some_and(|ext| ext == "json") {
        let raw = std::fs::read_to_string(&input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let pages: Vec<Page> = serde_json::from_str(&raw)
            .context("pages file must be a JSON array of {page_no, text}")?;
        analyzer.analyze_pages(&pages)?
    } else {
        let bytes = std::fs::read(&input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        analyzer.analyze_document(&bytes)?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
