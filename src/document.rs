//! Page extraction boundary.
//!
//! PDF parsing and OCR fallback live outside this crate; the pipeline only
//! depends on the [`PageExtractor`] trait. [`PlainTextExtractor`] is the
//! built-in implementation for pre-extracted text (form-feed page breaks).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One page of extracted document text, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page_no: u32,
    /// Raw page text (normalization happens in the segmenter).
    pub text: String,
}

impl Page {
    pub fn new(page_no: u32, text: impl Into<String>) -> Self {
        Self {
            page_no,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is not valid UTF-8: {reason}")]
    InvalidEncoding { reason: String },

    #[error("document contained no extractable text")]
    EmptyDocument,

    #[error("extraction failed: {reason}")]
    ExtractionFailed { reason: String },
}

/// Turns raw document bytes into ordered per-page text.
///
/// Implementations must return pages in reading order with 1-based page
/// numbers. OCR fallback policy is the implementation's concern.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, ExtractionError>;
}

/// Extractor for plain UTF-8 text where pages are separated by form feeds.
///
/// Input without any form feed is treated as a single page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PageExtractor for PlainTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Page>, ExtractionError> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| ExtractionError::InvalidEncoding {
                reason: e.to_string(),
            })?;

        let pages: Vec<Page> = text
            .split('\u{0c}')
            .enumerate()
            .map(|(i, page_text)| Page::new(i as u32 + 1, page_text))
            .collect();

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(ExtractionError::EmptyDocument);
        }

        Ok(pages)
    }
}
