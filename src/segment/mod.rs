//! Clause segmentation and exact deduplication.
//!
//! The segmenter is recall-first: it over-splits page text on clause
//! boundaries, then repairs legal exception fragments and packs undersized
//! pieces. Order of operations is load-bearing: normalize, split, merge
//! exceptions, pack, length-filter.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::constants::DEFAULT_MIN_CLAUSE_LEN;
use crate::document::Page;

/// Legal exception cues that bind a fragment to its neighbor.
///
/// Hand-tuned against observed false splits; treated as contract.
pub const EXCEPTION_CUES: [&str; 8] = [
    "provided that",
    "except",
    "unless",
    "subject to",
    "notwithstanding",
    "so long as",
    "however",
    "including",
];

/// Cue detection only looks at the head of a fragment to avoid false
/// positives deep inside long clauses.
const CUE_SCAN_CHARS: usize = 80;

/// A candidate clause produced by segmentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseChunk {
    /// 1-based page the clause was found on.
    pub page_no: u32,
    pub clause_text: String,
}

/// Segmenter configuration. Only the length floor is tunable; the boundary
/// rules and cue list are fixed.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    pub min_clause_len: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_clause_len: DEFAULT_MIN_CLAUSE_LEN,
        }
    }
}

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s+").expect("static regex"));

/// Collapses whitespace and repairs PDF line-break hyphenation.
pub fn normalize_page_text(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let dehyphenated = HYPHEN_BREAK.replace_all(&collapsed, "");
    dehyphenated.trim().to_string()
}

/// Splits normalized text into raw fragments.
///
/// Boundary rules, applied simultaneously: after a semicolon; after a
/// period; after a closing parenthesis immediately followed by whitespace
/// and a capital letter; after a newline.
fn split_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        let end = i + c.len_utf8();
        let boundary = match c {
            ';' | '.' | '\n' => true,
            ')' => {
                // Only a boundary when followed by whitespace then a capital.
                let rest = &text[end..];
                let mut chars = rest.chars();
                match chars.next() {
                    Some(ws) if ws.is_whitespace() => {
                        let mut next = chars.next();
                        while matches!(next, Some(n) if n.is_whitespace()) {
                            next = chars.next();
                        }
                        matches!(next, Some(n) if n.is_uppercase())
                    }
                    _ => false,
                }
            }
            _ => false,
        };

        if boundary {
            let frag = text[start..end].trim();
            if !frag.is_empty() {
                fragments.push(frag);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        fragments.push(tail);
    }

    fragments
}

/// Returns true when the first [`CUE_SCAN_CHARS`] characters contain any
/// exception cue (case-insensitive).
fn has_exception_prefix(text: &str) -> bool {
    let head: String = text.chars().take(CUE_SCAN_CHARS).collect::<String>().to_lowercase();
    EXCEPTION_CUES.iter().any(|cue| head.contains(cue))
}

/// Returns true when the fragment's lowercase text starts with a cue.
fn starts_with_cue(lower: &str) -> bool {
    EXCEPTION_CUES.iter().any(|cue| lower.starts_with(cue))
}

/// Merges legal exception fragments in both directions in one scan.
///
/// Forward binding takes precedence: a fragment whose head contains a cue is
/// glued to the *following* fragment ("EXCEPT UNDER SECTION 11(a), IN NO
/// EVENT..." must bind to the liability sentence after it). Otherwise a
/// fragment that *starts* with a cue is appended to the previous merged
/// fragment.
fn merge_exceptions(fragments: &[&str]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(fragments.len());
    let mut i = 0;

    while i < fragments.len() {
        let cur = fragments[i].trim();
        if cur.is_empty() {
            i += 1;
            continue;
        }

        if has_exception_prefix(cur) && i + 1 < fragments.len() {
            let next = fragments[i + 1].trim();
            if !next.is_empty() {
                merged.push(format!("{} {}", cur, next));
                i += 2;
                continue;
            }
        }

        let lower = cur.to_lowercase();
        if starts_with_cue(&lower)
            && let Some(last) = merged.last_mut()
        {
            last.push(' ');
            last.push_str(cur);
        } else {
            merged.push(cur.to_string());
        }

        i += 1;
    }

    merged
}

/// Packs undersized fragments into a buffer, flushing it whenever a
/// fragment is long enough to stand alone. Two independently long fragments
/// are never merged with each other.
fn pack_fragments(fragments: Vec<String>, min_len: usize) -> Vec<String> {
    let mut chunks = Vec::with_capacity(fragments.len());
    let mut buf = String::new();

    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }

        if fragment.chars().count() >= min_len {
            if !buf.is_empty() {
                chunks.push(std::mem::take(&mut buf));
            }
            chunks.push(fragment.to_string());
            continue;
        }

        if buf.is_empty() {
            buf.push_str(fragment);
        } else {
            buf.push(' ');
            buf.push_str(fragment);
        }
    }

    if !buf.trim().is_empty() {
        chunks.push(buf.trim().to_string());
    }

    chunks
}

/// Segments one page of text into clause chunks.
pub fn chunk_page(text: &str, page_no: u32, config: &SegmenterConfig) -> Vec<ClauseChunk> {
    let normalized = normalize_page_text(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let fragments = split_fragments(&normalized);
    let merged = merge_exceptions(&fragments);
    let packed = pack_fragments(merged, config.min_clause_len);

    packed
        .into_iter()
        .filter(|c| c.chars().count() >= config.min_clause_len)
        .map(|clause_text| ClauseChunk {
            page_no,
            clause_text,
        })
        .collect()
}

/// Segments every page of a document, preserving reading order.
pub fn chunk_pages(pages: &[Page], config: &SegmenterConfig) -> Vec<ClauseChunk> {
    let chunks: Vec<ClauseChunk> = pages
        .iter()
        .flat_map(|page| chunk_page(&page.text, page.page_no, config))
        .collect();

    debug!(
        pages = pages.len(),
        clauses = chunks.len(),
        "Segmented document into candidate clauses"
    );

    chunks
}

/// Canonical normalization used for dedup keys and near-duplicate merging:
/// lowercase with collapsed whitespace.
pub fn normalize_clause_key(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(text, " ")
        .trim()
        .to_lowercase()
}

/// Drops exact-normalized duplicates, keeping the first occurrence per key
/// in original order.
pub fn deduplicate_chunks(chunks: Vec<ClauseChunk>) -> Vec<ClauseChunk> {
    let mut seen: HashSet<String> = HashSet::with_capacity(chunks.len());
    chunks
        .into_iter()
        .filter(|chunk| seen.insert(normalize_clause_key(&chunk.clause_text)))
        .collect()
}
