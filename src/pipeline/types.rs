//! Shared types for the digest pipeline.

use serde::{Deserialize, Serialize};

use crate::source::PaperRecord;

// ── Filter output ───────────────────────────────────────────────────

/// One (paper, matching keyword) pair.
///
/// A paper matching K keywords yields K entries, each with its own
/// highlighted abstract. Deduplication happens later, by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredEntry {
    pub title: String,
    pub url: String,
    pub authors: Vec<String>,
    /// Abstract with literal keyword occurrences wrapped in `<b>..</b>`.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// The keyword that produced this entry.
    pub keyword: String,
}

impl FilteredEntry {
    pub fn from_record(record: &PaperRecord, keyword: &str, highlighted: String) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
            authors: record.authors.clone(),
            abstract_text: highlighted,
            keyword: keyword.to_string(),
        }
    }
}

// ── Deduplicated paper ──────────────────────────────────────────────

/// A paper after URL deduplication.
///
/// Within one deduplicated sequence no two entries share a URL, and order
/// is first-seen order of the filtered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquePaper {
    pub title: String,
    pub url: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Keyword whose highlighted variant was kept.
    pub keyword: String,
}

impl From<FilteredEntry> for UniquePaper {
    fn from(entry: FilteredEntry) -> Self {
        Self {
            title: entry.title,
            url: entry.url,
            authors: entry.authors,
            abstract_text: entry.abstract_text,
            keyword: entry.keyword,
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────────

/// Rendered HTML for one paper: model output plus the detail footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBlock {
    pub rendered_text: String,
}

impl SummaryBlock {
    pub fn new(rendered_text: impl Into<String>) -> Self {
        Self {
            rendered_text: rendered_text.into(),
        }
    }
}
