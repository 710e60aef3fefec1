//! Keyword filtering and URL deduplication.
//!
//! Matching is case-insensitive but highlighting is a literal,
//! case-sensitive replace of the configured keyword. A keyword that only
//! appears in a different case still matches; it is just not bolded.

use std::collections::HashSet;

use crate::pipeline::types::{FilteredEntry, UniquePaper};
use crate::source::PaperRecord;

/// Wrap every literal occurrence of `keyword` in `<b>..</b>`.
pub fn highlight(abstract_text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return abstract_text.to_string();
    }
    abstract_text.replace(keyword, &format!("<b>{keyword}</b>"))
}

/// Emit one entry per (paper, matching keyword) pair, papers in input
/// order, keywords in configured order.
pub fn filter_papers(papers: &[PaperRecord], keywords: &[String]) -> Vec<FilteredEntry> {
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut entries = Vec::new();

    for paper in papers {
        let abstract_lower = paper.abstract_text.to_lowercase();
        for (keyword, keyword_lower) in keywords.iter().zip(&lowered) {
            if abstract_lower.contains(keyword_lower.as_str()) {
                let highlighted = highlight(&paper.abstract_text, keyword);
                entries.push(FilteredEntry::from_record(paper, keyword, highlighted));
            }
        }
    }
    entries
}

/// Keep the first entry for each URL, preserving order.
pub fn deduplicate<I, T>(entries: I) -> Vec<UniquePaper>
where
    I: IntoIterator<Item = T>,
    T: Into<UniquePaper>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();
    for entry in entries {
        let paper: UniquePaper = entry.into();
        if seen.insert(paper.url.clone()) {
            unique.push(paper);
        }
    }
    unique
}
