//! Digest assembly.

use crate::pipeline::types::SummaryBlock;

/// Banner prefixed to every digest: content is LLM-generated and may be wrong.
pub const DISCLAIMER: &str = "!注意! 内容由LLM整理, 请注意潜在错误 !注意!<br>\n";

/// Sent instead of a digest when no paper survives filtering.
pub const NO_PAPERS_MESSAGE: &str = "No papers found. Maybe today is Monday?";

/// Join summaries into one HTML fragment, each under a `Paper i` heading.
pub fn format_digest(summaries: &[SummaryBlock]) -> String {
    let body = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("<h2>Paper {}</h2>\n{}", i + 1, s.rendered_text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{DISCLAIMER}{body}")
}
