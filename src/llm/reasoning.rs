//! Reasoning-trace removal.
//!
//! Reasoning models (DeepSeek-R1, QwQ, ...) prefix their answer with a
//! `<think>...</think>` block. It is never part of the digest.

use std::sync::LazyLock;

use regex::Regex;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think-block regex"));

/// Remove every `<think>...</think>` block (non-greedy, may span lines)
/// and trim surrounding whitespace.
pub fn strip_reasoning(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_multiline_block() {
        assert_eq!(
            strip_reasoning("prefix<think>internal notes\nmore notes</think>suffix"),
            "prefixsuffix"
        );
    }

    #[test]
    fn strips_each_block_non_greedily() {
        assert_eq!(
            strip_reasoning("<think>a</think>keep<think>b</think> this"),
            "keep this"
        );
    }

    #[test]
    fn trims_leftover_whitespace() {
        assert_eq!(
            strip_reasoning("<think>\nplan\n</think>\n\n<b>Title:</b> X<br>\n"),
            "<b>Title:</b> X<br>"
        );
    }

    #[test]
    fn unterminated_block_is_left_alone() {
        assert_eq!(strip_reasoning("<think>never closed"), "<think>never closed");
    }

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(strip_reasoning("  just an answer  "), "just an answer");
    }
}
