//! Digest pipeline.
//!
//! One run flows through:
//! 1. `PaperSource::fetch()`: listing service I/O
//! 2. `filter_papers()`: keyword match + highlight, one entry per keyword
//! 3. `deduplicate()`: first entry per URL wins
//! 4. `Summarizer::summarize()`: one completion per paper, failures absorbed
//! 5. `format_digest()`: numbered HTML sections under a disclaimer
//! 6. `Notifier::deliver()`: email or file
//!
//! `DigestPipeline` in `runner` drives the steps in order.

pub mod digest;
pub mod filter;
pub mod progress;
pub mod runner;
pub mod summarizer;
pub mod types;

pub use digest::{DISCLAIMER, NO_PAPERS_MESSAGE, format_digest};
pub use filter::{deduplicate, filter_papers, highlight};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use runner::{DigestPipeline, RunOptions, RunReport, date_window};
pub use summarizer::{Summarizer, mirror_url, replace_first_literal};
pub use types::{FilteredEntry, SummaryBlock, UniquePaper};
