//! Paper listing sources.
//!
//! A source turns a date window plus category filter into paper records.
//! The only production implementation is the arXiv OAI-PMH harvester.

pub mod arxiv;
pub mod meta;

pub use arxiv::ArxivOaiSource;
pub use meta::MetaInfo;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Subject area harvested by default.
pub const DEFAULT_SUBJECT: &str = "cs";

/// A paper as returned by the listing service. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    /// Canonical paper page, e.g. `https://arxiv.org/abs/2401.00001`.
    pub url: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// What to harvest.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// OAI set, e.g. `cs`.
    pub subject: String,
    pub date_from: NaiveDate,
    pub date_until: NaiveDate,
    /// Keep records whose category list contains any of these.
    /// Empty keeps everything.
    pub categories: Vec<String>,
    /// Also collect per-record metadata for the CSV side channel.
    pub with_meta: bool,
}

impl FetchRequest {
    pub fn new(date_from: NaiveDate, date_until: NaiveDate, categories: Vec<String>) -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            date_from,
            date_until,
            categories,
            with_meta: false,
        }
    }

    pub fn with_meta(mut self, with_meta: bool) -> Self {
        self.with_meta = with_meta;
        self
    }
}

/// Harvest result.
#[derive(Debug, Clone, Default)]
pub struct FetchOutput {
    pub papers: Vec<PaperRecord>,
    /// Present when the request asked for metadata.
    pub meta: Option<MetaInfo>,
}

/// Trait for paper listing sources.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch all records in the request window that pass the category filter.
    ///
    /// An empty listing (OAI `noRecordsMatch`, typical on Mondays) is
    /// `SourceError::NoRecords`, not an empty `Ok`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutput, SourceError>;
}
