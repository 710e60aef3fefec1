//! One digest run: fetch → filter → dedupe → summarize → format → deliver.
//!
//! Failures of the listing service, of single completions, and of
//! delivery are absorbed here and reported in the returned `RunReport`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{error, info, warn};

use crate::config::DigestConfig;
use crate::error::Result;
use crate::llm::{CompletionClient, create_client};
use crate::notify::{Notifier, create_notifier};
use crate::pipeline::digest::{NO_PAPERS_MESSAGE, format_digest};
use crate::pipeline::filter::{deduplicate, filter_papers};
use crate::pipeline::progress::{LogProgress, ProgressReporter};
use crate::pipeline::summarizer::Summarizer;
use crate::source::meta::META_INFO_FILE;
use crate::source::{ArxivOaiSource, FetchRequest, PaperSource};

/// Papers kept in smoke-test mode.
pub const SMOKE_TEST_LIMIT: usize = 2;

/// Run-level knobs, split out of `DigestConfig`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub keywords: Vec<String>,
    pub categories: Vec<String>,
    pub smoke_test: bool,
    pub max_tokens: u32,
    /// Where to write the metadata CSV, if at all.
    pub meta_path: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_config(config: &DigestConfig) -> Self {
        Self {
            keywords: config.keywords.clone(),
            categories: config.categories.clone(),
            smoke_test: config.smoke_test,
            max_tokens: config.llm.max_tokens,
            meta_path: config
                .save_meta_info
                .then(|| PathBuf::from(META_INFO_FILE)),
        }
    }
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub date_from: Option<NaiveDate>,
    pub date_until: Option<NaiveDate>,
    pub fetched: usize,
    /// Filtered entries, after smoke-test truncation.
    pub filtered: usize,
    pub unique: usize,
    pub summarized: usize,
    /// Listing failure that was treated as "no papers".
    pub source_error: Option<String>,
    pub delivered: bool,
}

/// The fetch window for a run on `today`: the two days ending yesterday.
pub fn date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let until = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let from = until.checked_sub_days(Days::new(1)).unwrap_or(until);
    (from, until)
}

/// Wires the collaborators of one digest run together.
pub struct DigestPipeline {
    source: Arc<dyn PaperSource>,
    summarizer: Summarizer,
    notifier: Arc<dyn Notifier>,
    progress: Arc<dyn ProgressReporter>,
    options: RunOptions,
}

impl DigestPipeline {
    pub fn new(
        source: Arc<dyn PaperSource>,
        llm: Arc<dyn CompletionClient>,
        notifier: Arc<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        Self {
            source,
            summarizer: Summarizer::new(llm, options.max_tokens),
            notifier,
            progress: Arc::new(LogProgress),
            options,
        }
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let source = Arc::new(ArxivOaiSource::new(config.oai_base_url.clone())?);
        let llm = create_client(&config.llm)?;
        let notifier = create_notifier(&config.delivery);
        Ok(Self::new(
            source,
            llm,
            notifier,
            RunOptions::from_config(config),
        ))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run the whole pipeline once for `today`.
    pub async fn run_once(&self, today: NaiveDate) -> RunReport {
        let (date_from, date_until) = date_window(today);
        let mut report = RunReport {
            date_from: Some(date_from),
            date_until: Some(date_until),
            ..Default::default()
        };
        info!(from = %date_from, until = %date_until, source = self.source.name(), "Fetching papers");

        let request = FetchRequest::new(date_from, date_until, self.options.categories.clone())
            .with_meta(self.options.meta_path.is_some());

        let papers = match self.source.fetch(&request).await {
            Ok(output) => {
                if let (Some(meta), Some(path)) = (&output.meta, &self.options.meta_path)
                    && let Err(e) = meta.write_csv(path)
                {
                    warn!(error = %e, "Failed to write metadata CSV");
                }
                output.papers
            }
            Err(e) => {
                warn!(error = %e, "Paper source failed, treating as no papers");
                report.source_error = Some(e.to_string());
                Vec::new()
            }
        };
        report.fetched = papers.len();

        let mut entries = filter_papers(&papers, &self.options.keywords);
        info!(count = entries.len(), "Papers after filtering");

        if self.options.smoke_test {
            entries.truncate(SMOKE_TEST_LIMIT);
            info!(limit = SMOKE_TEST_LIMIT, "Smoke test mode on");
        }
        report.filtered = entries.len();

        let content = if entries.is_empty() {
            info!("No papers matched, sending placeholder");
            NO_PAPERS_MESSAGE.to_string()
        } else {
            let unique = deduplicate(entries);
            report.unique = unique.len();
            info!(count = unique.len(), "Papers after deduplication");

            let summaries = self
                .summarizer
                .summarize(&unique, self.progress.as_ref())
                .await;
            report.summarized = summaries.len();
            format_digest(&summaries)
        };

        match self.notifier.deliver(&content).await {
            Ok(()) => {
                info!(notifier = self.notifier.name(), "Digest delivered");
                report.delivered = true;
            }
            Err(e) => {
                error!(notifier = self.notifier.name(), error = %e, "Digest delivery failed");
            }
        }

        report
    }
}
