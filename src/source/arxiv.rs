//! arXiv OAI-PMH harvester.
//!
//! Requests `ListRecords` in the `arXiv` metadata format for one subject set
//! and date window, following resumption tokens until the listing is
//! exhausted or the harvest budget runs out.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::header::RETRY_AFTER;
use tracing::{debug, info, instrument};

use crate::error::SourceError;
use crate::source::{FetchOutput, FetchRequest, MetaInfo, PaperRecord, PaperSource};

/// Default OAI-PMH endpoint.
pub const DEFAULT_OAI_URL: &str = "http://export.arxiv.org/oai2";

/// Per-page request timeout.
const PAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Overall harvest budget, checked between pages.
const HARVEST_BUDGET: Duration = Duration::from_secs(1000);

/// Metadata columns written to the CSV side channel.
pub const META_KEYS: [&str; 5] = ["id", "categories", "doi", "created", "updated"];

/// One `<arXiv>` metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArxivRecord {
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    /// Space-separated, e.g. `cs.CL cs.AI`.
    pub categories: String,
    pub doi: String,
    pub created: String,
    pub updated: String,
    pub authors: Vec<String>,
}

impl ArxivRecord {
    pub fn url(&self) -> String {
        format!("https://arxiv.org/abs/{}", self.id)
    }

    /// Whether any filter category occurs in this record's category list.
    pub fn matches_categories(&self, filter: &[String]) -> bool {
        if filter.is_empty() {
            return true;
        }
        let categories = self.categories.to_lowercase();
        filter
            .iter()
            .any(|c| categories.contains(&c.to_lowercase()))
    }

    fn meta_row(&self) -> [(&'static str, &str); 5] {
        [
            ("id", self.id.as_str()),
            ("categories", self.categories.as_str()),
            ("doi", self.doi.as_str()),
            ("created", self.created.as_str()),
            ("updated", self.updated.as_str()),
        ]
    }

    pub fn into_paper(self) -> PaperRecord {
        PaperRecord {
            url: self.url(),
            title: self.title,
            authors: self.authors,
            abstract_text: self.abstract_text,
        }
    }
}

/// One parsed `ListRecords` response page.
#[derive(Debug, Clone, Default)]
pub struct OaiPage {
    /// False when the response carried no `<ListRecords>` element.
    pub has_list_records: bool,
    pub records: Vec<ArxivRecord>,
    /// Non-empty resumption token, if more pages follow.
    pub resumption_token: Option<String>,
    /// OAI `<error>` code and message, if any.
    pub error: Option<String>,
}

/// Harvests arXiv listings over OAI-PMH.
pub struct ArxivOaiSource {
    http: reqwest::Client,
    base_url: String,
    budget: Duration,
}

impl ArxivOaiSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("arxiv-digest/", env!("CARGO_PKG_VERSION")))
            .timeout(PAGE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            budget: HARVEST_BUDGET,
        })
    }

    /// Override the overall harvest budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    async fn fetch_page(
        &self,
        request: &FetchRequest,
        token: Option<&str>,
    ) -> Result<String, SourceError> {
        let builder = self.http.get(&self.base_url);
        let builder = match token {
            Some(token) => {
                builder.query(&[("verb", "ListRecords"), ("resumptionToken", token)])
            }
            None => {
                let from = request.date_from.format("%Y-%m-%d").to_string();
                let until = request.date_until.format("%Y-%m-%d").to_string();
                builder.query(&[
                    ("verb", "ListRecords"),
                    ("from", from.as_str()),
                    ("until", until.as_str()),
                    ("metadataPrefix", "arXiv"),
                    ("set", request.subject.as_str()),
                ])
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(SourceError::Http {
                status: status.as_u16(),
                retry_after,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PaperSource for ArxivOaiSource {
    fn name(&self) -> &str {
        "arxiv-oai"
    }

    #[instrument(skip(self, request), fields(from = %request.date_from, until = %request.date_until))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutput, SourceError> {
        let started = Instant::now();
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let body = self.fetch_page(request, token.as_deref()).await?;
            let page = parse_list_records(&body)?;
            if !page.has_list_records {
                return Err(SourceError::NoRecords {
                    reason: page
                        .error
                        .unwrap_or_else(|| "response has no ListRecords element".to_string()),
                });
            }

            let total = page.records.len();
            records.extend(
                page.records
                    .into_iter()
                    .filter(|r| r.matches_categories(&request.categories)),
            );
            debug!(page = pages, total, kept = records.len(), "Harvested OAI page");

            match page.resumption_token {
                Some(next) => token = Some(next),
                None => break,
            }
            if started.elapsed() > self.budget {
                info!(
                    elapsed_secs = started.elapsed().as_secs(),
                    "Harvest budget exhausted, stopping early"
                );
                break;
            }
        }

        let meta = request.with_meta.then(|| {
            let mut meta = MetaInfo::with_keys(META_KEYS);
            for record in &records {
                meta.push_row(&record.meta_row());
            }
            meta
        });

        info!(
            pages,
            papers = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Harvest complete"
        );

        Ok(FetchOutput {
            papers: records.into_iter().map(ArxivRecord::into_paper).collect(),
            meta,
        })
    }
}

// ── XML parsing ─────────────────────────────────────────────────────

/// Which text field the parser is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Abstract,
    Categories,
    Doi,
    Created,
    Updated,
    Keyname,
    Forenames,
    Token,
    Error,
}

/// Parse one `ListRecords` response body.
pub fn parse_list_records(xml: &str) -> Result<OaiPage, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = OaiPage::default();
    let mut current: Option<ArxivRecord> = None;
    let mut in_metadata = false;
    let mut keyname = String::new();
    let mut forenames = String::new();
    let mut token = String::new();
    let mut error_code = String::new();
    let mut error_text = String::new();
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ListRecords" => page.has_list_records = true,
                b"metadata" => in_metadata = true,
                b"arXiv" if in_metadata => current = Some(ArxivRecord::default()),
                b"author" => {
                    keyname.clear();
                    forenames.clear();
                }
                b"resumptionToken" => field = Some(Field::Token),
                b"error" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"code" {
                            error_code = String::from_utf8_lossy(&attr.value).to_string();
                        }
                    }
                    field = Some(Field::Error);
                }
                name if current.is_some() => {
                    field = match name {
                        b"id" => Some(Field::Id),
                        b"title" => Some(Field::Title),
                        b"abstract" => Some(Field::Abstract),
                        b"categories" => Some(Field::Categories),
                        b"doi" => Some(Field::Doi),
                        b"created" => Some(Field::Created),
                        b"updated" => Some(Field::Updated),
                        b"keyname" => Some(Field::Keyname),
                        b"forenames" => Some(Field::Forenames),
                        _ => None,
                    };
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"ListRecords" => {
                page.has_list_records = true;
            }
            Event::Text(t) => {
                let Some(target) = field else { continue };
                let text = t.unescape()?;
                let slot = match target {
                    Field::Token => &mut token,
                    Field::Error => &mut error_text,
                    Field::Keyname => &mut keyname,
                    Field::Forenames => &mut forenames,
                    other => match current.as_mut() {
                        Some(record) => match other {
                            Field::Id => &mut record.id,
                            Field::Title => &mut record.title,
                            Field::Abstract => &mut record.abstract_text,
                            Field::Categories => &mut record.categories,
                            Field::Doi => &mut record.doi,
                            Field::Created => &mut record.created,
                            _ => &mut record.updated,
                        },
                        None => continue,
                    },
                };
                slot.push_str(&text);
            }
            Event::CData(t) => {
                if let (Some(Field::Abstract), Some(record)) = (field, current.as_mut()) {
                    record.abstract_text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"metadata" => in_metadata = false,
                b"author" => {
                    if let Some(record) = current.as_mut() {
                        let name = match (forenames.trim(), keyname.trim()) {
                            ("", key) => key.to_string(),
                            (fore, key) => format!("{fore} {key}"),
                        };
                        record.authors.push(collapse_whitespace(&name));
                    }
                }
                b"arXiv" => {
                    if let Some(mut record) = current.take() {
                        record.title = collapse_whitespace(&record.title);
                        record.abstract_text = collapse_whitespace(&record.abstract_text);
                        page.records.push(record);
                    }
                }
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let token = token.trim();
    if !token.is_empty() {
        page.resumption_token = Some(token.to_string());
    }
    if !error_code.is_empty() || !error_text.is_empty() {
        page.error = Some(format!("{error_code}: {}", error_text.trim()));
    }
    Ok(page)
}

/// Collapse runs of whitespace (including the hard line wraps arXiv keeps in
/// titles and abstracts) into single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
