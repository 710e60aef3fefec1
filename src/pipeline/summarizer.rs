//! Per-paper summarization.
//!
//! Each paper gets one completion call. A failed call never aborts the
//! batch: the raw error body (or the transport error text) stands in for
//! the summary, and the detail footer is appended as usual.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{Completion, CompletionClient, strip_reasoning};
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::types::{SummaryBlock, UniquePaper};

/// Instruction header sent ahead of each paper block. Asks for the title
/// translated to Chinese, a TL;DR, and a translated abstract, in a fixed
/// `<b>`-labelled layout.
pub const SUMMARY_PROMPT: &str = "请你根据下面的论文信息，将文章的标题都翻译成中文，并且写一段简要的话概括一下文章内容。\
请你按照下面格式输出文章的处理结果，并且不要输出其他任何多余的文字。\n\
[格式]\n\
<b>Title:</b> 原英文标题<br>\n\
<b>标题:</b> 翻译后的中文标题<br>\n\
<b>TL;DR:</b> 你的总结<br>\n\
<b>摘要:</b> 翻译后的中文摘要<br>\n\
[论文]\n";

/// Render one paper as the prompt's paper block.
pub fn format_paper_block(paper: &UniquePaper) -> String {
    format!(
        "{}\n-URL: {}\n-Authors: {}\n-Abstract: {}\n\n",
        paper.title,
        paper.url,
        paper.authors.join(", "),
        paper.abstract_text
    )
}

/// Full prompt for one paper.
pub fn build_prompt(paper: &UniquePaper) -> String {
    format!("{SUMMARY_PROMPT}{}", format_paper_block(paper))
}

/// Replace the first literal, case-sensitive occurrence of `from`.
pub fn replace_first_literal(haystack: &str, from: &str, to: &str) -> String {
    haystack.replacen(from, to, 1)
}

/// alphaXiv mirror of an arXiv URL.
pub fn mirror_url(url: &str) -> String {
    replace_first_literal(url, "arxiv", "alphaxiv")
}

/// Combine raw completion text with the fixed detail footer.
pub fn render_summary(raw_completion: &str, paper: &UniquePaper) -> SummaryBlock {
    let summary = strip_reasoning(raw_completion);
    SummaryBlock::new(format!(
        "{summary}<br>\n\
         <b>Abstract:</b> {}<br>\n\
         <b>URL:</b> {}<br>\n\
         <b>AlphaXiv:</b> {}<br>\n",
        paper.abstract_text,
        paper.url,
        mirror_url(&paper.url),
    ))
}

/// Summarizes papers one at a time through a completion client.
pub struct Summarizer {
    llm: Arc<dyn CompletionClient>,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn CompletionClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Summarize every paper sequentially, in input order.
    pub async fn summarize(
        &self,
        papers: &[UniquePaper],
        progress: &dyn ProgressReporter,
    ) -> Vec<SummaryBlock> {
        let total = papers.len();
        progress.started(total);

        let mut summaries = Vec::with_capacity(total);
        for (index, paper) in papers.iter().enumerate() {
            let raw = self.complete_one(paper).await;
            summaries.push(render_summary(&raw, paper));
            progress.advanced(index, total, &paper.title);
        }

        progress.finished(total);
        summaries
    }

    async fn complete_one(&self, paper: &UniquePaper) -> String {
        let prompt = build_prompt(paper);
        match self.llm.complete(&prompt, self.max_tokens).await {
            Ok(Completion::Generated(text)) => {
                debug!(url = %paper.url, chars = text.len(), "Summary generated");
                text
            }
            Ok(Completion::Rejected { status, body }) => {
                warn!(
                    url = %paper.url,
                    status,
                    "Completion rejected, using response body as summary"
                );
                body
            }
            Err(e) => {
                warn!(
                    url = %paper.url,
                    error = %e,
                    "Completion failed, using error text as summary"
                );
                e.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;

    fn paper(url: &str) -> UniquePaper {
        UniquePaper {
            title: "Scaling Agents".into(),
            url: url.into(),
            authors: vec!["Jane Doe".into(), "John Roe".into()],
            abstract_text: "We scale <b>agent</b> systems.".into(),
            keyword: "agent".into(),
        }
    }

    /// Mock LLM that replays scripted outcomes and records prompts.
    struct ScriptedLlm {
        outcomes: Mutex<Vec<Result<Completion, LlmError>>>,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedLlm {
        fn new(outcomes: Vec<Result<Completion, LlmError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn started(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn advanced(&self, index: usize, total: usize, _label: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}/{total}", index + 1));
        }
        fn finished(&self, total: usize) {
            self.events.lock().unwrap().push(format!("finish {total}"));
        }
    }

    #[test]
    fn paper_block_layout() {
        assert_eq!(
            format_paper_block(&paper("https://arxiv.org/abs/1234")),
            "Scaling Agents\n-URL: https://arxiv.org/abs/1234\n-Authors: Jane Doe, John Roe\n-Abstract: We scale <b>agent</b> systems.\n\n"
        );
    }

    #[test]
    fn prompt_is_header_then_block() {
        let prompt = build_prompt(&paper("https://arxiv.org/abs/1234"));
        assert!(prompt.starts_with(SUMMARY_PROMPT));
        assert!(prompt.ends_with("-Abstract: We scale <b>agent</b> systems.\n\n"));
        assert!(SUMMARY_PROMPT.ends_with("[论文]\n"));
    }

    #[test]
    fn mirror_url_replaces_lowercase_host() {
        assert_eq!(
            replace_first_literal("https://arxiv.org/abs/1234", "arxiv", "alphaxiv"),
            "https://alphaxiv.org/abs/1234"
        );
        assert_eq!(mirror_url("https://arxiv.org/abs/1234"), "https://alphaxiv.org/abs/1234");
    }

    #[test]
    fn mirror_url_is_case_sensitive() {
        assert_eq!(mirror_url("https://ArXiv.org/abs/1"), "https://ArXiv.org/abs/1");
        assert_eq!(mirror_url("https://ALPHAXIV.org/abs/1"), "https://ALPHAXIV.org/abs/1");
    }

    #[test]
    fn render_summary_strips_reasoning_and_appends_footer() {
        let block = render_summary(
            "<think>let me see\nok</think>\n<b>Title:</b> Scaling Agents<br>\n",
            &paper("https://arxiv.org/abs/1234"),
        );
        assert_eq!(
            block.rendered_text,
            "<b>Title:</b> Scaling Agents<br><br>\n\
             <b>Abstract:</b> We scale <b>agent</b> systems.<br>\n\
             <b>URL:</b> https://arxiv.org/abs/1234<br>\n\
             <b>AlphaXiv:</b> https://alphaxiv.org/abs/1234<br>\n"
        );
    }

    #[tokio::test]
    async fn summarize_absorbs_failures_per_item() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(Completion::Generated("<think>x</think>first".into())),
            Ok(Completion::Rejected {
                status: 500,
                body: "upstream exploded".into(),
            }),
            Err(LlmError::RequestFailed {
                provider: "scripted".into(),
                reason: "connection refused".into(),
            }),
        ]));
        let summarizer = Summarizer::new(llm.clone(), 1024);
        let progress = RecordingProgress::default();

        let papers = vec![
            paper("https://arxiv.org/abs/1"),
            paper("https://arxiv.org/abs/2"),
            paper("https://arxiv.org/abs/3"),
        ];
        let summaries = summarizer.summarize(&papers, &progress).await;

        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].rendered_text.starts_with("first<br>\n"));
        assert!(summaries[1].rendered_text.starts_with("upstream exploded<br>\n"));
        assert!(summaries[2].rendered_text.contains("connection refused"));
        assert!(
            summaries[2]
                .rendered_text
                .ends_with("<b>AlphaXiv:</b> https://alphaxiv.org/abs/3<br>\n")
        );

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|(_, max)| *max == 1024));
        assert!(prompts[1].0.contains("-URL: https://arxiv.org/abs/2\n"));

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec!["start 3", "1/3", "2/3", "3/3", "finish 3"]
        );
    }
}
