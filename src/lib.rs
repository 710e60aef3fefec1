//! arxiv-digest: daily arXiv keyword digest, summarized by an LLM.

pub mod config;
pub mod error;
pub mod llm;
pub mod notify;
pub mod pipeline;
pub mod source;
