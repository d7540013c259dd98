//! # Bid Analyser
//!
//! Interactive analysis of bid and tender documents using LLMs.
//!
//! ## Features
//!
//! - **Key Information Extraction**: tender number, contract value, EMD, deadlines and
//!   eligibility pulled from every part of the document and merged into one summary
//! - **Document Q&A**: free-form questions answered chunk by chunk, with non-answers filtered out
//! - **Resilient Calls**: bounded retries with rate-limit backoff; one failing chunk never
//!   aborts the rest

pub mod agent;
pub mod chunker;
pub mod config;
pub mod document;
pub mod export;
pub mod qa;
pub mod retry;
pub mod session;
pub mod summary;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{LlmClient, LlmError, LlmResult};
pub use chunker::{Chunk, ChunkSplitter};
pub use config::Config;
pub use document::Document;
pub use qa::{Answer, QuestionAnswerer};
pub use session::Session;
pub use summary::SummaryAggregator;
