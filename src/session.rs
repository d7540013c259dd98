//! Per-session analysis state.
//!
//! A [`Session`] owns the loaded document, its chunks, the summary and the
//! question history. Loading a document replaces all of it.

use crate::agent::{LlmClient, Transport};
use crate::chunker::{Chunk, ChunkSplitter};
use crate::config::{Config, ConfigError};
use crate::document::{Document, DocumentStats};
use crate::qa::{Answer, QuestionAnswerer};
use crate::summary::SummaryAggregator;
use chrono::{DateTime, Local};
use std::time::Duration;

/// A document prepared for analysis.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Document,
    pub chunks: Vec<Chunk>,
    pub stats: DocumentStats,
    pub processed_at: DateTime<Local>,
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Append-only record of answered questions.
#[derive(Debug, Clone, Default)]
pub struct QaHistory {
    pairs: Vec<QaPair>,
}

impl QaHistory {
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.pairs.push(QaPair {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn all(&self) -> &[QaPair] {
        &self.pairs
    }

    /// The last `limit` pairs, oldest first, with their 1-based positions.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = (usize, &QaPair)> {
        let skip = self.pairs.len().saturating_sub(limit);
        self.pairs
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, pair)| (i + 1, pair))
    }
}

/// Pipeline settings shared by every call in a session.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub splitter: ChunkSplitter,
    pub pacing: Duration,
    pub max_retries: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            splitter: ChunkSplitter::new(config.chunking.chunk_size, config.chunking.overlap)?,
            pacing: config.pipeline.pacing(),
            max_retries: config.llm.max_retries,
        })
    }
}

#[derive(Debug, Default)]
pub struct Session {
    loaded: Option<LoadedDocument>,
    summary: Option<String>,
    history: QaHistory,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session contents with a freshly chunked document.
    pub fn load(&mut self, document: Document, splitter: &ChunkSplitter) -> &LoadedDocument {
        let chunks = splitter.split(&document.text);
        let stats = document.stats();
        tracing::info!(
            name = %document.name,
            chunks = chunks.len(),
            words = stats.words,
            "document loaded"
        );
        self.reset();
        self.loaded.insert(LoadedDocument {
            document,
            chunks,
            stats,
            processed_at: Local::now(),
        })
    }

    /// Discard the document, summary and history.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.summary = None;
        self.history = QaHistory::default();
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.loaded.as_ref()
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.chunks.as_slice())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn history(&self) -> &QaHistory {
        &self.history
    }

    /// Summarise the loaded document, caching the result for the session.
    pub async fn summarize<T: Transport>(
        &mut self,
        client: &LlmClient<T>,
        settings: &PipelineSettings,
    ) -> &str {
        let summary = SummaryAggregator::new(client, settings.pacing, settings.max_retries)
            .summarize(self.chunks())
            .await;
        self.summary.insert(summary)
    }

    /// Answer a question, recording it in the history when an answer was found.
    pub async fn ask<T: Transport>(
        &mut self,
        client: &LlmClient<T>,
        settings: &PipelineSettings,
        question: &str,
    ) -> Answer {
        let answer = QuestionAnswerer::new(client, settings.pacing, settings.max_retries)
            .answer(question, self.chunks())
            .await;
        if let Answer::Found(text) = &answer {
            self.history.push(question, text.clone());
        }
        answer
    }
}
