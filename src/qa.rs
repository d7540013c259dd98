//! Free-form question answering over document chunks.

use crate::agent::{LlmClient, LlmResult, Transport};
use crate::chunker::Chunk;
use crate::summary::{consolidate, labelled_sections};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const NO_CONTENT: &str = "No document content available to answer from.";
pub const NO_RELEVANT: &str = "No relevant information found in the document.";

/// Answers shorter than this (after trimming) are treated as non-answers.
const MIN_ANSWER_CHARS: usize = 20;
const NON_ANSWER_MARKERS: [&str; 2] = ["not found", "not mentioned"];

const MERGE_PROMPT: &str = "\
The following answers to the same question were drawn from different sections of one bid document. \
Combine them into a single concise answer. Remove duplicates and keep every distinct fact.";

/// Result of asking a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Found(String),
    /// There were no chunks to ask
    NoContent,
    /// No chunk produced a relevant answer
    NoRelevant,
}

impl Answer {
    pub fn is_found(&self) -> bool {
        matches!(self, Answer::Found(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Answer::Found(text) => text,
            Answer::NoContent => NO_CONTENT,
            Answer::NoRelevant => NO_RELEVANT,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Answer::Found(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a per-chunk result carries an actual answer.
///
/// Heuristic: short replies and replies mentioning "not found" or
/// "not mentioned" are dropped, even when they are legitimate answers.
pub fn is_relevant(result: &LlmResult) -> bool {
    let Ok(text) = result else {
        return false;
    };
    let lower = text.to_lowercase();
    if NON_ANSWER_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return false;
    }
    text.trim().chars().count() > MIN_ANSWER_CHARS
}

/// Runs a question over every chunk and merges the relevant answers.
pub struct QuestionAnswerer<'a, T> {
    client: &'a LlmClient<T>,
    pacing: Duration,
    max_retries: u32,
}

impl<'a, T: Transport> QuestionAnswerer<'a, T> {
    pub fn new(client: &'a LlmClient<T>, pacing: Duration, max_retries: u32) -> Self {
        Self {
            client,
            pacing,
            max_retries,
        }
    }

    pub async fn answer(&self, question: &str, chunks: &[Chunk]) -> Answer {
        if chunks.is_empty() {
            return Answer::NoContent;
        }

        let mut relevant = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            let result = self
                .client
                .complete(question, &chunk.text, self.max_retries)
                .await;
            if is_relevant(&result) {
                relevant.extend(result.ok());
            } else {
                debug!(chunk = chunk.index, "discarding non-answer");
            }
        }

        info!(
            relevant = relevant.len(),
            total = chunks.len(),
            "chunk answers collected"
        );

        match relevant.len() {
            0 => Answer::NoRelevant,
            1 => Answer::Found(relevant.swap_remove(0)),
            _ => {
                let prompt = format!(
                    "{}\n\nQuestion: {}\n\n{}",
                    MERGE_PROMPT,
                    question,
                    labelled_sections(&relevant, "Answer")
                );
                Answer::Found(consolidate(self.client, &prompt, relevant, self.max_retries).await)
            }
        }
    }
}
