//! Structured summary extraction across document chunks.
//!
//! Each chunk is summarised on its own, then the partial summaries are merged
//! by one further consolidation call.

use crate::agent::{LlmClient, Transport};
use crate::chunker::Chunk;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const NO_CONTENT: &str = "No content available to summarize.";
pub const UNABLE_TO_SUMMARIZE: &str =
    "Unable to generate a summary: every section of the document failed to process.";

const EXTRACTION_PROMPT: &str = "\
Analyze this bid document and provide the following information in a structured format:
1. **Tender Number:**
2. **Name of Work:**
3. **Department/Organization:**
4. **Estimated Contract Value:**
5. **Contract Period:**
6. **EMD (Earnest Money Deposit):**
7. **EMD Exemption:**
8. **Mode of Payment:**
9. **Key Eligibility Criteria:**
10. **Important Deadlines:**

Return only relevant information found in this chunk.";

const CONSOLIDATION_PROMPT: &str = "\
The following partial summaries were extracted from different sections of the same bid document. \
Merge them into one final summary using the same numbered structure. Remove duplicates, \
prefer specific values over vague ones, and write \"Not specified\" for fields none of the sections mention.";

/// Runs the extraction prompt over every chunk and merges the results.
pub struct SummaryAggregator<'a, T> {
    client: &'a LlmClient<T>,
    pacing: Duration,
    max_retries: u32,
}

impl<'a, T: Transport> SummaryAggregator<'a, T> {
    pub fn new(client: &'a LlmClient<T>, pacing: Duration, max_retries: u32) -> Self {
        Self {
            client,
            pacing,
            max_retries,
        }
    }

    pub async fn summarize(&self, chunks: &[Chunk]) -> String {
        if chunks.is_empty() {
            return NO_CONTENT.to_string();
        }

        let mut partials = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            let context = format!("Chunk {}:\n{}", chunk.index + 1, chunk.text);
            match self
                .client
                .complete(EXTRACTION_PROMPT, &context, self.max_retries)
                .await
            {
                Ok(text) => partials.push(text),
                Err(e) => warn!(chunk = chunk.index, kind = %e.kind(), "skipping chunk: {}", e),
            }
        }

        info!(
            succeeded = partials.len(),
            total = chunks.len(),
            "chunk summaries collected"
        );

        if partials.is_empty() {
            return UNABLE_TO_SUMMARIZE.to_string();
        }

        let prompt = format!(
            "{}\n\n{}",
            CONSOLIDATION_PROMPT,
            labelled_sections(&partials, "Section")
        );
        consolidate(self.client, &prompt, partials, self.max_retries).await
    }
}

/// Join partial results under numbered labels for a consolidation prompt.
pub(crate) fn labelled_sections(parts: &[String], label: &str) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| format!("--- {} {} ---\n{}", label, i + 1, part.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Issue a consolidation call, falling back to the first partial on failure.
pub(crate) async fn consolidate<T: Transport>(
    client: &LlmClient<T>,
    prompt: &str,
    mut partials: Vec<String>,
    max_retries: u32,
) -> String {
    match client.complete_standalone(prompt, max_retries).await {
        Ok(merged) => {
            debug!(parts = partials.len(), "consolidated partial results");
            merged
        }
        Err(e) => {
            warn!(
                kind = "aggregation-degraded",
                cause = %e.kind(),
                "consolidation failed, using first partial result: {}",
                e
            );
            partials.swap_remove(0)
        }
    }
}
