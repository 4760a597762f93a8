//! Abstractive summarization backends.
//!
//! [`Summarizer`] hides which inference service produces the summary.
//! [`summarize_document`] wraps it with the input truncation and the
//! user-facing fallback messages.

pub mod hf;
pub mod openrouter;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

pub use hf::HfInferenceSummarizer;
pub use openrouter::OpenRouterSummarizer;

/// Longest input (in characters) sent to the model.
pub const MAX_INPUT_CHARS: usize = 1000;

pub const NO_TEXT_MESSAGE: &str = "⚠️ No readable text found.";
pub const FAILED_MESSAGE: &str = "⚠️ Could not generate summary.";

/// Generation parameters, in model tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 120,
            min_length: 30,
            do_sample: false,
        }
    }
}

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String>;
}

/// Summarize extracted document text, never failing.
///
/// Empty text skips the model entirely; model errors are logged and turned
/// into [`FAILED_MESSAGE`].
pub async fn summarize_document(summarizer: &dyn Summarizer, text: &str) -> String {
    if text.is_empty() {
        return NO_TEXT_MESSAGE.to_string();
    }

    let input = truncate_chars(text, MAX_INPUT_CHARS);
    match summarizer.summarize(input, &SummaryParams::default()).await {
        Ok(summary) => {
            info!(
                "Summary from {}: {} chars (input {} chars)",
                summarizer.name(),
                summary.len(),
                input.chars().count()
            );
            summary
        }
        Err(e) => {
            warn!("Summarizer {} failed: {:#}", summarizer.name(), e);
            FAILED_MESSAGE.to_string()
        }
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
