//! Hugging Face Inference API summarizer (defaults to `facebook/bart-large-cnn`).

use super::{SummaryParams, Summarizer};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct HfInferenceSummarizer {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HfInferenceSummarizer {
    pub fn new(api_base: &str, model: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", api_base.trim_end_matches('/'), model),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: &'a SummaryParams,
}

#[derive(Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

#[async_trait::async_trait]
impl Summarizer for HfInferenceSummarizer {
    fn name(&self) -> &str {
        "hf_inference"
    }

    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String> {
        debug!("Sending summarization request to {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&SummarizationRequest {
            inputs: text,
            parameters: params,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to Hugging Face")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Hugging Face API error ({}): {}", status, error_text);
        }

        let raw = response.text().await?;
        parse_summary(&raw)
    }
}

/// Pull the first `summary_text` out of the pipeline response.
fn parse_summary(raw: &str) -> Result<String> {
    let outputs: Vec<SummarizationOutput> = serde_json::from_str(raw).context(format!(
        "Unexpected summarization response: {}",
        raw.chars().take(200).collect::<String>()
    ))?;

    outputs
        .into_iter()
        .next()
        .map(|o| o.summary_text.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("Summarization response was empty"))
}
