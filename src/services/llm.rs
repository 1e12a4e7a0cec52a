// src/services/llm.rs

//! LLM fallback extractor.
//!
//! Sends (a prefix of) the raw page HTML to an [`LlmProvider`] and asks for
//! a JSON object with `text` and `date`. Last stage in the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::Extractor;
use crate::error::StageError;
use crate::models::{ExtractionMethod, StageOutcome};
use crate::providers::LlmProvider;
use crate::utils::{http, truncate_chars};

/// Build the extraction prompt around `html`.
pub fn build_prompt(html: &str) -> String {
    format!(
        r#"Extract the main article text and publication date from this HTML content.
Return a JSON object with two fields:
- "text": The main article text (not HTML, just the readable text)
- "date": The publication date in any format you can find (or null if not found)

HTML content:
{html}

Return only valid JSON, no additional text."#
    )
}

/// Parse a model reply into an outcome.
///
/// Markdown code fences around the JSON are tolerated. A reply that is not
/// a JSON object or lacks a string `text` field is a provider error.
pub fn parse_response(response: &str) -> Result<StageOutcome, StageError> {
    let body = strip_code_fence(response);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| StageError::provider(format!("response is not valid JSON: {e}")))?;

    let text = value
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| StageError::provider("response has no string 'text' field"))?
        .trim()
        .to_string();

    let raw_date = value
        .get("date")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .map(str::to_string);

    Ok(StageOutcome::new((!text.is_empty()).then_some(text), raw_date))
}

fn strip_code_fence(response: &str) -> &str {
    let mut body = response.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Stage C: LLM-backed extraction.
pub struct LlmExtractor {
    client: Client,
    provider: Arc<dyn LlmProvider>,
    max_html_chars: usize,
}

impl LlmExtractor {
    pub fn new(client: Client, provider: Arc<dyn LlmProvider>, max_html_chars: usize) -> Self {
        Self {
            client,
            provider,
            max_html_chars,
        }
    }

    /// Query the provider with an already fetched page.
    pub async fn extract_from_html(&self, html: &str) -> Result<StageOutcome, StageError> {
        let prompt = build_prompt(truncate_chars(html, self.max_html_chars));
        log::debug!(
            "Querying {} with a {} character prompt",
            self.provider.model_name(),
            prompt.chars().count()
        );

        let response = self.provider.query(&prompt).await?;
        parse_response(&response)
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Llm
    }

    async fn try_extract(&self, url: &str) -> Result<StageOutcome, StageError> {
        let html = http::fetch_html(&self.client, url).await?;
        self.extract_from_html(&html).await
    }
}
