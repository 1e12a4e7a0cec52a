// src/services/readability.rs

//! Generic extractor built on the Readability algorithm.
//!
//! Scores the whole DOM instead of relying on known containers, so it copes
//! with layouts the news heuristics do not recognize.

use async_trait::async_trait;
use dom_smoothie::{Config, Readability};
use reqwest::Client;

use super::Extractor;
use crate::error::StageError;
use crate::models::{ExtractionMethod, StageOutcome};
use crate::utils::http;

const MAX_ELEMENTS_TO_PARSE: usize = 9000;

/// Stage B: Readability-based extraction.
pub struct ReadabilityExtractor {
    client: Client,
}

impl ReadabilityExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Run Readability over an already fetched page.
    ///
    /// `url` is used to resolve relative links inside the document.
    pub fn extract_from_html(html: &str, url: Option<&str>) -> Result<StageOutcome, StageError> {
        let cfg = Config {
            max_elements_to_parse: MAX_ELEMENTS_TO_PARSE,
            ..Default::default()
        };

        let mut readability = Readability::new(html, url, Some(cfg)).map_err(StageError::parse)?;
        let article = readability.parse().map_err(StageError::parse)?;

        let text = article
            .text_content
            .to_string()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let raw_date = article
            .published_time
            .map(|date| date.to_string())
            .filter(|date| !date.trim().is_empty());

        Ok(StageOutcome::new((!text.is_empty()).then_some(text), raw_date))
    }
}

#[async_trait]
impl Extractor for ReadabilityExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Readability
    }

    async fn try_extract(&self, url: &str) -> Result<StageOutcome, StageError> {
        let html = http::fetch_html(&self.client, url).await?;
        Self::extract_from_html(&html, Some(url))
    }
}
