// src/pipeline/extract.rs

//! Three-stage fallback extraction for a single URL.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, ExtractionResult};
use crate::providers::LlmProvider;
use crate::services::{Extractor, LlmExtractor, NewsExtractor, ReadabilityExtractor};
use crate::utils::{date, http};

/// Where the pipeline is for the current URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TryNews,
    TryReadability,
    TryLlm,
    Done,
}

impl State {
    fn next(self) -> Self {
        match self {
            Self::TryNews => Self::TryReadability,
            Self::TryReadability => Self::TryLlm,
            Self::TryLlm | Self::Done => Self::Done,
        }
    }
}

/// Runs the news, readability and LLM stages in order until one of them
/// returns enough text.
pub struct ExtractionPipeline {
    news: Box<dyn Extractor>,
    readability: Box<dyn Extractor>,
    llm: Box<dyn Extractor>,
    min_text_length: usize,
}

impl ExtractionPipeline {
    /// Assemble a pipeline from explicit stages.
    pub fn new(
        news: Box<dyn Extractor>,
        readability: Box<dyn Extractor>,
        llm: Box<dyn Extractor>,
        min_text_length: usize,
    ) -> Self {
        Self {
            news,
            readability,
            llm,
            min_text_length,
        }
    }

    /// Build the standard stages from configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        Ok(Self::new(
            Box::new(NewsExtractor::new(client.clone())),
            Box::new(ReadabilityExtractor::new(client.clone())),
            Box::new(LlmExtractor::new(
                client,
                provider,
                config.extraction.max_html_chars,
            )),
            config.extraction.min_text_length,
        ))
    }

    pub fn min_text_length(&self) -> usize {
        self.min_text_length
    }

    fn stage_for(&self, state: State) -> Option<&dyn Extractor> {
        match state {
            State::TryNews => Some(self.news.as_ref()),
            State::TryReadability => Some(self.readability.as_ref()),
            State::TryLlm => Some(self.llm.as_ref()),
            State::Done => None,
        }
    }

    /// Extract article text and publication date from `url`.
    ///
    /// Recoverable stage failures are collected into the error message of
    /// the returned result. A stage error that is not recoverable is
    /// returned as `Err` without trying later stages.
    pub async fn extract_from_url(&self, url: &str, id_value: &str) -> Result<ExtractionResult> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(ExtractionResult::error(id_value, url, "Empty or invalid URL"));
        }

        log::info!("Starting extraction for {} (id {})", url, id_value);

        let mut failures: Vec<String> = Vec::new();
        let mut state = State::TryNews;

        while let Some(stage) = self.stage_for(state) {
            let method = stage.method();

            match stage.try_extract(url).await {
                Ok(outcome) => {
                    let text_len = outcome.text_len();
                    if text_len >= self.min_text_length {
                        log::info!("Extraction successful for {} via {}", url, method);
                        let text = outcome.text.unwrap_or_default().trim().to_string();
                        let publication_date = date::normalize(outcome.raw_date.as_deref());
                        return Ok(ExtractionResult::success(
                            id_value,
                            url,
                            text,
                            publication_date,
                            method,
                        ));
                    }

                    log::debug!(
                        "Insufficient text from {} for {}: {} chars",
                        method,
                        url,
                        text_len
                    );
                    failures.push(format!(
                        "{method}: insufficient text ({text_len} < {} chars)",
                        self.min_text_length
                    ));
                }
                Err(error) if error.is_recoverable() => {
                    log::debug!("{} extraction failed for {}: {}", method, url, error);
                    failures.push(format!("{method}: {error}"));
                }
                Err(error) => {
                    log::error!("{} extraction aborted for {}: {}", method, url, error);
                    return Err(AppError::stage(method.as_str(), error));
                }
            }

            state = state.next();
        }

        log::error!("All extraction methods failed for {} (id {})", url, id_value);
        Ok(ExtractionResult::error(
            id_value,
            url,
            format!("All extraction methods failed: {}", failures.join("; ")),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::StageError;
    use crate::models::{ExtractionMethod, ExtractionStatus, StageOutcome};

    type Reply = fn(&str) -> std::result::Result<StageOutcome, StageError>;

    /// Stage whose behaviour is a plain function of the URL.
    pub(crate) struct ScriptedStage {
        method: ExtractionMethod,
        reply: Reply,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedStage {
        pub(crate) fn boxed(
            method: ExtractionMethod,
            reply: Reply,
        ) -> (Box<dyn Extractor>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stage = Self {
                method,
                reply,
                calls: Arc::clone(&calls),
            };
            (Box::new(stage), calls)
        }
    }

    #[async_trait]
    impl Extractor for ScriptedStage {
        fn method(&self) -> ExtractionMethod {
            self.method
        }

        async fn try_extract(&self, url: &str) -> std::result::Result<StageOutcome, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)(url)
        }
    }

    pub(crate) fn text_of(len: usize) -> String {
        "x".repeat(len)
    }

    fn long_text(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Ok(StageOutcome::new(Some(text_of(150)), Some("2024/02/01".into())))
    }

    fn short_text(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Ok(StageOutcome::new(Some(text_of(99)), Some("2024-01-01".into())))
    }

    fn nothing(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Ok(StageOutcome::empty())
    }

    fn parse_failure(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Err(StageError::parse("no article paragraphs found"))
    }

    fn provider_failure(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Err(StageError::provider("response is not valid JSON"))
    }

    fn misconfigured(_: &str) -> std::result::Result<StageOutcome, StageError> {
        Err(StageError::Config("Gemini rejected the API key (403 Forbidden)".into()))
    }

    struct Harness {
        pipeline: ExtractionPipeline,
        calls: [Arc<AtomicUsize>; 3],
    }

    fn harness(a: Reply, b: Reply, c: Reply) -> Harness {
        let (news, news_calls) = ScriptedStage::boxed(ExtractionMethod::News, a);
        let (readability, readability_calls) =
            ScriptedStage::boxed(ExtractionMethod::Readability, b);
        let (llm, llm_calls) = ScriptedStage::boxed(ExtractionMethod::Llm, c);
        Harness {
            pipeline: ExtractionPipeline::new(news, readability, llm, 100),
            calls: [news_calls, readability_calls, llm_calls],
        }
    }

    impl Harness {
        fn call_counts(&self) -> [usize; 3] {
            [
                self.calls[0].load(Ordering::SeqCst),
                self.calls[1].load(Ordering::SeqCst),
                self.calls[2].load(Ordering::SeqCst),
            ]
        }
    }

    #[tokio::test]
    async fn test_first_stage_wins_and_stops() {
        let h = harness(long_text, long_text, long_text);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap();

        assert_eq!(result.status(), ExtractionStatus::Success);
        assert_eq!(result.extraction_method(), ExtractionMethod::News);
        assert_eq!(result.publication_date(), Some("2024-02-01"));
        assert_eq!(result.error_message(), None);
        assert_eq!(h.call_counts(), [1, 0, 0]);
    }

    #[tokio::test]
    async fn test_short_text_falls_through_to_second_stage() {
        let h = harness(short_text, long_text, long_text);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap();

        assert_eq!(result.extraction_method(), ExtractionMethod::Readability);
        assert_eq!(h.call_counts(), [1, 1, 0]);

        let h = harness(nothing, long_text, long_text);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap();
        assert_eq!(result.extraction_method(), ExtractionMethod::Readability);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        fn exactly_100(_: &str) -> std::result::Result<StageOutcome, StageError> {
            Ok(StageOutcome::new(Some(text_of(100)), None))
        }
        let h = harness(exactly_100, long_text, long_text);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap();
        assert_eq!(result.extraction_method(), ExtractionMethod::News);
        assert_eq!(result.publication_date(), None);
    }

    #[tokio::test]
    async fn test_llm_is_last_resort() {
        let h = harness(parse_failure, short_text, long_text);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap();
        assert_eq!(result.extraction_method(), ExtractionMethod::Llm);
        assert_eq!(h.call_counts(), [1, 1, 1]);
    }

    #[tokio::test]
    async fn test_all_stages_fail() {
        let h = harness(parse_failure, short_text, provider_failure);
        let result = h
            .pipeline
            .extract_from_url("https://example.com/a", "7")
            .await
            .unwrap();

        assert_eq!(result.status(), ExtractionStatus::Error);
        assert_eq!(result.extraction_method(), ExtractionMethod::None);
        assert_eq!(result.extracted_text(), "");
        assert_eq!(result.publication_date(), None);
        assert_eq!(result.id_value(), "7");

        let message = result.error_message().unwrap();
        assert!(message.contains("news: parse failure"));
        assert!(message.contains("readability: insufficient text (99 < 100 chars)"));
        assert!(message.contains("llm: provider response error"));
    }

    #[tokio::test]
    async fn test_fatal_stage_error_propagates() {
        let h = harness(nothing, nothing, misconfigured);
        let err = h
            .pipeline
            .extract_from_url("https://example.com/a", "1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Stage { stage: "llm", .. }));
    }

    #[tokio::test]
    async fn test_blank_url_skips_all_stages() {
        let h = harness(long_text, long_text, long_text);
        let result = h.pipeline.extract_from_url("   ", "3").await.unwrap();
        assert_eq!(result.status(), ExtractionStatus::Error);
        assert_eq!(result.error_message(), Some("Empty or invalid URL"));
        assert_eq!(h.call_counts(), [0, 0, 0]);
    }

    #[tokio::test]
    async fn test_network_error_then_readability_succeeds() {
        // Nothing listens on port 1, so the real news stage fails at connect.
        let client = http::create_client(&Config::default().http).unwrap();
        let (readability, _) = ScriptedStage::boxed(ExtractionMethod::Readability, long_text);
        let (llm, llm_calls) = ScriptedStage::boxed(ExtractionMethod::Llm, long_text);
        let pipeline = ExtractionPipeline::new(
            Box::new(NewsExtractor::new(client)),
            readability,
            llm,
            100,
        );

        let result = pipeline
            .extract_from_url("http://127.0.0.1:1/article", "9")
            .await
            .unwrap();

        assert_eq!(result.status(), ExtractionStatus::Success);
        assert_eq!(result.extraction_method(), ExtractionMethod::Readability);
        assert_eq!(result.publication_date(), Some("2024-02-01"));
        assert_eq!(result.extracted_text().chars().count(), 150);
        assert_eq!(llm_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_state_sequence() {
        assert_eq!(State::TryNews.next(), State::TryReadability);
        assert_eq!(State::TryReadability.next(), State::TryLlm);
        assert_eq!(State::TryLlm.next(), State::Done);
        assert_eq!(State::Done.next(), State::Done);
    }
}
