//! Extraction stages.
//!
//! Each stage turns a URL into a [`StageOutcome`]:
//! - News markup heuristics (`NewsExtractor`)
//! - Readability algorithm (`ReadabilityExtractor`)
//! - LLM fallback (`LlmExtractor`)

mod llm;
mod news;
mod readability;

use async_trait::async_trait;
use scraper::Selector;

use crate::error::StageError;
use crate::models::{ExtractionMethod, StageOutcome};

pub use llm::{LlmExtractor, build_prompt, parse_response};
pub use news::NewsExtractor;
pub use readability::ReadabilityExtractor;

/// A single fallback extraction attempt.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Identifier recorded in results produced by this stage.
    fn method(&self) -> ExtractionMethod;

    /// Fetch `url` and return whatever text and raw date the stage finds.
    ///
    /// Whether the text is long enough is decided by the pipeline, not here.
    async fn try_extract(&self, url: &str) -> Result<StageOutcome, StageError>;
}

/// Parse a built-in selector.
///
/// A bad selector is a bug in the stage, not a property of the page, so it is
/// reported as non-recoverable.
pub(crate) fn parse_selector(s: &str) -> Result<Selector, StageError> {
    Selector::parse(s).map_err(|e| StageError::Config(format!("invalid selector '{s}': {e:?}")))
}
