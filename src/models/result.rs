//! Extraction outcome records.

use std::fmt;

use serde::Serialize;

/// Which stage produced the accepted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// News-markup heuristics (stage A)
    News,
    /// Readability algorithm (stage B)
    Readability,
    /// LLM fallback (stage C)
    Llm,
    /// Every stage failed
    None,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Readability => "readability",
            Self::Llm => "llm",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status of one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Success,
    Error,
}

/// Result of extracting one URL of one input row.
///
/// Fields are private: a result is built once by the pipeline and only read
/// afterwards. Field order matches the output CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    #[serde(rename = "id")]
    id_value: String,
    url: String,
    extracted_text: String,
    publication_date: Option<String>,
    extraction_method: ExtractionMethod,
    status: ExtractionStatus,
    error_message: Option<String>,
}

impl ExtractionResult {
    /// Build a successful result.
    pub fn success(
        id_value: impl Into<String>,
        url: impl Into<String>,
        extracted_text: impl Into<String>,
        publication_date: Option<String>,
        method: ExtractionMethod,
    ) -> Self {
        Self {
            id_value: id_value.into(),
            url: url.into(),
            extracted_text: extracted_text.into(),
            publication_date,
            extraction_method: method,
            status: ExtractionStatus::Success,
            error_message: None,
        }
    }

    /// Build a failed result. Text is empty and no date is reported.
    pub fn error(
        id_value: impl Into<String>,
        url: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            id_value: id_value.into(),
            url: url.into(),
            extracted_text: String::new(),
            publication_date: None,
            extraction_method: ExtractionMethod::None,
            status: ExtractionStatus::Error,
            error_message: Some(error_message.into()),
        }
    }

    pub fn id_value(&self) -> &str {
        &self.id_value
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.publication_date.as_deref()
    }

    pub fn extraction_method(&self) -> ExtractionMethod {
        self.extraction_method
    }

    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }
}

/// What a stage hands back to the pipeline. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub text: Option<String>,
    pub raw_date: Option<String>,
}

impl StageOutcome {
    pub fn new(text: Option<String>, raw_date: Option<String>) -> Self {
        Self { text, raw_date }
    }

    /// No text and no date.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Character count of the trimmed text, 0 when absent.
    pub fn text_len(&self) -> usize {
        self.text
            .as_deref()
            .map_or(0, |text| text.trim().chars().count())
    }
}
