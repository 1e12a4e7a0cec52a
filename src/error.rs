// src/error.rs

//! Unified error handling for the extractor.
//!
//! Two layers exist:
//! - [`StageError`]: what a single extraction stage can fail with.
//! - [`AppError`]: everything else (config, CSV, I/O), plus stage errors
//!   that are not recoverable by falling back to the next stage.

use std::fmt;

use thiserror::Error;

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or used
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stage failed in a way that falling back cannot fix
    #[error("Stage '{stage}' failed fatally: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: StageError,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a fatal stage error with the stage that raised it.
    pub fn stage(stage: &'static str, source: StageError) -> Self {
        Self::Stage { stage, source }
    }
}

/// Failure of a single extraction stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// Transport failure: DNS, connect, timeout, body read
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// The page could not be parsed into an article
    #[error("parse failure: {0}")]
    Parse(String),

    /// The LLM answered with something unusable
    #[error("provider response error: {0}")]
    Provider(String),

    /// The stage is misconfigured (rejected key, invalid built-in selector)
    #[error("stage misconfigured: {0}")]
    Config(String),
}

impl StageError {
    /// Create a parse failure.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create a provider response failure.
    pub fn provider(message: impl fmt::Display) -> Self {
        Self::Provider(message.to_string())
    }

    /// Whether the pipeline may fall back to the next stage.
    ///
    /// Misconfiguration is never recoverable: every later URL would hit it too.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
