// src/models/mod.rs

//! Domain models for the extractor.

mod config;
mod result;

pub use config::{Config, ExtractionConfig, HttpConfig, InputConfig, LlmConfig};
pub use result::{ExtractionMethod, ExtractionResult, ExtractionStatus, StageOutcome};
