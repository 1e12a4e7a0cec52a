//! Pipeline entry points.
//!
//! - `ExtractionPipeline`: news → readability → LLM fallback for one URL
//! - `run_extraction`: drive the pipeline over every URL cell of a CSV

mod batch;
mod extract;

pub use batch::{BatchSummary, run_extraction};
pub use extract::ExtractionPipeline;
