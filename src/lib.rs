// src/lib.rs

//! Article Extractor Library
//!
//! Pulls article text and publication dates out of web pages with a
//! three-stage fallback: news markup heuristics, the Readability algorithm,
//! and finally an LLM.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod services;
pub mod storage;
pub mod utils;
