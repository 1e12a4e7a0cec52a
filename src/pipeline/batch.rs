// src/pipeline/batch.rs

//! CSV batch driver.

use std::path::Path;

use crate::error::Result;
use crate::models::{Config, ExtractionResult};
use crate::storage::{CsvTable, write_results};

use super::ExtractionPipeline;

/// Counters for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &ExtractionResult) {
        self.total += 1;
        if result.is_success() {
            self.success += 1;
        } else {
            self.errors += 1;
        }
    }
}

/// Extract every URL cell of `input` and write one result row per cell to
/// `output`.
///
/// Rows are processed in file order and URL columns in configuration order,
/// one request at a time. Missing columns abort the run before any URL is
/// fetched. A fatal error for one URL becomes an error row; the batch goes on.
pub async fn run_extraction(
    config: &Config,
    pipeline: &ExtractionPipeline,
    input: &Path,
    output: &Path,
) -> Result<BatchSummary> {
    log::info!(
        "Starting CSV processing: {} -> {}",
        input.display(),
        output.display()
    );

    let table = CsvTable::read(input)?;
    log::info!(
        "CSV loaded: {} rows, columns {:?}",
        table.rows.len(),
        table.headers
    );

    let id_index = table.require_columns(std::slice::from_ref(&config.input.id_column))?[0];
    let url_indexes = table.require_columns(&config.input.url_columns)?;

    let total_urls = table.rows.len() * url_indexes.len();
    let mut results = Vec::with_capacity(total_urls);
    let mut summary = BatchSummary::default();

    for row in 0..table.rows.len() {
        let id_value = table.cell(row, id_index);

        for (column_name, &column) in config.input.url_columns.iter().zip(&url_indexes) {
            let url = table.cell(row, column);
            log::info!(
                "Processing URL {}/{} (id {}, column {})",
                summary.total + 1,
                total_urls,
                id_value,
                column_name
            );

            let result = match pipeline.extract_from_url(url, id_value).await {
                Ok(result) => result,
                Err(error) => {
                    log::error!("Extraction aborted for {} (id {}): {}", url, id_value, error);
                    ExtractionResult::error(id_value, url.trim(), error.to_string())
                }
            };

            summary.record(&result);
            results.push(result);
        }
    }

    write_results(output, &results)?;
    log::info!(
        "CSV processing complete: {} (total {}, success {}, errors {})",
        output.display(),
        summary.total,
        summary.success,
        summary.errors
    );

    Ok(summary)
}
