// src/storage/csv.rs

//! CSV input table and result writer.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::ExtractionResult;

/// Column order of the output file.
pub const RESULT_HEADER: [&str; 7] = [
    "id",
    "url",
    "extracted_text",
    "publication_date",
    "extraction_method",
    "status",
    "error_message",
];

/// An input CSV held in memory, every cell as a string.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file with a header row. Short rows are padded on access.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every name to a column index, failing on the first one missing.
    pub fn require_columns(&self, names: &[String]) -> Result<Vec<usize>> {
        let missing: Vec<&str> = names
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "columns not found in CSV: {}",
                missing.join(", ")
            )));
        }

        Ok(names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect())
    }

    /// Cell value, empty when the row is shorter than the header.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }
}

/// Write results with the fixed output header. Missing values become empty cells.
pub fn write_results(path: impl AsRef<Path>, results: &[ExtractionResult]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;

    writer.write_record(RESULT_HEADER)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}
