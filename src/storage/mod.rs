//! File storage for batch input and output.
//!
//! Only CSV is supported: one input table with an id column and one or more
//! URL columns, and one output file with a row per extracted URL.

pub mod csv;

pub use self::csv::{CsvTable, RESULT_HEADER, write_results};
