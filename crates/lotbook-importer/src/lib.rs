//! Import framework for lotbook
//!
//! This crate turns exchange account statements into validated
//! [`Row`](lotbook_core::Row)s for the booking engine. Raw text is checked
//! once, here; rows that fail validation are reported as warnings (or abort
//! the import in strict mode) so that nothing downstream has to deal with
//! unparsed strings.
//!
//! # Example
//!
//! ```rust,no_run
//! use lotbook_importer::{extract_from_file, ImporterConfig};
//! use std::path::Path;
//!
//! // Columns default to the exchange statement export
//! // (type, trade id, amount, amount/balance unit, time)
//! let config = ImporterConfig::csv().delimiter(',').build();
//!
//! // let result = extract_from_file(Path::new("account.csv"), &config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod csv_importer;

use anyhow::Result;
use lotbook_core::Row;
use std::path::Path;

pub use config::{ColumnSpec, CsvConfig, ImporterConfig};
pub use csv_importer::CsvImporter;

/// Result of an import operation.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The validated rows, in file order.
    pub rows: Vec<Row>,
    /// Warnings encountered during import.
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// Create a new import result.
    pub const fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            warnings: Vec::new(),
        }
    }

    /// Create an empty import result.
    pub const fn empty() -> Self {
        Self {
            rows: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a warning to the result.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Extract rows from a file using the given configuration.
pub fn extract_from_file(path: &Path, config: &ImporterConfig) -> Result<ImportResult> {
    config.extract(path)
}

/// Extract rows from file contents (useful for testing).
pub fn extract_from_string(content: &str, config: &ImporterConfig) -> Result<ImportResult> {
    config.extract_from_string(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_result_empty() {
        let result = ImportResult::empty();
        assert!(result.rows.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_import_result_multiple_warnings() {
        let result = ImportResult::empty()
            .with_warning("Warning 1")
            .with_warning("Warning 2");
        assert_eq!(result.warnings, vec!["Warning 1", "Warning 2"]);
    }

    #[test]
    fn test_extract_from_string_header_only() {
        let config = ImporterConfig::csv().build();
        let csv_content = "type,trade id,amount,amount/balance unit,time\n";
        let result = extract_from_string(csv_content, &config).unwrap();
        assert!(result.rows.is_empty());
    }
}
