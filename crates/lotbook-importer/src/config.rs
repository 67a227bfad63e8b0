//! Configuration for importers.

use crate::csv_importer::CsvImporter;
use crate::ImportResult;
use anyhow::Result;
use lotbook_core::KindPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a statement import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Reference currency and symbol normalization applied to units.
    pub kinds: KindPolicy,
    /// Column layout of the CSV file.
    pub csv: CsvConfig,
}

/// Configuration specific to CSV imports.
///
/// The defaults match an exchange account-statement export with the header
/// `portfolio,type,time,amount,balance,amount/balance unit,transfer id,trade id,order id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// The column holding the row type (match, fee, deposit, withdrawal, ...).
    pub type_column: ColumnSpec,
    /// The column holding the trade id that ties legs of one trade together.
    pub trade_id_column: ColumnSpec,
    /// The column holding the signed amount.
    pub amount_column: ColumnSpec,
    /// The column holding the asset symbol of the amount.
    pub unit_column: ColumnSpec,
    /// The column holding the timestamp.
    pub time_column: ColumnSpec,
    /// Whether the CSV has a header row.
    pub has_header: bool,
    /// The field delimiter.
    pub delimiter: char,
    /// Number of rows to skip at the beginning.
    pub skip_rows: usize,
    /// Fail on the first invalid row instead of reporting a warning.
    pub strict: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            type_column: ColumnSpec::Name("type".to_string()),
            trade_id_column: ColumnSpec::Name("trade id".to_string()),
            amount_column: ColumnSpec::Name("amount".to_string()),
            unit_column: ColumnSpec::Name("amount/balance unit".to_string()),
            time_column: ColumnSpec::Name("time".to_string()),
            has_header: true,
            delimiter: ',',
            skip_rows: 0,
            strict: false,
        }
    }
}

/// Specification for a column in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Column specified by name (from header).
    Name(String),
    /// Column specified by zero-based index.
    Index(usize),
}

impl ImporterConfig {
    /// Start building a CSV importer configuration.
    pub fn csv() -> CsvConfigBuilder {
        CsvConfigBuilder::new()
    }

    /// Extract rows from a file.
    pub fn extract(&self, path: &Path) -> Result<ImportResult> {
        CsvImporter::new(self.clone()).extract_file(path)
    }

    /// Extract rows from string content.
    pub fn extract_from_string(&self, content: &str) -> Result<ImportResult> {
        CsvImporter::new(self.clone()).extract_string(content)
    }
}

/// Builder for CSV importer configuration.
pub struct CsvConfigBuilder {
    kinds: KindPolicy,
    config: CsvConfig,
}

impl CsvConfigBuilder {
    /// Create a new CSV config builder.
    pub fn new() -> Self {
        Self {
            kinds: KindPolicy::default(),
            config: CsvConfig::default(),
        }
    }

    /// Set the reference currency and symbol normalization.
    pub fn kinds(mut self, kinds: KindPolicy) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set the row type column by name.
    pub fn type_column(mut self, name: impl Into<String>) -> Self {
        self.config.type_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the trade id column by name.
    pub fn trade_id_column(mut self, name: impl Into<String>) -> Self {
        self.config.trade_id_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the amount column by name.
    pub fn amount_column(mut self, name: impl Into<String>) -> Self {
        self.config.amount_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the unit column by name.
    pub fn unit_column(mut self, name: impl Into<String>) -> Self {
        self.config.unit_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the time column by name.
    pub fn time_column(mut self, name: impl Into<String>) -> Self {
        self.config.time_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set all five columns by zero-based index, in the order
    /// type, trade id, amount, unit, time.
    pub fn column_indices(mut self, indices: [usize; 5]) -> Self {
        let [row_type, trade_id, amount, unit, time] = indices;
        self.config.type_column = ColumnSpec::Index(row_type);
        self.config.trade_id_column = ColumnSpec::Index(trade_id);
        self.config.amount_column = ColumnSpec::Index(amount);
        self.config.unit_column = ColumnSpec::Index(unit);
        self.config.time_column = ColumnSpec::Index(time);
        self
    }

    /// Set whether the CSV has a header row.
    pub const fn has_header(mut self, has_header: bool) -> Self {
        self.config.has_header = has_header;
        self
    }

    /// Set the field delimiter.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Set the number of rows to skip.
    pub const fn skip_rows(mut self, count: usize) -> Self {
        self.config.skip_rows = count;
        self
    }

    /// Set whether invalid rows are fatal.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Build the importer configuration.
    pub fn build(self) -> ImporterConfig {
        ImporterConfig {
            kinds: self.kinds,
            csv: self.config,
        }
    }
}

impl Default for CsvConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ImporterConfig::csv().build();
        assert_eq!(config, ImporterConfig::default());
        assert_eq!(
            config.csv.unit_column,
            ColumnSpec::Name("amount/balance unit".to_string())
        );
        assert!(config.csv.has_header);
    }

    #[test]
    fn test_builder_column_indices() {
        let config = ImporterConfig::csv()
            .column_indices([0, 1, 2, 3, 4])
            .has_header(false)
            .delimiter(';')
            .build();
        assert_eq!(config.csv.time_column, ColumnSpec::Index(4));
        assert_eq!(config.csv.delimiter, ';');
        assert!(!config.csv.has_header);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "kinds": { "reference_currency": "EUR", "case": "upper" },
            "csv": { "unit_column": "currency", "time_column": 3, "strict": true }
        }"#;
        let config: ImporterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kinds.reference_currency, "EUR");
        assert_eq!(config.csv.unit_column, ColumnSpec::Name("currency".to_string()));
        assert_eq!(config.csv.time_column, ColumnSpec::Index(3));
        assert_eq!(config.csv.type_column, ColumnSpec::Name("type".to_string()));
        assert!(config.csv.strict);
    }
}
