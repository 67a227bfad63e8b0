//! CSV statement importer.

use crate::config::{ColumnSpec, CsvConfig, ImporterConfig};
use crate::ImportResult;
use anyhow::{bail, Context, Result};
use lotbook_core::Row;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV statement importer.
pub struct CsvImporter {
    config: ImporterConfig,
}

impl CsvImporter {
    /// Create a new CSV importer with the given configuration.
    pub const fn new(config: ImporterConfig) -> Self {
        Self { config }
    }

    /// Extract rows from a file.
    pub fn extract_file(&self, path: &Path) -> Result<ImportResult> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        self.extract_string(&content)
    }

    /// Extract rows from string content.
    ///
    /// Rows are returned in file order. Blank rows are skipped; invalid rows
    /// become warnings unless the configuration is strict.
    pub fn extract_string(&self, content: &str) -> Result<ImportResult> {
        let csv_config = &self.config.csv;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(csv_config.has_header)
            .delimiter(csv_config.delimiter as u8)
            .flexible(true)
            .from_reader(content.as_bytes());

        // Build column name to index map from headers
        let header_map: HashMap<String, usize> = if csv_config.has_header {
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_string(), i))
                .collect()
        } else {
            HashMap::new()
        };

        let mut rows = Vec::new();
        let mut warnings = Vec::new();
        let mut row_num = csv_config.skip_rows;

        for result in reader.records().skip(csv_config.skip_rows) {
            row_num += 1;
            let record = match result {
                Ok(r) => r,
                Err(e) if csv_config.strict => bail!("Row {row_num}: parse error: {e}"),
                Err(e) => {
                    warnings.push(format!("Row {row_num}: parse error: {e}"));
                    continue;
                }
            };

            match self.parse_row(&record, csv_config, &header_map) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {} // Skip empty rows
                Err(e) if csv_config.strict => return Err(e.context(format!("Row {row_num}"))),
                Err(e) => warnings.push(format!("Row {row_num}: {e:#}")),
            }
        }

        let mut result = ImportResult::new(rows);
        for warning in warnings {
            result = result.with_warning(warning);
        }
        Ok(result)
    }

    fn parse_row(
        &self,
        record: &csv::StringRecord,
        csv_config: &CsvConfig,
        header_map: &HashMap<String, usize>,
    ) -> Result<Option<Row>> {
        if record.iter().all(|field| field.trim().is_empty()) {
            return Ok(None);
        }

        let row_type = self.get_column(record, &csv_config.type_column, header_map)?;
        let trade_id = self.get_column(record, &csv_config.trade_id_column, header_map)?;
        let amount = self.get_column(record, &csv_config.amount_column, header_map)?;
        let unit = self.get_column(record, &csv_config.unit_column, header_map)?;
        let time = self.get_column(record, &csv_config.time_column, header_map)?;

        let row = Row::parse(row_type, trade_id, amount, unit, time, &self.config.kinds)?;
        Ok(Some(row))
    }

    fn get_column<'a>(
        &self,
        record: &'a csv::StringRecord,
        spec: &ColumnSpec,
        header_map: &HashMap<String, usize>,
    ) -> Result<&'a str> {
        let index = match spec {
            ColumnSpec::Index(i) => *i,
            ColumnSpec::Name(name) => *header_map
                .get(name)
                .with_context(|| format!("Column '{name}' not found in header"))?,
        };

        record
            .get(index)
            .with_context(|| format!("Column index {index} out of bounds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotbook_core::{CaseNormalization, KindPolicy, RowType};
    use rust_decimal_macros::dec;

    const STATEMENT: &str = "\
portfolio,type,time,amount,balance,amount/balance unit,transfer id,trade id,order id
default,deposit,2019-01-01T10:00:00.000Z,1000.00,1000.00,USD,abc,,
default,match,2019-01-02T11:00:00.000Z,0.25,0.25,BTC,,42,o1
default,match,2019-01-02T11:00:00.000Z,-900.00,100.00,USD,,42,o1
default,fee,2019-01-02T11:00:00.000Z,-2.25,97.75,USD,,42,o1
";

    #[test]
    fn test_csv_import_statement() {
        let config = ImporterConfig::csv().build();
        let result = config.extract_from_string(STATEMENT).unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(result.rows.len(), 4);

        let deposit = &result.rows[0];
        assert_eq!(deposit.row_type, RowType::Deposit);
        assert_eq!(deposit.trade_id, None);
        assert_eq!(deposit.unit, "usd");

        let leg = &result.rows[1];
        assert_eq!(leg.row_type, RowType::Match);
        assert_eq!(leg.trade_id.as_deref(), Some("42"));
        assert_eq!(leg.amount, dec!(0.25));
        assert_eq!(leg.unit, "btc");
    }

    #[test]
    fn test_csv_import_keeps_case_when_configured() {
        let config = ImporterConfig::csv()
            .kinds(KindPolicy::new("USD", CaseNormalization::Preserve))
            .build();
        let result = config.extract_from_string(STATEMENT).unwrap();
        assert_eq!(result.rows[1].unit, "BTC");
    }

    #[test]
    fn test_csv_import_invalid_row_is_warning() {
        let content = "\
type,trade id,amount,amount/balance unit,time
match,1,oops,BTC,2019-01-02
match,1,-10,USD,2019-01-02
";
        let config = ImporterConfig::csv().build();
        let result = config.extract_from_string(content).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Row 1:"));
        assert!(result.warnings[0].contains("invalid amount 'oops'"));
    }

    #[test]
    fn test_csv_import_strict_fails() {
        let content = "\
type,trade id,amount,amount/balance unit,time
match,1,1,BTC,not a date
";
        let config = ImporterConfig::csv().strict(true).build();
        let err = config.extract_from_string(content).unwrap_err();
        assert!(format!("{err:#}").contains("invalid time 'not a date'"));
    }

    #[test]
    fn test_csv_import_missing_column() {
        let content = "type,amount,amount/balance unit,time\nmatch,1,BTC,2019-01-02\n";
        let config = ImporterConfig::csv().build();
        let result = config.extract_from_string(content).unwrap();
        assert!(result.rows.is_empty());
        assert!(result.warnings[0].contains("Column 'trade id' not found in header"));
    }

    #[test]
    fn test_csv_import_by_index_without_header() {
        let content = "deposit;;5;ETH;2020-02-01\n;;;;\nwithdrawal;;-2;ETH;2020-02-03\n";
        let config = ImporterConfig::csv()
            .column_indices([0, 1, 2, 3, 4])
            .has_header(false)
            .delimiter(';')
            .build();
        let result = config.extract_from_string(content).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].row_type, RowType::Withdrawal);
        assert_eq!(result.rows[1].amount, dec!(-2));
    }
}
