//! File-based import tests.

use lotbook_core::RowType;
use lotbook_importer::{extract_from_file, ImporterConfig};
use rust_decimal_macros::dec;
use std::io::Write;

#[test]
fn test_extract_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "type,time,amount,amount/balance unit,trade id\n\
         match,2019-03-01T09:30:00Z,-5000.00,USD,7\n\
         match,2019-03-01T09:30:00Z,0.5,BTC,7\n\
         fee,2019-03-01T09:30:00Z,-12.50,USD,7"
    )
    .unwrap();

    let config = ImporterConfig::csv().build();
    let result = extract_from_file(file.path(), &config).unwrap();

    assert!(result.warnings.is_empty());
    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[2].row_type, RowType::Fee);
    assert_eq!(result.rows[2].amount, dec!(-12.50));
    assert!(result.rows.iter().all(|r| r.trade_id.as_deref() == Some("7")));
}

#[test]
fn test_extract_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");

    let config = ImporterConfig::csv().build();
    let err = extract_from_file(&path, &config).unwrap_err();
    assert!(err.to_string().starts_with("Failed to open file"));
}
