//! FIFO booking engine for exchange ledgers.
//!
//! This crate provides:
//! - Contiguous grouping of rows that belong to one trade
//! - Classification of row groups into purchases, sales and transfers
//! - FIFO matching of sales against earlier purchases, with realized gains
//!
//! # Pipeline
//!
//! ```
//! use lotbook_booking::{book_rows, BookingConfig};
//! use lotbook_core::{Row, RowType, Utc};
//! use rust_decimal_macros::dec;
//!
//! let now = Utc::now();
//! let trade = |amount, unit: &str| {
//!     Row::new(RowType::Match, Some("1".into()), amount, unit, now)
//! };
//! let rows = vec![trade(dec!(1), "btc"), trade(dec!(-4000), "usd")];
//!
//! let report = book_rows(rows, &BookingConfig::default()).unwrap();
//! assert_eq!(report.position("btc").unwrap().lot.cost, dec!(4000));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod group;
mod processor;
mod report;

pub use classify::{Classifier, FiatConvention};
pub use config::BookingConfig;
pub use group::{EventGrouper, GroupContiguous, Grouped};
pub use processor::{BookingError, LedgerProcessor};
pub use report::{BookingReport, Position, RealizedGain, Shortfall};

use lotbook_core::Row;

/// Book a stream of rows, in order, and report the outcome.
///
/// Rows sharing a trade id and sitting next to each other form one trade.
/// Stops at the first integrity violation.
pub fn book_rows<I>(rows: I, config: &BookingConfig) -> Result<BookingReport, BookingError>
where
    I: IntoIterator<Item = Row>,
{
    let classifier = Classifier::new(config.kinds.clone(), config.convention);
    let mut processor = LedgerProcessor::new(config);

    for grouped in rows.into_iter().group_contiguous(Row::group_key) {
        processor.process(classifier.classify(&grouped))?;
    }

    Ok(processor.finish())
}
