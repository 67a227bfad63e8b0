//! Lotbook CLI tools.
//!
//! - `lotbook-basis`: Book an exchange account statement FIFO and report
//!   realized gains and the remaining cost basis per asset
//!
//! # Example Usage
//!
//! ```bash
//! lotbook-basis account.csv
//! lotbook-basis account.csv --config lotbook.json --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
