//! Core types for lotbook
//!
//! This crate provides the cost-basis building blocks used by the rest of the
//! workspace:
//!
//! - [`Lot`] - A quantity of one asset with its cost and fees, splittable
//! - [`Account`] - A FIFO queue of lots for one asset kind
//! - [`BoundaryAccount`] - Infinite source / discarding sink for the outside world
//! - [`LotAccount`] - The interface both account types share
//! - [`Kind`] and [`KindPolicy`] - Asset identifiers and their normalization
//! - [`Row`] - A validated line of an exchange account statement
//! - [`Event`] - Purchase, sale, transfer or unrecognized row pattern
//!
//! # Example
//!
//! ```
//! use lotbook_core::{Account, Lot, LotAccount};
//! use rust_decimal_macros::dec;
//!
//! let mut account = Account::new("btc");
//! account.deposit(Lot::new(dec!(1), dec!(10000), dec!(300), "btc")).unwrap();
//! account.deposit(Lot::new(dec!(0.3), dec!(10000), dec!(200), "btc")).unwrap();
//!
//! // Sell 1.1 BTC: the whole first lot plus a third of the second
//! let withdrawal = account.withdraw(dec!(1.1));
//! assert_eq!(withdrawal.lot.size, dec!(1.1));
//! assert!((withdrawal.lot.cost - dec!(13333.33)).abs() < dec!(0.01));
//! assert_eq!(withdrawal.shortfall, dec!(0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod boundary;
pub mod event;
pub mod kind;
pub mod lot;
pub mod row;

pub use account::{Account, AccountError, LotAccount, Withdrawal};
pub use boundary::BoundaryAccount;
pub use event::{AccountRef, Event, Transfer, Unrecognized};
pub use kind::{CaseNormalization, Kind, KindPolicy};
pub use lot::Lot;
pub use row::{parse_time, Row, RowError, RowType};

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;
