//! Economic events reconstructed from ledger rows.
//!
//! The booking engine consumes a stream of [`Event`]s. Each is either a trade
//! against the reference currency (purchase or sale), a movement of units
//! between two accounts, or a row pattern that did not form a known event.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Kind, Lot};

/// Which account an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "account", content = "kind", rename_all = "lowercase")]
pub enum AccountRef {
    /// A FIFO account tracked by the ledger.
    Tracked(Kind),
    /// The outside world for this kind.
    Boundary(Kind),
}

impl AccountRef {
    /// The kind of the referenced account.
    #[must_use]
    pub const fn kind(&self) -> &Kind {
        match self {
            Self::Tracked(kind) | Self::Boundary(kind) => kind,
        }
    }

    /// Whether this refers to a boundary account.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary(_))
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracked(kind) => write!(f, "{kind}"),
            Self::Boundary(kind) => write!(f, "<external {kind}>"),
        }
    }
}

/// Units moving from one account to another.
///
/// Source and destination quantities may differ (e.g. a conversion between
/// two assets). The cost basis withdrawn from the source moves as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Account the units leave
    pub src: AccountRef,
    /// Units withdrawn from the source
    pub src_size: Decimal,
    /// Account the units arrive in
    pub dest: AccountRef,
    /// Units deposited into the destination
    pub dest_size: Decimal,
    /// When the transfer happened
    pub date: DateTime<Utc>,
}

impl Transfer {
    /// Transfer of the same quantity between two accounts.
    #[must_use]
    pub const fn new(src: AccountRef, dest: AccountRef, size: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            src,
            src_size: size,
            dest,
            dest_size: size,
            date,
        }
    }

    /// Units arriving from outside the ledger.
    #[must_use]
    pub fn inbound(kind: Kind, size: Decimal, date: DateTime<Utc>) -> Self {
        Self::new(
            AccountRef::Boundary(kind.clone()),
            AccountRef::Tracked(kind),
            size,
            date,
        )
    }

    /// Units leaving the ledger.
    #[must_use]
    pub fn outbound(kind: Kind, size: Decimal, date: DateTime<Utc>) -> Self {
        Self::new(
            AccountRef::Tracked(kind.clone()),
            AccountRef::Boundary(kind),
            size,
            date,
        )
    }
}

/// Rows that did not form a recognizable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unrecognized {
    /// Why classification gave up.
    pub reason: String,
    /// Number of rows dropped.
    pub rows: usize,
}

impl Unrecognized {
    /// Create a new unrecognized marker.
    pub fn new(reason: impl Into<String>, rows: usize) -> Self {
        Self {
            reason: reason.into(),
            rows,
        }
    }
}

/// An economic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Asset bought with the reference currency. Size is positive.
    Purchase(Lot),
    /// Asset sold for the reference currency. Size is negative; cost holds
    /// the proceeds.
    Sale(Lot),
    /// Units moved between accounts.
    Transfer(Transfer),
    /// Dropped rows.
    Unrecognized(Unrecognized),
}

impl Event {
    /// Short name of the event type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Purchase(_) => "purchase",
            Self::Sale(_) => "sale",
            Self::Transfer(_) => "transfer",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase(lot) | Self::Sale(lot) => write!(f, "{} {lot}", self.type_name()),
            Self::Transfer(t) => write!(
                f,
                "transfer {} {} -> {} {}",
                t.src_size, t.src, t.dest_size, t.dest
            ),
            Self::Unrecognized(u) => write!(f, "unrecognized ({} rows): {}", u.rows, u.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inbound_and_outbound() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let inbound = Transfer::inbound(Kind::from("btc"), dec!(5), date);
        assert_eq!(inbound.src, AccountRef::Boundary(Kind::from("btc")));
        assert_eq!(inbound.dest, AccountRef::Tracked(Kind::from("btc")));
        assert_eq!(inbound.src_size, inbound.dest_size);

        let outbound = Transfer::outbound(Kind::from("btc"), dec!(2), date);
        assert!(outbound.dest.is_boundary());
        assert!(!outbound.src.is_boundary());
        assert_eq!(outbound.src.kind(), "btc");
    }

    #[test]
    fn test_display() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let event = Event::Transfer(Transfer::inbound(Kind::from("eth"), dec!(1), date));
        assert_eq!(event.to_string(), "transfer 1 <external eth> -> 1 eth");
        assert_eq!(
            Event::Unrecognized(Unrecognized::new("no asset leg", 2)).to_string(),
            "unrecognized (2 rows): no asset leg"
        );
    }
}
