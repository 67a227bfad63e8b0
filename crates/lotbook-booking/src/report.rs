//! Results of a booking run.

use chrono::{DateTime, Utc};
use lotbook_core::{Decimal, Kind, Lot};
use serde::Serialize;

/// Gain or loss realized by one sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealizedGain {
    /// Asset sold
    pub kind: Kind,
    /// When the sale happened
    pub date: Option<DateTime<Utc>>,
    /// Units sold
    pub size: Decimal,
    /// Reference currency received
    pub proceeds: Decimal,
    /// Cost basis of the units matched against the sale
    pub cost: Decimal,
    /// `proceeds - cost`
    pub profit: Decimal,
    /// Fees of the matched units plus the fee of the sale itself
    pub fee: Decimal,
    /// Cost per unit of the matched units
    pub matched_rate: Option<Decimal>,
    /// Proceeds per unit
    pub sale_rate: Option<Decimal>,
    /// Units sold that the account did not hold
    pub shortfall: Decimal,
}

/// A withdrawal that asked for more than the account held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    /// Account that ran out
    pub kind: Kind,
    /// When the withdrawal happened
    pub date: Option<DateTime<Utc>>,
    /// Units requested
    pub requested: Decimal,
    /// Units that could not be supplied
    pub missing: Decimal,
}

/// What remains in one account after booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Account kind
    pub kind: Kind,
    /// Everything held, summed
    pub lot: Lot,
    /// Cost per unit held
    pub rate: Option<Decimal>,
}

/// Output of [`LedgerProcessor::finish`](crate::LedgerProcessor::finish).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingReport {
    /// One entry per sale, in input order
    pub realized: Vec<RealizedGain>,
    /// Final cost basis per account, ordered by kind
    pub positions: Vec<Position>,
    /// Sum of realized profit
    pub total_profit: Decimal,
    /// Sum of realized fees
    pub total_fees: Decimal,
    /// Number of unrecognized events
    pub dropped: usize,
    /// Number of rows in unrecognized events
    pub dropped_rows: usize,
    /// Withdrawals the ledger could not cover
    pub shortfalls: Vec<Shortfall>,
}

impl BookingReport {
    /// Final position of one account.
    pub fn position(&self, kind: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.kind == kind)
    }

    /// Whether every event was recognized and every withdrawal covered.
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.shortfalls.is_empty()
    }
}
