//! Classification of grouped rows into economic events.
//!
//! A trade on an exchange statement shows up as two `match` legs (one in the
//! reference currency, one in the asset) plus an optional `fee` row, all
//! sharing a trade id. A conversion between two assets has two `match` legs
//! and no reference-currency leg. Deposits and withdrawals stand alone.
//!
//! [`Classifier::classify`] is total: row patterns that do not fit any of these
//! shapes come back as [`Event::Unrecognized`] instead of an error.

use lotbook_core::{
    AccountRef, Decimal, Event, KindPolicy, Lot, Row, RowType, Transfer, Unrecognized,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Grouped;

/// How the sign of the reference-currency leg maps to the trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiatConvention {
    /// Reference currency flowing in (positive amount) means the asset was
    /// sold.
    #[default]
    InflowIsSale,
    /// Positive reference-currency amount means the asset was bought. For
    /// exports that record the fiat leg from the counterparty's side.
    InflowIsPurchase,
}

impl FromStr for FiatConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "inflow_is_sale" => Ok(Self::InflowIsSale),
            "inflow_is_purchase" => Ok(Self::InflowIsPurchase),
            _ => Err(format!("unknown fiat convention: {s}")),
        }
    }
}

impl fmt::Display for FiatConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InflowIsSale => write!(f, "inflow-is-sale"),
            Self::InflowIsPurchase => write!(f, "inflow-is-purchase"),
        }
    }
}

/// Turns grouped rows into events.
#[derive(Debug, Clone)]
pub struct Classifier {
    kinds: KindPolicy,
    convention: FiatConvention,
}

impl Classifier {
    /// Create a classifier for the given reference currency policy.
    pub const fn new(kinds: KindPolicy, convention: FiatConvention) -> Self {
        Self { kinds, convention }
    }

    /// Classify one grouper output.
    pub fn classify(&self, grouped: &Grouped<Row>) -> Event {
        match grouped {
            Grouped::Group(rows) => self.classify_group(rows),
            Grouped::Standalone(row) => Self::classify_standalone(row),
        }
    }

    fn classify_standalone(row: &Row) -> Event {
        match row.row_type {
            RowType::Deposit => Event::Transfer(Transfer::inbound(
                row.unit.clone(),
                row.amount.abs(),
                row.time,
            )),
            RowType::Withdrawal => Event::Transfer(Transfer::outbound(
                row.unit.clone(),
                row.amount.abs(),
                row.time,
            )),
            ref other => {
                Event::Unrecognized(Unrecognized::new(format!("standalone {other} row"), 1))
            }
        }
    }

    fn classify_group(&self, rows: &[Row]) -> Event {
        let reference = self.kinds.reference();
        let mut fiat_legs = Vec::new();
        let mut asset_legs = Vec::new();
        let mut fee_rows = Vec::new();

        for row in rows {
            match row.row_type {
                RowType::Match if row.unit == reference => fiat_legs.push(row),
                RowType::Match => asset_legs.push(row),
                RowType::Fee => fee_rows.push(row),
                _ => {}
            }
        }

        let unrecognized = |reason: &str| Event::Unrecognized(Unrecognized::new(reason, rows.len()));

        if fee_rows.len() > 1 {
            return unrecognized("more than one fee row");
        }

        match (fiat_legs.as_slice(), asset_legs.as_slice()) {
            ([fiat], [asset]) => {
                let fees = fee_rows.first().map_or(Decimal::ZERO, |f| f.amount.abs());
                self.trade(fiat, asset, fees)
                    .unwrap_or_else(|| unrecognized("reference currency leg is zero"))
            }
            ([], [a, b]) => {
                Self::conversion(a, b).unwrap_or_else(|| unrecognized("match legs have the same sign"))
            }
            ([_], []) | ([], [_]) => unrecognized("missing asset leg"),
            ([], []) => unrecognized("no match rows"),
            _ => unrecognized("too many match rows"),
        }
    }

    fn trade(&self, fiat: &Row, asset: &Row, fees: Decimal) -> Option<Event> {
        if fiat.amount.is_zero() {
            return None;
        }
        let inflow = fiat.amount > Decimal::ZERO;
        let is_sale = match self.convention {
            FiatConvention::InflowIsSale => inflow,
            FiatConvention::InflowIsPurchase => !inflow,
        };

        let size = asset.amount.abs();
        let lot = Lot::new(
            if is_sale { -size } else { size },
            fiat.amount.abs(),
            fees,
            asset.unit.clone(),
        )
        .with_date(fiat.time);

        Some(if is_sale {
            Event::Sale(lot)
        } else {
            Event::Purchase(lot)
        })
    }

    fn conversion(a: &Row, b: &Row) -> Option<Event> {
        let (src, dest) = match (a.amount.is_sign_negative(), b.amount.is_sign_negative()) {
            (true, false) => (a, b),
            (false, true) => (b, a),
            _ => return None,
        };
        if src.amount.is_zero() || dest.amount.is_zero() {
            return None;
        }

        Some(Event::Transfer(Transfer {
            src: AccountRef::Tracked(src.unit.clone()),
            src_size: src.amount.abs(),
            dest: AccountRef::Tracked(dest.unit.clone()),
            dest_size: dest.amount.abs(),
            date: dest.time,
        }))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KindPolicy::default(), FiatConvention::default())
    }
}
