//! Lot type: a quantity of one asset with its attributed cost and fees.
//!
//! A [`Lot`] is the atomic unit of cost-basis tracking. Lots are split when only
//! part of one is consumed; splitting keeps the unit cost and the unit fee rate
//! of the lot being split, so `taken + remainder` always adds back up to the source.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Kind;

/// A quantity of one asset kind held at a cost.
///
/// `size` is non-negative while a lot sits in an account. Inside a sale event
/// the size is negative to mark the direction of the trade.
///
/// # Examples
///
/// ```
/// use lotbook_core::Lot;
/// use rust_decimal_macros::dec;
///
/// let lot = Lot::new(dec!(1), dec!(10000), dec!(300), "btc");
/// let (taken, remainder) = lot.split(dec!(0.25));
///
/// assert_eq!(taken.cost, dec!(2500));
/// assert_eq!(taken.fees, dec!(75));
/// assert_eq!(remainder.size, dec!(0.75));
/// assert_eq!(taken.cost + remainder.cost, lot.cost);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    /// Quantity of the asset
    pub size: Decimal,
    /// Total cost basis in the reference currency
    pub cost: Decimal,
    /// Total fees attributed to this quantity
    pub fees: Decimal,
    /// The asset this lot holds
    pub kind: Kind,
    /// When the quantity was acquired (or when the event happened)
    pub date: Option<DateTime<Utc>>,
}

impl Lot {
    /// Create a new undated lot.
    #[must_use]
    pub fn new(size: Decimal, cost: Decimal, fees: Decimal, kind: impl Into<Kind>) -> Self {
        Self {
            size,
            cost,
            fees,
            kind: kind.into(),
            date: None,
        }
    }

    /// Create an empty lot of the given kind.
    #[must_use]
    pub fn zero(kind: impl Into<Kind>) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, kind)
    }

    /// Set the date.
    #[must_use]
    pub const fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Check if the lot holds no quantity.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_zero()
    }

    /// Cost per unit, or `None` for an empty lot.
    #[must_use]
    pub fn rate(&self) -> Option<Decimal> {
        self.cost.checked_div(self.size)
    }

    /// Split off up to `requested` units.
    ///
    /// Returns `(taken, remainder)`. `taken` holds `min(requested, size)` units
    /// with proportional cost and fees; `remainder` holds the rest. A negative
    /// request takes nothing. An empty lot is never divided: `taken` is a zero
    /// lot and `remainder` is the lot itself.
    #[must_use]
    pub fn split(&self, requested: Decimal) -> (Self, Self) {
        if self.size.is_zero() {
            let mut taken = Self::zero(self.kind.clone());
            taken.date = self.date;
            return (taken, self.clone());
        }

        let take = requested.max(Decimal::ZERO).min(self.size);
        let taken = Self {
            size: take,
            cost: self.cost * take / self.size,
            fees: self.fees * take / self.size,
            kind: self.kind.clone(),
            date: self.date,
        };
        let remainder = Self {
            size: self.size - taken.size,
            cost: self.cost - taken.cost,
            fees: self.fees - taken.fees,
            kind: self.kind.clone(),
            date: self.date,
        };
        (taken, remainder)
    }

    /// Add another lot's size, cost and fees to this one.
    ///
    /// The earliest known date is kept.
    pub fn absorb(&mut self, other: &Self) {
        self.size += other.size;
        self.cost += other.cost;
        self.fees += other.fees;
        self.date = match (self.date, other.date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} cost={} fees={}",
            self.size, self.kind, self.cost, self.fees
        )?;
        if let Some(date) = self.date {
            write!(f, " @ {}", date.format("%Y-%m-%d %H:%M:%S"))?;
        }
        Ok(())
    }
}
