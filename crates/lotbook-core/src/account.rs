//! FIFO account of lots for a single asset kind.
//!
//! An [`Account`] holds lots oldest-first. Withdrawals consume from the front,
//! splitting the front lot when only part of it is needed, and return the
//! combined cost basis of everything taken.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

use crate::{Kind, Lot};

/// Error that can occur when mutating an account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// A lot was deposited into an account of a different kind.
    #[error("cannot deposit {got} into account of kind {expected}")]
    KindMismatch {
        /// Kind of the account.
        expected: Kind,
        /// Kind of the rejected lot.
        got: Kind,
    },
}

/// Result of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Combined size, cost and fees of everything taken.
    pub lot: Lot,
    /// Requested units the account could not supply.
    pub shortfall: Decimal,
}

impl Withdrawal {
    /// Whether the account ran out before the request was satisfied.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.shortfall > Decimal::ZERO
    }
}

/// Common interface of tracked and boundary accounts.
pub trait LotAccount {
    /// The kind this account holds.
    fn kind(&self) -> &Kind;

    /// Add a lot to the account.
    fn deposit(&mut self, lot: Lot) -> Result<(), AccountError>;

    /// Remove `size` units and return their cost basis.
    fn withdraw(&mut self, size: Decimal) -> Withdrawal;

    /// Everything currently held, summed into a single lot.
    fn effective_lot(&self) -> Lot;

    /// Whether this account stands for the world outside the ledger.
    fn is_boundary(&self) -> bool {
        false
    }
}

/// A FIFO queue of lots of one kind.
///
/// # Examples
///
/// ```
/// use lotbook_core::{Account, Lot, LotAccount};
/// use rust_decimal_macros::dec;
///
/// let mut account = Account::new("btc");
/// account.deposit(Lot::new(dec!(1), dec!(10000), dec!(300), "btc")).unwrap();
///
/// let withdrawal = account.withdraw(dec!(0.5));
/// assert_eq!(withdrawal.lot.cost, dec!(5000));
/// assert!(!withdrawal.is_short());
/// assert_eq!(account.size(), dec!(0.5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    kind: Kind,
    lots: VecDeque<Lot>,
}

impl Account {
    /// Create an empty account.
    #[must_use]
    pub fn new(kind: impl Into<Kind>) -> Self {
        Self {
            kind: kind.into(),
            lots: VecDeque::new(),
        }
    }

    /// Lots held, oldest first.
    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }

    /// Number of lots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Check if the account holds no lots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Total units held.
    #[must_use]
    pub fn size(&self) -> Decimal {
        self.lots.iter().map(|l| l.size).sum()
    }

    /// Total cost basis held.
    #[must_use]
    pub fn cost(&self) -> Decimal {
        self.lots.iter().map(|l| l.cost).sum()
    }

    /// Total fees attributed to the units held.
    #[must_use]
    pub fn fees(&self) -> Decimal {
        self.lots.iter().map(|l| l.fees).sum()
    }
}

impl LotAccount for Account {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Append a lot at the back of the queue.
    ///
    /// Lots without any units are not queued.
    fn deposit(&mut self, lot: Lot) -> Result<(), AccountError> {
        if lot.kind != self.kind {
            return Err(AccountError::KindMismatch {
                expected: self.kind.clone(),
                got: lot.kind,
            });
        }
        if !lot.is_empty() {
            self.lots.push_back(lot);
        }
        Ok(())
    }

    fn withdraw(&mut self, size: Decimal) -> Withdrawal {
        let mut taken = Lot::zero(self.kind.clone());

        while taken.size < size {
            let Some(front) = self.lots.pop_front() else {
                break;
            };
            let (piece, remainder) = front.split(size - taken.size);
            taken.absorb(&piece);
            if !remainder.is_empty() {
                self.lots.push_front(remainder);
            }
        }

        let shortfall = (size - taken.size).max(Decimal::ZERO);
        Withdrawal {
            lot: taken,
            shortfall,
        }
    }

    fn effective_lot(&self) -> Lot {
        let mut total = Lot::zero(self.kind.clone());
        for lot in &self.lots {
            total.absorb(lot);
        }
        total
    }
}
