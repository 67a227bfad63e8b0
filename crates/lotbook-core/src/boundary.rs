//! Boundary accounts: the world outside the tracked ledger.
//!
//! Funds arriving from an external wallet or bank come out of a
//! [`BoundaryAccount`], and funds leaving the ledger go into one. A boundary
//! account never runs dry and forgets everything deposited into it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountError, Kind, Lot, LotAccount, Withdrawal};

/// Infinite source and discarding sink at a fixed per-unit basis.
///
/// # Examples
///
/// ```
/// use lotbook_core::{BoundaryAccount, LotAccount};
/// use rust_decimal_macros::dec;
///
/// let mut usd = BoundaryAccount::new("usd", dec!(1));
/// let withdrawal = usd.withdraw(dec!(250));
/// assert_eq!(withdrawal.lot.cost, dec!(250));
/// assert_eq!(usd.effective_lot().size, dec!(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryAccount {
    kind: Kind,
    basis: Decimal,
}

impl BoundaryAccount {
    /// Create a boundary account that prices every unit at `basis`.
    #[must_use]
    pub fn new(kind: impl Into<Kind>, basis: Decimal) -> Self {
        Self {
            kind: kind.into(),
            basis,
        }
    }

    /// Boundary for assets whose external cost is unknown.
    #[must_use]
    pub fn unknown_origin(kind: impl Into<Kind>) -> Self {
        Self::new(kind, Decimal::ZERO)
    }

    /// Cost assigned to each unit leaving this account.
    #[must_use]
    pub const fn basis(&self) -> Decimal {
        self.basis
    }
}

impl LotAccount for BoundaryAccount {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Discard the lot.
    fn deposit(&mut self, _lot: Lot) -> Result<(), AccountError> {
        Ok(())
    }

    fn withdraw(&mut self, size: Decimal) -> Withdrawal {
        Withdrawal {
            lot: Lot::new(size, size * self.basis, Decimal::ZERO, self.kind.clone()),
            shortfall: Decimal::ZERO,
        }
    }

    fn effective_lot(&self) -> Lot {
        Lot::zero(self.kind.clone())
    }

    fn is_boundary(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_withdraw_synthesizes_at_basis() {
        let mut account = BoundaryAccount::new("usd", dec!(1));
        let first = account.withdraw(dec!(100));
        let second = account.withdraw(dec!(100));
        assert_eq!(first.lot, Lot::new(dec!(100), dec!(100), dec!(0), "usd"));
        assert_eq!(first, second);
        assert!(!first.is_short());
    }

    #[test]
    fn test_unknown_origin_has_zero_cost() {
        let mut account = BoundaryAccount::unknown_origin("btc");
        let withdrawal = account.withdraw(dec!(5));
        assert_eq!(withdrawal.lot.size, dec!(5));
        assert_eq!(withdrawal.lot.cost, dec!(0));
        assert_eq!(account.basis(), dec!(0));
    }

    #[test]
    fn test_deposit_is_discarded() {
        let mut account = BoundaryAccount::unknown_origin("btc");
        account
            .deposit(Lot::new(dec!(3), dec!(900), dec!(9), "btc"))
            .unwrap();
        assert_eq!(account.effective_lot(), Lot::zero("btc"));
        assert!(account.is_boundary());
    }
}
