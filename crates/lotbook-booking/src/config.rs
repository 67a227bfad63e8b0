//! Booking configuration.

use crate::FiatConvention;
use lotbook_core::{Decimal, KindPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for a booking run.
///
/// Deserializes from a partial document; missing fields take their defaults.
///
/// ```json
/// {
///   "kinds": { "reference_currency": "EUR", "case": "upper" },
///   "convention": "inflow_is_purchase",
///   "boundary_basis": { "BTC": "3500" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Reference currency and symbol normalization.
    pub kinds: KindPolicy,
    /// Sign convention of the reference-currency leg.
    pub convention: FiatConvention,
    /// Per-unit basis of units arriving from outside the ledger, by symbol.
    ///
    /// Kinds not listed here arrive at zero basis, except the reference
    /// currency which is always worth one.
    pub boundary_basis: BTreeMap<String, Decimal>,
}

impl BookingConfig {
    /// Create a configuration with the given kind policy.
    pub fn new(kinds: KindPolicy) -> Self {
        Self {
            kinds,
            ..Self::default()
        }
    }

    /// Set the sign convention.
    #[must_use]
    pub fn convention(mut self, convention: FiatConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Price external arrivals of `symbol` at `basis` per unit.
    #[must_use]
    pub fn boundary_basis(mut self, symbol: impl Into<String>, basis: Decimal) -> Self {
        self.boundary_basis.insert(symbol.into(), basis);
        self
    }
}
