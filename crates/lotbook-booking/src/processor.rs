//! FIFO booking of events against per-kind accounts.
//!
//! The [`LedgerProcessor`] owns one [`Account`] per asset kind and one
//! [`BoundaryAccount`] per kind that crosses the ledger boundary. Both are
//! created on first use. Purchases deposit lots, sales withdraw them oldest
//! first and realize the difference between proceeds and matched basis, and
//! transfers carry basis from one account to another.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lotbook_core::{
    Account, AccountError, AccountRef, BoundaryAccount, Decimal, Event, Kind, Lot, LotAccount,
    Transfer, Unrecognized, Withdrawal,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{BookingConfig, BookingReport, Position, RealizedGain, Shortfall};

/// Error that halts a booking run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// The ledger state would become inconsistent.
    #[error("ledger integrity violated: {0}")]
    Integrity(#[from] AccountError),
}

/// Applies events to accounts and collects the results.
#[derive(Debug, Clone)]
pub struct LedgerProcessor {
    accounts: BTreeMap<Kind, Account>,
    boundaries: BTreeMap<Kind, BoundaryAccount>,
    realized: Vec<RealizedGain>,
    shortfalls: Vec<Shortfall>,
    total_profit: Decimal,
    total_fees: Decimal,
    dropped: usize,
    dropped_rows: usize,
}

impl LedgerProcessor {
    /// Create a processor with no accounts.
    ///
    /// The reference currency's boundary is priced at one; configured
    /// overrides are bound up front.
    pub fn new(config: &BookingConfig) -> Self {
        let mut boundaries = BTreeMap::new();
        for (symbol, basis) in &config.boundary_basis {
            let kind = config.kinds.normalize(symbol);
            boundaries.insert(kind.clone(), BoundaryAccount::new(kind, *basis));
        }
        let reference = config.kinds.reference();
        boundaries.insert(
            reference.clone(),
            BoundaryAccount::new(reference, Decimal::ONE),
        );

        Self {
            accounts: BTreeMap::new(),
            boundaries,
            realized: Vec::new(),
            shortfalls: Vec::new(),
            total_profit: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            dropped: 0,
            dropped_rows: 0,
        }
    }

    /// Tracked account of the given kind, if it has been used.
    pub fn account(&self, kind: &str) -> Option<&Account> {
        self.accounts.get(kind)
    }

    /// All tracked accounts, ordered by kind.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Profit realized so far.
    pub const fn total_profit(&self) -> Decimal {
        self.total_profit
    }

    /// Fees realized so far.
    pub const fn total_fees(&self) -> Decimal {
        self.total_fees
    }

    /// Number of unrecognized events seen so far.
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Apply one event.
    ///
    /// Only integrity violations are errors. Unrecognized events and
    /// withdrawals the ledger cannot cover are recorded and logged.
    pub fn process(&mut self, event: Event) -> Result<(), BookingError> {
        debug!(%event, "booking event");
        let result = match event {
            Event::Purchase(lot) => self.purchase(lot),
            Event::Sale(lot) => {
                self.sale(lot);
                Ok(())
            }
            Event::Transfer(transfer) => self.transfer(transfer),
            Event::Unrecognized(unrecognized) => {
                self.drop_event(&unrecognized);
                Ok(())
            }
        };
        result.map_err(|e| {
            warn!(error = %e, "booking halted");
            BookingError::from(e)
        })
    }

    /// Consume the processor and produce the report.
    pub fn finish(self) -> BookingReport {
        let positions = self
            .accounts
            .values()
            .map(|account| {
                let lot = account.effective_lot();
                Position {
                    kind: account.kind().clone(),
                    rate: lot.rate(),
                    lot,
                }
            })
            .collect();

        BookingReport {
            realized: self.realized,
            positions,
            total_profit: self.total_profit,
            total_fees: self.total_fees,
            dropped: self.dropped,
            dropped_rows: self.dropped_rows,
            shortfalls: self.shortfalls,
        }
    }

    fn purchase(&mut self, lot: Lot) -> Result<(), AccountError> {
        let kind = lot.kind.clone();
        self.tracked(&kind).deposit(lot)
    }

    fn sale(&mut self, sale: Lot) {
        let requested = sale.size.abs();
        let withdrawal = self.tracked(&sale.kind).withdraw(requested);
        self.note_shortfall(&sale.kind, sale.date, requested, &withdrawal);

        let matched = withdrawal.lot;
        let profit = sale.cost - matched.cost;
        let fee = matched.fees + sale.fees;
        self.total_profit += profit;
        self.total_fees += fee;

        debug!(kind = %sale.kind, %profit, %fee, "realized");
        self.realized.push(RealizedGain {
            kind: sale.kind,
            date: sale.date,
            size: requested,
            proceeds: sale.cost,
            cost: matched.cost,
            profit,
            fee,
            matched_rate: matched.rate(),
            sale_rate: sale.cost.checked_div(requested),
            shortfall: withdrawal.shortfall,
        });
    }

    /// Move basis from source to destination.
    ///
    /// The destination receives `dest_size` units carrying the withdrawn cost
    /// and fees as is, even when the two sizes differ.
    fn transfer(&mut self, transfer: Transfer) -> Result<(), AccountError> {
        let withdrawal = self.resolve(&transfer.src).withdraw(transfer.src_size);
        self.note_shortfall(
            transfer.src.kind(),
            Some(transfer.date),
            transfer.src_size,
            &withdrawal,
        );

        let withdrawn = withdrawal.lot;
        let lot = Lot {
            size: transfer.dest_size,
            cost: withdrawn.cost,
            fees: withdrawn.fees,
            kind: transfer.dest.kind().clone(),
            date: withdrawn.date.or(Some(transfer.date)),
        };
        self.resolve(&transfer.dest).deposit(lot)
    }

    fn drop_event(&mut self, unrecognized: &Unrecognized) {
        self.dropped += 1;
        self.dropped_rows += unrecognized.rows;
        warn!(
            rows = unrecognized.rows,
            reason = %unrecognized.reason,
            "dropping unrecognized rows"
        );
    }

    fn note_shortfall(
        &mut self,
        kind: &Kind,
        date: Option<DateTime<Utc>>,
        requested: Decimal,
        withdrawal: &Withdrawal,
    ) {
        if !withdrawal.is_short() {
            return;
        }
        warn!(
            %kind,
            %requested,
            missing = %withdrawal.shortfall,
            "withdrawal exceeds holdings"
        );
        self.shortfalls.push(Shortfall {
            kind: kind.clone(),
            date,
            requested,
            missing: withdrawal.shortfall,
        });
    }

    fn tracked(&mut self, kind: &Kind) -> &mut Account {
        self.accounts
            .entry(kind.clone())
            .or_insert_with(|| Account::new(kind.clone()))
    }

    fn resolve(&mut self, target: &AccountRef) -> &mut dyn LotAccount {
        match target {
            AccountRef::Tracked(kind) => self.tracked(kind),
            AccountRef::Boundary(kind) => self
                .boundaries
                .entry(kind.clone())
                .or_insert_with(|| BoundaryAccount::unknown_origin(kind.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, day, 0, 0, 0).unwrap()
    }

    fn processor() -> LedgerProcessor {
        LedgerProcessor::new(&BookingConfig::default())
    }

    fn buy(size: Decimal, cost: Decimal, fees: Decimal) -> Event {
        Event::Purchase(Lot::new(size, cost, fees, "btc"))
    }

    fn sell(size: Decimal, proceeds: Decimal, fees: Decimal) -> Event {
        Event::Sale(Lot::new(-size, proceeds, fees, "btc"))
    }

    #[test]
    fn test_purchase_then_sale() {
        let mut p = processor();
        p.process(buy(dec!(1), dec!(10000), dec!(300))).unwrap();
        p.process(sell(dec!(0.5), dec!(6000), dec!(20))).unwrap();

        assert_eq!(p.total_profit(), dec!(1000));
        assert_eq!(p.total_fees(), dec!(170));

        let report = p.finish();
        assert_eq!(report.realized.len(), 1);
        let gain = &report.realized[0];
        assert_eq!(gain.size, dec!(0.5));
        assert_eq!(gain.cost, dec!(5000));
        assert_eq!(gain.matched_rate, Some(dec!(10000)));
        assert_eq!(gain.sale_rate, Some(dec!(12000)));
        assert_eq!(gain.shortfall, dec!(0));

        let btc = report.position("btc").unwrap();
        assert_eq!(btc.lot.size, dec!(0.5));
        assert_eq!(btc.lot.cost, dec!(5000));
        assert!(report.is_complete());
    }

    #[test]
    fn test_sale_matches_oldest_lots_first() {
        let mut p = processor();
        p.process(buy(dec!(1), dec!(10000), dec!(300))).unwrap();
        p.process(buy(dec!(0.3), dec!(10000), dec!(200))).unwrap();
        p.process(sell(dec!(1.1), dec!(15000), dec!(0))).unwrap();

        let report = p.finish();
        let gain = &report.realized[0];
        assert!((gain.cost - dec!(13333.333)).abs() < dec!(0.001));
        assert!((gain.fee - dec!(366.667)).abs() < dec!(0.001));

        let btc = report.position("btc").unwrap();
        assert_eq!(btc.lot.size, dec!(0.2));
        assert!((btc.lot.cost - dec!(6666.667)).abs() < dec!(0.001));
    }

    #[test]
    fn test_sale_without_holdings_reports_shortfall() {
        let mut p = processor();
        p.process(buy(dec!(0.5), dec!(4000), dec!(0))).unwrap();
        p.process(sell(dec!(2), dec!(20000), dec!(0))).unwrap();

        let report = p.finish();
        assert_eq!(report.realized[0].shortfall, dec!(1.5));
        assert_eq!(report.shortfalls.len(), 1);
        assert_eq!(report.shortfalls[0].requested, dec!(2));
        assert_eq!(report.shortfalls[0].missing, dec!(1.5));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_inbound_transfer_uses_boundary_basis() {
        let config = BookingConfig::default().boundary_basis("BTC", dec!(3500));
        let mut p = LedgerProcessor::new(&config);
        p.process(Event::Transfer(Transfer::inbound(
            Kind::from("btc"),
            dec!(2),
            date(1),
        )))
        .unwrap();

        let btc = p.account("btc").unwrap();
        assert_eq!(btc.cost(), dec!(7000));
        let lot = btc.lots().next().unwrap();
        assert_eq!(lot.date, Some(date(1)));
    }

    #[test]
    fn test_unknown_origin_arrives_at_zero_basis() {
        let mut p = processor();
        p.process(Event::Transfer(Transfer::inbound(
            Kind::from("eth"),
            dec!(10),
            date(1),
        )))
        .unwrap();
        p.process(Event::Sale(Lot::new(dec!(-10), dec!(1500), dec!(0), "eth")))
            .unwrap();
        assert_eq!(p.total_profit(), dec!(1500));
    }

    #[test]
    fn test_reference_currency_boundary_is_worth_one() {
        let mut p = processor();
        p.process(Event::Transfer(Transfer::inbound(
            Kind::from("usd"),
            dec!(1000),
            date(1),
        )))
        .unwrap();
        assert_eq!(p.account("usd").unwrap().cost(), dec!(1000));
    }

    #[test]
    fn test_outbound_transfer_discards_units() {
        let mut p = processor();
        p.process(buy(dec!(1), dec!(10000), dec!(0))).unwrap();
        p.process(Event::Transfer(Transfer::outbound(
            Kind::from("btc"),
            dec!(0.4),
            date(2),
        )))
        .unwrap();

        let report = p.finish();
        assert_eq!(report.position("btc").unwrap().lot.size, dec!(0.6));
        assert!(report.realized.is_empty());
    }

    #[test]
    fn test_conversion_carries_basis_unscaled() {
        let mut p = processor();
        p.process(Event::Purchase(
            Lot::new(dec!(1), dec!(4000), dec!(10), "btc").with_date(date(1)),
        ))
        .unwrap();
        p.process(Event::Transfer(Transfer {
            src: AccountRef::Tracked(Kind::from("btc")),
            src_size: dec!(1),
            dest: AccountRef::Tracked(Kind::from("eth")),
            dest_size: dec!(30),
            date: date(5),
        }))
        .unwrap();

        let eth = p.account("eth").unwrap();
        assert_eq!(eth.size(), dec!(30));
        assert_eq!(eth.cost(), dec!(4000));
        assert_eq!(eth.fees(), dec!(10));
        assert_eq!(eth.lots().next().unwrap().date, Some(date(1)));
        assert!(p.account("btc").unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_is_counted() {
        let mut p = processor();
        p.process(Event::Unrecognized(Unrecognized::new("missing asset leg", 2)))
            .unwrap();
        assert_eq!(p.dropped(), 1);
        let report = p.finish();
        assert_eq!(report.dropped_rows, 2);
        assert!(report.positions.is_empty());
    }

    #[test]
    fn test_integrity_error_display() {
        let err = BookingError::from(AccountError::KindMismatch {
            expected: Kind::from("btc"),
            got: Kind::from("eth"),
        });
        assert_eq!(
            err.to_string(),
            "ledger integrity violated: cannot deposit eth into account of kind btc"
        );
    }
}
