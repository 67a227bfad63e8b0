//! Typed ledger rows.
//!
//! A [`Row`] is one line of an exchange account statement after validation.
//! Raw text is checked once, by [`Row::parse`]; everything downstream works on
//! parsed amounts, normalized kinds and real timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{Kind, KindPolicy};

/// What a ledger row records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    /// One leg of a matched trade.
    Match,
    /// Fee charged for a trade.
    Fee,
    /// Funds arriving from outside the ledger.
    Deposit,
    /// Funds leaving the ledger.
    Withdrawal,
    /// Anything else (kept verbatim, never classified).
    Other(String),
}

impl FromStr for RowType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "match" => Self::Match,
            "fee" => Self::Fee,
            "deposit" => Self::Deposit,
            "withdrawal" => Self::Withdrawal,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Fee => write!(f, "fee"),
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Error validating a raw row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The amount is not a decimal number.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    /// The timestamp matches none of the accepted formats.
    #[error("invalid time '{0}'")]
    InvalidTime(String),
    /// The unit column is blank.
    #[error("missing unit")]
    EmptyUnit,
}

/// A validated ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// What the row records
    pub row_type: RowType,
    /// Trade the row belongs to; `None` for rows outside any trade
    pub trade_id: Option<String>,
    /// Signed amount (positive = into the ledger)
    pub amount: Decimal,
    /// Asset the amount is denominated in
    pub unit: Kind,
    /// When the row was recorded
    pub time: DateTime<Utc>,
}

impl Row {
    /// Create a row from already-typed values.
    pub fn new(
        row_type: RowType,
        trade_id: Option<String>,
        amount: Decimal,
        unit: impl Into<Kind>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            row_type,
            trade_id,
            amount,
            unit: unit.into(),
            time,
        }
    }

    /// Validate raw string fields into a row.
    ///
    /// An empty trade id means the row belongs to no trade. The unit is
    /// normalized through `policy`.
    pub fn parse(
        row_type: &str,
        trade_id: &str,
        amount: &str,
        unit: &str,
        time: &str,
        policy: &KindPolicy,
    ) -> Result<Self, RowError> {
        let row_type = RowType::from_str(row_type).unwrap_or_else(|never| match never {});

        let trade_id = Some(trade_id.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let amount = parse_amount(amount)?;

        if unit.trim().is_empty() {
            return Err(RowError::EmptyUnit);
        }
        let unit = policy.normalize(unit);

        let time = parse_time(time)?;

        Ok(Self {
            row_type,
            trade_id,
            amount,
            unit,
            time,
        })
    }

    /// Grouping key: the trade id, or `None` for standalone rows.
    pub fn group_key(&self) -> Option<String> {
        self.trade_id.clone()
    }
}

fn parse_amount(s: &str) -> Result<Decimal, RowError> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| RowError::InvalidAmount(s.to_string()))
}

/// Parse a timestamp.
///
/// Accepts RFC 3339 (`2019-01-16T18:16:57.229Z`), `YYYY-MM-DD HH:MM:SS[.f]`
/// (taken as UTC) and plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, RowError> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RowError::InvalidTime(s.to_string()))
}
