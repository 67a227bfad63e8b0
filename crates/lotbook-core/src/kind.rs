//! Asset kinds and the policy that normalizes them.
//!
//! A [`Kind`] names one asset (`btc`, `eth`, `usd`, ...). Every symbol read from
//! a ledger goes through a [`KindPolicy`] so that `BTC` and `btc` land in the
//! same account when the policy says they should.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// An asset identifier.
///
/// This is a thin wrapper around `Arc<str>` so kinds can be copied into every
/// lot and map key without reallocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kind(Arc<str>);

impl Kind {
    /// Create a kind from a symbol, verbatim.
    ///
    /// Prefer [`KindPolicy::normalize`] for symbols coming from input data.
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    /// Get the string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Kind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Kind {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Kind {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Kind {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// How asset symbols are case-normalized before becoming a [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseNormalization {
    /// Lowercase every symbol (`BTC` -> `btc`).
    #[default]
    Lower,
    /// Uppercase every symbol (`btc` -> `BTC`).
    Upper,
    /// Keep symbols exactly as written.
    Preserve,
}

impl FromStr for CaseNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            "preserve" => Ok(Self::Preserve),
            _ => Err(format!("unknown case normalization: {s}")),
        }
    }
}

impl fmt::Display for CaseNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lower => write!(f, "lower"),
            Self::Upper => write!(f, "upper"),
            Self::Preserve => write!(f, "preserve"),
        }
    }
}

/// Reference currency and symbol normalization used for one run.
///
/// # Examples
///
/// ```
/// use lotbook_core::{CaseNormalization, KindPolicy};
///
/// let policy = KindPolicy::new("USD", CaseNormalization::Lower);
/// assert_eq!(policy.normalize(" BTC "), "btc");
/// assert!(policy.is_reference(&policy.normalize("usd")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindPolicy {
    /// Symbol of the currency gains and costs are expressed in.
    pub reference_currency: String,
    /// Case normalization applied to every symbol.
    pub case: CaseNormalization,
}

impl Default for KindPolicy {
    fn default() -> Self {
        Self {
            reference_currency: "USD".to_string(),
            case: CaseNormalization::default(),
        }
    }
}

impl KindPolicy {
    /// Create a policy.
    pub fn new(reference_currency: impl Into<String>, case: CaseNormalization) -> Self {
        Self {
            reference_currency: reference_currency.into(),
            case,
        }
    }

    /// Turn a raw symbol into a [`Kind`]. Surrounding whitespace is dropped.
    pub fn normalize(&self, symbol: &str) -> Kind {
        let symbol = symbol.trim();
        match self.case {
            CaseNormalization::Lower => Kind::new(symbol.to_lowercase()),
            CaseNormalization::Upper => Kind::new(symbol.to_uppercase()),
            CaseNormalization::Preserve => Kind::new(symbol),
        }
    }

    /// The normalized reference currency.
    pub fn reference(&self) -> Kind {
        self.normalize(&self.reference_currency)
    }

    /// Whether `kind` is the reference currency.
    pub fn is_reference(&self, kind: &Kind) -> bool {
        *kind == self.reference()
    }
}
