use std::{fmt::Display, iter::Sum, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// Number of ledger units in one credit. Balances and prices are stored as integer ledger units, so all arithmetic is
/// exact apart from the single rounding step in [`Credits::per_thousand`].
pub const CREDIT_SCALE: i64 = 1_000_000;
const DECIMALS: usize = 6;

//--------------------------------------       Credits        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Credits(i64);

op!(binary Credits, Add, add);
op!(binary Credits, Sub, sub);
op!(inplace Credits, AddAssign, add_assign);
op!(inplace Credits, SubAssign, sub_assign);
op!(unary Credits, Neg, neg);

/// Saturates instead of wrapping. Use [`Credits::checked_sum`] where an out-of-range total must be refused.
impl Sum for Credits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| Self(acc.0.saturating_add(c.0)))
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in credits: {0}")]
pub struct CreditsConversionError(String);

impl From<i64> for Credits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Credits {
    /// The raw number of ledger units.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole(credits: i64) -> Self {
        Self(credits.saturating_mul(CREDIT_SCALE))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Adds up the amounts, or returns `None` if the total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(iter: I) -> Option<Self> {
        iter.into_iter().try_fold(Self::zero(), Self::checked_add)
    }

    /// Treats `self` as a price per 1000 units and returns the cost of `quantity` units.
    ///
    /// Fractions of a ledger unit are rounded up so the shop never undercharges. The result saturates rather than
    /// overflowing, which makes absurd quantities unaffordable instead of cheap.
    pub fn per_thousand(&self, quantity: u64) -> Self {
        if self.0 <= 0 || quantity == 0 {
            return Self(0);
        }
        let units = (i128::from(self.0) * i128::from(quantity) + 999) / 1000;
        Self(i64::try_from(units).unwrap_or(i64::MAX))
    }

    /// Multiplies by a decimal conversion rate, e.g. to show a balance in a display currency.
    pub fn to_f64_at_rate(&self, rate: f64) -> f64 {
        self.0 as f64 / CREDIT_SCALE as f64 * rate
    }
}

impl Display for Credits {
    /// Always shows at least two decimal places and never more than needed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / CREDIT_SCALE as u64;
        let frac = format!("{:0width$}", abs % CREDIT_SCALE as u64, width = DECIMALS);
        let trimmed = frac.trim_end_matches('0');
        let frac = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
        write!(f, "{sign}{whole}.{frac}")
    }
}

impl FromStr for Credits {
    type Err = CreditsConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || CreditsConversionError(s.to_string());
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if frac.len() > DECIMALS || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| err())? };
        let frac = format!("{frac:0<width$}", width = DECIMALS).parse::<i64>().map_err(|_| err())?;
        let value = whole.checked_mul(CREDIT_SCALE).and_then(|w| w.checked_add(frac)).ok_or_else(err)?;
        Ok(Self(if negative { -value } else { value }))
    }
}
