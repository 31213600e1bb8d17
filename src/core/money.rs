//! Integer yen amounts.
//!
//! Yen has no minor unit, so every amount is a whole `i64` and no floating point is involved
//! anywhere in the totals pipeline. Arithmetic is checked: an amount that leaves the `i64`
//! range is reported, never wrapped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A whole-yen amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Yen(i64);

impl Yen {
    /// Zero yen
    pub const ZERO: Self = Self(0);

    /// Wraps a raw amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Applies a whole-number percentage and rounds to the nearest yen, ties upward.
    ///
    /// `Yen::new(15).percent(10)` is 2 (1.5 rounds up); `Yen::new(14).percent(10)` is 1.
    /// Returns `None` when the result does not fit in an `i64`.
    #[must_use]
    pub fn percent(self, rate: i64) -> Option<Self> {
        // round(x * rate / 100) == floor((2 * x * rate + 100) / 200), worked in i128
        let scaled = (2 * i128::from(self.0) * i128::from(rate) + 100).div_euclid(200);
        i64::try_from(scaled).ok().map(Self)
    }

    /// Adds two amounts, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Sums amounts, or `None` if any partial sum overflows.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Subtracts `other`, flooring the result at zero.
    #[must_use]
    pub const fn saturating_deduct(self, other: Self) -> Self {
        let rest = self.0.saturating_sub(other.0);
        Self(if rest < 0 { 0 } else { rest })
    }
}

impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "¥{}", self.0)
    }
}

impl From<i64> for Yen {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Yen> for i64 {
    fn from(value: Yen) -> Self {
        value.0
    }
}
