//! Integer price representation.
//!
//! The store API quotes every amount as a whole number of the smallest
//! currency unit, so no decimal arithmetic is needed on the client.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// An amount in the store currency's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units, saturating at the numeric bounds.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Sum of two prices, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Formats with thousands separators, e.g. `12,500`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            write!(f, "-{grouped}")
        } else {
            f.write_str(&grouped)
        }
    }
}
