//! Precision-safe decimal price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic so that percentage
//! moves computed from quoted prices are reproducible and never drift
//! through floating-point rounding.

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quoted price with exact decimal precision.
///
/// A `Price` is always non-negative; construct through [`Price::try_new`]
/// or [`FromStr`] when the value comes from outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative values.
    pub fn try_new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidPrice(format!("negative price {value}")));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Percentage difference of `self` relative to `previous`.
    ///
    /// Returns `None` when `previous` is zero or the ratio exceeds the
    /// decimal range (a near-zero `previous`).
    #[inline]
    pub fn pct_from(&self, previous: Price) -> Option<Decimal> {
        if previous.is_zero() {
            return None;
        }
        self.0
            .checked_sub(previous.0)?
            .checked_div(previous.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Decimal = s.trim().parse()?;
        Self::try_new(value)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CoreError;

    fn try_from(d: Decimal) -> Result<Self> {
        Self::try_new(d)
    }
}
