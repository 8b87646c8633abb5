//! Significant change record.

use pricewatch_core::{Price, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One symbol whose price moved beyond the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignificantChange {
    pub symbol: Symbol,
    /// Signed move in percent, `(new - previous) / previous * 100`.
    pub change_percent: Decimal,
    pub previous_price: Price,
    pub new_price: Price,
}

impl SignificantChange {
    pub fn is_rise(&self) -> bool {
        self.change_percent.is_sign_positive() && !self.change_percent.is_zero()
    }

    /// Change rounded to two decimal places for display.
    pub fn rounded_percent(&self) -> Decimal {
        self.change_percent.round_dp(2)
    }
}
