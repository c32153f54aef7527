//! Decimal amount helpers
//!
//! Ledger amounts are plain `rust_decimal::Decimal` values in a single
//! currency. This module holds the shared rounding rules, the tolerance used
//! by the balance check, and the subtotal/tax/total breakdown applied to sales
//! and purchasing documents.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of decimal places amounts are displayed and stored with
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Largest amount one journal line may carry: 9_999_999_999_999_999.99,
/// the top of a `NUMERIC(18,2)` column
///
/// With every line below this bound, totals over any realistic number of
/// lines stay far inside `Decimal` range.
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// Largest difference between total debits and total credits that still
/// counts as balanced (0.01 currency units)
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Peruvian general sales tax (IGV), 18%
pub const IGV_RATE: Rate = Rate::from_decimal(Decimal::from_parts(18, 0, 0, false, 2));

/// Errors that can occur during amount operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// Rounds an amount to the standard two decimal places (half away from zero)
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        AMOUNT_DECIMAL_PLACES,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Returns true if the amount has no digits beyond [`AMOUNT_DECIMAL_PLACES`]
///
/// Trailing zeros do not count: `1.500` qualifies, `0.005` does not.
pub fn has_amount_precision(amount: Decimal) -> bool {
    round_amount(amount) == amount
}

/// Returns true if two amounts differ by no more than [`BALANCE_TOLERANCE`]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= BALANCE_TOLERANCE
}

/// Sums a sequence of amounts, failing instead of panicking on overflow
pub fn checked_sum<I>(amounts: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(MoneyError::Overflow)
}

/// Represents a percentage rate (e.g., a sales tax rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.18 for 18%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.18 for 18%)
    pub const fn from_decimal(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 18 for 18%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to an amount
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}

/// Subtotal, tax and total of a commercial document
///
/// Quotes, sales orders, purchase orders and invoices all compute their
/// totals the same way: the tax is a flat rate over the subtotal. The ledger
/// itself never calls this; it is exported for the document services built
/// on top of the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Computes the breakdown for a subtotal at the given rate
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` for a negative subtotal
    pub fn from_subtotal(subtotal: Decimal, rate: Rate) -> Result<Self, MoneyError> {
        if subtotal.is_sign_negative() && !subtotal.is_zero() {
            return Err(MoneyError::InvalidAmount(format!(
                "subtotal must not be negative, got {}",
                subtotal
            )));
        }

        let subtotal = round_amount(subtotal);
        let tax = subtotal
            .checked_mul(rate.as_decimal())
            .map(round_amount)
            .ok_or(MoneyError::Overflow)?;
        let total = subtotal.checked_add(tax).ok_or(MoneyError::Overflow)?;

        Ok(Self {
            subtotal,
            tax,
            total,
        })
    }

    /// Computes the breakdown from `(quantity, unit_price)` document lines
    ///
    /// # Errors
    ///
    /// Returns an error if a quantity or price is negative, or on overflow
    pub fn from_lines<I>(lines: I, rate: Rate) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        let mut subtotal = Decimal::ZERO;
        for (quantity, unit_price) in lines {
            if quantity.is_sign_negative() || unit_price.is_sign_negative() {
                return Err(MoneyError::InvalidAmount(format!(
                    "line {} x {} has a negative component",
                    quantity, unit_price
                )));
            }
            let line_total = quantity.checked_mul(unit_price).ok_or(MoneyError::Overflow)?;
            subtotal = subtotal.checked_add(line_total).ok_or(MoneyError::Overflow)?;
        }

        Self::from_subtotal(subtotal, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.01));
        assert_eq!(IGV_RATE.as_percentage(), dec!(18));
    }

    #[test]
    fn test_within_tolerance_boundary() {
        assert!(within_tolerance(dec!(100.00), dec!(99.99)));
        assert!(!within_tolerance(dec!(100.00), dec!(99.98)));
    }

    #[test]
    fn test_amount_precision() {
        assert!(has_amount_precision(dec!(118.00)));
        assert!(has_amount_precision(dec!(1.500)));
        assert!(!has_amount_precision(dec!(0.005)));
        assert!(!has_amount_precision(dec!(10.001)));
    }

    #[test]
    fn test_max_line_amount_fits_numeric_18_2() {
        assert_eq!(MAX_LINE_AMOUNT, dec!(9999999999999999.99));
        assert!(has_amount_precision(MAX_LINE_AMOUNT));
    }

    #[test]
    fn test_breakdown_overflow_is_an_error() {
        assert_eq!(
            TaxBreakdown::from_subtotal(Decimal::MAX, IGV_RATE),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn test_igv_breakdown() {
        let breakdown = TaxBreakdown::from_subtotal(dec!(100), IGV_RATE).unwrap();
        assert_eq!(breakdown.tax, dec!(18.00));
        assert_eq!(breakdown.total, dec!(118.00));
    }
}
