//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for ledger types that give more
//! meaningful failure messages than plain `assert_eq!`.

use core_kernel::within_tolerance;
use domain_ledger::{JournalEntry, LedgerError, LedgerProjection, ValidationError};
use rust_decimal::Decimal;

/// Asserts that two amounts differ by no more than `tolerance`
pub fn assert_amount_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that an entry's debits and credits agree within the balance tolerance
pub fn assert_balanced(entry: &JournalEntry) {
    let debits = entry.total_debit();
    let credits = entry.total_credit();
    assert!(
        within_tolerance(debits, credits),
        "Entry {} is unbalanced: debits={}, credits={}",
        entry.entry_number,
        debits,
        credits
    );
}

/// Asserts that every line moves exactly one side
pub fn assert_lines_exclusive(entry: &JournalEntry) {
    for (index, line) in entry.lines.iter().enumerate() {
        let debit = line.debit > Decimal::ZERO;
        let credit = line.credit > Decimal::ZERO;
        assert!(
            debit != credit,
            "Line {} of entry {} must have exactly one of debit/credit: debit={}, credit={}",
            index + 1,
            entry.entry_number,
            line.debit,
            line.credit
        );
    }
}

/// Asserts the running balances of a projection in order
pub fn assert_running_balances(projection: &LedgerProjection<'_>, expected: &[Decimal]) {
    let actual: Vec<Decimal> = projection.movements().map(|m| m.running_balance).collect();
    assert_eq!(
        actual, expected,
        "Running balances differ: actual={:?}, expected={:?}",
        actual, expected
    );
}

/// Asserts that a result is a validation rejection whose first violation is `rule`
///
/// # Panics
///
/// Panics if the result is `Ok`, a non-validation error, or a different first rule
pub fn assert_rejected_with<T: std::fmt::Debug>(result: &Result<T, LedgerError>, rule: &str) {
    match result {
        Err(LedgerError::Validation(errors)) => assert_eq!(
            errors.first().rule(),
            rule,
            "Expected first violation {}, got: {}",
            rule,
            errors
        ),
        other => panic!("Expected validation rejection {}, got {:?}", rule, other),
    }
}

/// Asserts that a list of violations contains `expected`
pub fn assert_has_violation(errors: &[ValidationError], expected: &ValidationError) {
    assert!(
        errors.contains(expected),
        "Expected violation {:?} in {:?}",
        expected,
        errors
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::JournalEntryBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assert_amount_approx_eq_passes() {
        assert_amount_approx_eq(dec!(100.00), dec!(100.01), dec!(0.01));
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_assert_amount_approx_eq_fails() {
        assert_amount_approx_eq(dec!(100.00), dec!(100.02), dec!(0.01));
    }

    #[test]
    fn test_assert_balanced_default_entry() {
        let entry = JournalEntryBuilder::new().build();
        assert_balanced(&entry);
        assert_lines_exclusive(&entry);
    }

    #[test]
    #[should_panic(expected = "is unbalanced")]
    fn test_assert_balanced_fails() {
        let entry = JournalEntryBuilder::new()
            .debit("1011", dec!(100))
            .credit("7011", dec!(99.98))
            .build();
        assert_balanced(&entry);
    }
}
