//! Journal entry validation
//!
//! A candidate entry (header plus lines) is checked against the owner's
//! account catalog and existing entries before anything is persisted. The
//! rules run in a fixed order and every violation is collected, so callers
//! can show all problems at once while still relying on [`ValidationErrors::first`]
//! to report the highest-priority one.
//!
//! Rule order:
//!
//! 1. the entry has at least one line
//! 2. total debits equal total credits within [`BALANCE_TOLERANCE`]
//! 3. no negative amounts, at most two decimal places, no amount above
//!    [`MAX_LINE_AMOUNT`], no line with both a debit and a credit
//! 4. no line with neither a debit nor a credit
//! 5. every line names an account
//! 6. every named account exists and is active
//! 7. no line posts to a summary account
//! 8. the entry number is present and unique for the owner

use core_kernel::{
    checked_sum, has_amount_precision, EntryId, AMOUNT_DECIMAL_PLACES, BALANCE_TOLERANCE,
    MAX_LINE_AMOUNT,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::catalog::AccountCatalog;
use crate::entry::{EntryDraft, JournalEntry, JournalLine};

/// A single rule violation
///
/// `index` fields are zero-based positions in the line list; messages show
/// them one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationError {
    NoLines,
    UnbalancedEntry { debits: Decimal, credits: Decimal },
    AmountOverflow,
    NegativeAmount { index: usize },
    AmountPrecision { index: usize },
    AmountTooLarge { index: usize },
    AmbiguousLine { index: usize },
    EmptyLine { index: usize },
    MissingAccount { index: usize },
    UnknownAccount { index: usize, code: String },
    InactiveAccount { index: usize, code: String },
    SummaryAccountPosting { index: usize, code: String },
    MissingEntryNumber,
    DuplicateEntryNumber { entry_number: String },
}

impl ValidationError {
    /// Stable machine-readable name of the violated rule
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::NoLines => "no_lines",
            ValidationError::UnbalancedEntry { .. } => "unbalanced_entry",
            ValidationError::AmountOverflow => "amount_overflow",
            ValidationError::NegativeAmount { .. } => "negative_amount",
            ValidationError::AmountPrecision { .. } => "amount_precision",
            ValidationError::AmountTooLarge { .. } => "amount_too_large",
            ValidationError::AmbiguousLine { .. } => "ambiguous_line",
            ValidationError::EmptyLine { .. } => "empty_line",
            ValidationError::MissingAccount { .. } => "missing_account",
            ValidationError::UnknownAccount { .. } => "unknown_account",
            ValidationError::InactiveAccount { .. } => "inactive_account",
            ValidationError::SummaryAccountPosting { .. } => "summary_account_posting",
            ValidationError::MissingEntryNumber => "missing_entry_number",
            ValidationError::DuplicateEntryNumber { .. } => "duplicate_entry_number",
        }
    }

    /// Zero-based line the violation refers to, if any
    pub fn line_index(&self) -> Option<usize> {
        match self {
            ValidationError::NegativeAmount { index }
            | ValidationError::AmountPrecision { index }
            | ValidationError::AmountTooLarge { index }
            | ValidationError::AmbiguousLine { index }
            | ValidationError::EmptyLine { index }
            | ValidationError::MissingAccount { index }
            | ValidationError::UnknownAccount { index, .. }
            | ValidationError::InactiveAccount { index, .. }
            | ValidationError::SummaryAccountPosting { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoLines => write!(f, "Entry has no lines"),
            ValidationError::UnbalancedEntry { debits, credits } => write!(
                f,
                "Entry is unbalanced: debits {} and credits {} differ by {}",
                debits,
                credits,
                (debits - credits).abs()
            ),
            ValidationError::AmountOverflow => write!(f, "Line amounts are too large to total"),
            ValidationError::NegativeAmount { index } => {
                write!(f, "Line {} has a negative amount", index + 1)
            }
            ValidationError::AmountPrecision { index } => write!(
                f,
                "Line {} has more than {} decimal places",
                index + 1,
                AMOUNT_DECIMAL_PLACES
            ),
            ValidationError::AmountTooLarge { index } => write!(
                f,
                "Line {} exceeds the largest line amount {}",
                index + 1,
                MAX_LINE_AMOUNT
            ),
            ValidationError::AmbiguousLine { index } => {
                write!(f, "Line {} has both a debit and a credit", index + 1)
            }
            ValidationError::EmptyLine { index } => {
                write!(f, "Line {} has neither a debit nor a credit", index + 1)
            }
            ValidationError::MissingAccount { index } => {
                write!(f, "Line {} has no account", index + 1)
            }
            ValidationError::UnknownAccount { index, code } => {
                write!(f, "Line {} references unknown account {}", index + 1, code)
            }
            ValidationError::InactiveAccount { index, code } => {
                write!(f, "Line {} references inactive account {}", index + 1, code)
            }
            ValidationError::SummaryAccountPosting { index, code } => write!(
                f,
                "Line {} posts to summary account {}; only leaf accounts accept movements",
                index + 1,
                code
            ),
            ValidationError::MissingEntryNumber => write!(f, "Entry number is required"),
            ValidationError::DuplicateEntryNumber { entry_number } => {
                write!(f, "Entry number {} is already in use", entry_number)
            }
        }
    }
}

/// Every violation found for one candidate, ordered by rule then line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// The highest-priority violation
    pub fn first(&self) -> &ValidationError {
        // Never constructed empty
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rules(&self) -> Vec<&'static str> {
        self.0.iter().map(ValidationError::rule).collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Validates candidates against one owner's catalog and entries
pub struct EntryValidator<'a> {
    catalog: &'a AccountCatalog,
    existing: &'a [JournalEntry],
}

impl<'a> EntryValidator<'a> {
    /// Creates a validator
    ///
    /// # Arguments
    ///
    /// * `catalog` - The owner's full chart of accounts
    /// * `existing` - The owner's stored entries, used for entry number uniqueness
    pub fn new(catalog: &'a AccountCatalog, existing: &'a [JournalEntry]) -> Self {
        Self { catalog, existing }
    }

    /// Validates a candidate
    ///
    /// `editing` is the id of the entry being edited, which is excluded from
    /// the uniqueness check so an entry may keep its own number.
    ///
    /// # Errors
    ///
    /// Returns every violation, ordered by rule then line
    pub fn validate(&self, draft: &EntryDraft, editing: Option<EntryId>) -> Result<(), ValidationErrors> {
        self.check(&draft.entry_number, &draft.lines, editing)
    }

    /// Re-validates a stored entry, e.g. before posting it
    pub fn validate_entry(&self, entry: &JournalEntry) -> Result<(), ValidationErrors> {
        self.check(&entry.entry_number, &entry.lines, Some(entry.id))
    }

    fn check(
        &self,
        entry_number: &str,
        lines: &[JournalLine],
        editing: Option<EntryId>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if lines.is_empty() {
            errors.push(ValidationError::NoLines);
        }

        check_balance(lines, &mut errors);

        for (index, line) in lines.iter().enumerate() {
            if is_negative(line) {
                errors.push(ValidationError::NegativeAmount { index });
            } else if !has_amount_precision(line.debit) || !has_amount_precision(line.credit) {
                errors.push(ValidationError::AmountPrecision { index });
            } else if line.debit > MAX_LINE_AMOUNT || line.credit > MAX_LINE_AMOUNT {
                errors.push(ValidationError::AmountTooLarge { index });
            } else if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
                errors.push(ValidationError::AmbiguousLine { index });
            }
        }

        for (index, line) in lines.iter().enumerate() {
            if !is_negative(line) && line.debit.is_zero() && line.credit.is_zero() {
                errors.push(ValidationError::EmptyLine { index });
            }
        }

        for (index, line) in lines.iter().enumerate() {
            if line.account_code.trim().is_empty() {
                errors.push(ValidationError::MissingAccount { index });
            }
        }

        for (index, line) in lines.iter().enumerate() {
            let code = line.account_code.as_str();
            if code.trim().is_empty() {
                continue;
            }
            match self.catalog.get(code) {
                None => errors.push(ValidationError::UnknownAccount {
                    index,
                    code: code.to_string(),
                }),
                Some(account) if !account.active => errors.push(ValidationError::InactiveAccount {
                    index,
                    code: code.to_string(),
                }),
                Some(_) => {}
            }
        }

        for (index, line) in lines.iter().enumerate() {
            let code = line.account_code.as_str();
            if self.catalog.contains(code) && !self.catalog.is_leaf(code) {
                errors.push(ValidationError::SummaryAccountPosting {
                    index,
                    code: code.to_string(),
                });
            }
        }

        if entry_number.trim().is_empty() {
            errors.push(ValidationError::MissingEntryNumber);
        } else if self
            .existing
            .iter()
            .any(|entry| entry.entry_number == entry_number && Some(entry.id) != editing)
        {
            errors.push(ValidationError::DuplicateEntryNumber {
                entry_number: entry_number.to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Validates a candidate entry; see [`EntryValidator::validate`]
pub fn validate(
    draft: &EntryDraft,
    editing: Option<EntryId>,
    catalog: &AccountCatalog,
    existing: &[JournalEntry],
) -> Result<(), ValidationErrors> {
    EntryValidator::new(catalog, existing).validate(draft, editing)
}

fn is_negative(line: &JournalLine) -> bool {
    line.debit < Decimal::ZERO || line.credit < Decimal::ZERO
}

fn check_balance(lines: &[JournalLine], errors: &mut Vec<ValidationError>) {
    let debits = checked_sum(lines.iter().map(|l| l.debit));
    let credits = checked_sum(lines.iter().map(|l| l.credit));

    match (debits, credits) {
        (Ok(debits), Ok(credits)) => match debits.checked_sub(credits) {
            Some(diff) if diff.abs() <= BALANCE_TOLERANCE => {}
            Some(_) => errors.push(ValidationError::UnbalancedEntry { debits, credits }),
            None => errors.push(ValidationError::AmountOverflow),
        },
        _ => errors.push(ValidationError::AmountOverflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use chrono::NaiveDate;
    use core_kernel::OwnerId;
    use rust_decimal_macros::dec;

    fn catalog() -> AccountCatalog {
        AccountCatalog::new(vec![
            Account::new("10", "Cash", AccountKind::Asset),
            Account::new("1011", "Cash on hand", AccountKind::Asset),
            Account::new("70", "Sales", AccountKind::Income),
            Account::new("7011", "Domestic sales", AccountKind::Income),
            Account::new("6011", "Purchases", AccountKind::Expense).inactive(),
        ])
    }

    fn draft(number: &str) -> EntryDraft {
        EntryDraft::new(number, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), "Sale")
    }

    #[test]
    fn test_valid_entry_passes() {
        let catalog = catalog();
        let candidate = draft("A-001").debit("1011", dec!(100)).credit("7011", dec!(100));
        assert!(validate(&candidate, None, &catalog, &[]).is_ok());
    }

    #[test]
    fn test_difference_within_tolerance_passes() {
        let catalog = catalog();
        let candidate = draft("A-001").debit("1011", dec!(100.00)).credit("7011", dec!(99.99));
        assert!(validate(&candidate, None, &catalog, &[]).is_ok());

        let candidate = draft("A-001").debit("1011", dec!(100.00)).credit("7011", dec!(99.98));
        let errors = validate(&candidate, None, &catalog, &[]).unwrap_err();
        assert_eq!(errors.first().rule(), "unbalanced_entry");
    }

    #[test]
    fn test_no_lines() {
        let errors = validate(&draft("A-001"), None, &catalog(), &[]).unwrap_err();
        assert_eq!(errors.rules(), vec!["no_lines"]);
    }

    #[test]
    fn test_unbalanced_is_reported_before_line_rules() {
        let catalog = catalog();
        let candidate = draft("A-001")
            .debit("1011", dec!(100))
            .credit("10", dec!(50));
        let errors = validate(&candidate, None, &catalog, &[]).unwrap_err();
        assert_eq!(errors.rules(), vec!["unbalanced_entry", "summary_account_posting"]);
    }

    #[test]
    fn test_ambiguous_and_empty_lines() {
        let catalog = catalog();
        let mut both = JournalLine::debit("1011", dec!(10));
        both.credit = dec!(10);
        let candidate = draft("A-001")
            .with_line(both)
            .with_line(JournalLine::debit("7011", Decimal::ZERO));
        let errors = validate(&candidate, None, &catalog, &[]).unwrap_err();

        assert_eq!(errors.first(), &ValidationError::AmbiguousLine { index: 0 });
        assert!(errors.iter().any(|e| *e == ValidationError::EmptyLine { index: 1 }));
    }

    #[test]
    fn test_negative_amount() {
        let catalog = catalog();
        let candidate = draft("A-001")
            .debit("1011", dec!(-10))
            .credit("7011", dec!(-10));
        let errors = validate(&candidate, None, &catalog, &[]).unwrap_err();
        assert_eq!(errors.rules(), vec!["negative_amount", "negative_amount"]);
    }

    #[test]
    fn test_account_rules_in_order() {
        let catalog = catalog();
        let candidate = draft("A-001")
            .debit("", dec!(10))
            .debit("9999", dec!(10))
            .debit("6011", dec!(10))
            .credit("70", dec!(30));
        let errors = validate(&candidate, None, &catalog, &[]).unwrap_err();
        assert_eq!(
            errors.rules(),
            vec!["missing_account", "unknown_account", "inactive_account", "summary_account_posting"]
        );
        assert_eq!(errors.first().line_index(), Some(0));
    }

    #[test]
    fn test_duplicate_number_excludes_entry_being_edited() {
        let catalog = catalog();
        let stored = JournalEntry::from_draft(
            OwnerId::new(),
            draft("A-001").debit("1011", dec!(5)).credit("7011", dec!(5)),
        );
        let existing = vec![stored.clone()];
        let candidate = draft("A-001").debit("1011", dec!(5)).credit("7011", dec!(5));

        let errors = validate(&candidate, None, &catalog, &existing).unwrap_err();
        assert_eq!(
            errors.first(),
            &ValidationError::DuplicateEntryNumber { entry_number: "A-001".to_string() }
        );
        assert!(validate(&candidate, Some(stored.id), &catalog, &existing).is_ok());
    }

    #[test]
    fn test_messages_are_one_based() {
        let error = ValidationError::SummaryAccountPosting { index: 0, code: "10".into() };
        assert!(error.to_string().starts_with("Line 1 "));
    }
}
