//! General ledger projection
//!
//! Projects the lines of one account within a date range into an ordered
//! sequence of movements with a running balance. Balances are never stored:
//! every projection is recomputed from the journal entries it is given.

use chrono::NaiveDate;
use core_kernel::{DateRange, EntryId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::entry::{JournalEntry, JournalLine};

/// One line of the general ledger of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerMovement {
    pub entry_id: EntryId,
    pub date: NaiveDate,
    pub entry_number: String,
    /// Line memo, or the entry memo when the line has none
    pub memo: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Opening balance plus every debit minus every credit up to this line
    pub running_balance: Decimal,
}

/// Totals of a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub opening_balance: Decimal,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub closing_balance: Decimal,
}

/// The ordered lines of one account in one period
#[derive(Debug, Clone)]
pub struct LedgerProjection<'a> {
    postings: Vec<(&'a JournalEntry, &'a JournalLine)>,
    opening_balance: Decimal,
}

impl<'a> LedgerProjection<'a> {
    /// Starts the running balance from `opening` instead of zero
    pub fn starting_at(mut self, opening: Decimal) -> Self {
        self.opening_balance = opening;
        self
    }

    /// Iterates the movements; each call starts again from the opening balance
    pub fn movements(&self) -> Movements<'_, 'a> {
        Movements {
            postings: self.postings.iter(),
            balance: self.opening_balance,
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance
    }

    pub fn summary(&self) -> LedgerSummary {
        let total_debit: Decimal = self.postings.iter().map(|(_, line)| line.debit).sum();
        let total_credit: Decimal = self.postings.iter().map(|(_, line)| line.credit).sum();
        LedgerSummary {
            opening_balance: self.opening_balance,
            total_debit,
            total_credit,
            closing_balance: self.opening_balance + total_debit - total_credit,
        }
    }
}

/// Iterator over the movements of a [`LedgerProjection`]
pub struct Movements<'p, 'a> {
    postings: std::slice::Iter<'p, (&'a JournalEntry, &'a JournalLine)>,
    balance: Decimal,
}

impl Iterator for Movements<'_, '_> {
    type Item = LedgerMovement;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, line) = self.postings.next()?;
        self.balance += line.debit - line.credit;
        Some(LedgerMovement {
            entry_id: entry.id,
            date: entry.date,
            entry_number: entry.entry_number.clone(),
            memo: entry.line_memo(line).to_string(),
            debit: line.debit,
            credit: line.credit,
            running_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.postings.size_hint()
    }
}

/// Projects the movements of `account_code` dated within `range`
///
/// Only lines whose account code equals `account_code` exactly are included;
/// movements of sub-accounts are not rolled up. Lines are ordered by entry
/// date, then entry number, then their position in the entry. An empty
/// account code yields an empty projection.
///
/// # Arguments
///
/// * `account_code` - The account to project
/// * `range` - Inclusive date range
/// * `entries` - Journal entries to project from, in any order
pub fn project<'a>(
    account_code: &str,
    range: &DateRange,
    entries: &'a [JournalEntry],
) -> LedgerProjection<'a> {
    if account_code.is_empty() {
        return LedgerProjection {
            postings: Vec::new(),
            opening_balance: Decimal::ZERO,
        };
    }

    let mut in_range: Vec<&JournalEntry> = entries
        .iter()
        .filter(|entry| range.contains(entry.date))
        .collect();
    // Stable, so lines keep their position for equal keys
    in_range.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.entry_number.cmp(&b.entry_number))
    });

    let postings = in_range
        .into_iter()
        .flat_map(|entry| {
            entry
                .lines
                .iter()
                .filter(move |line| line.account_code == account_code)
                .map(move |line| (entry, line))
        })
        .collect();

    LedgerProjection {
        postings,
        opening_balance: Decimal::ZERO,
    }
}

/// Net movement (debits minus credits) of `account_code` dated before `before`
pub fn opening_balance(account_code: &str, before: NaiveDate, entries: &[JournalEntry]) -> Decimal {
    if account_code.is_empty() {
        return Decimal::ZERO;
    }
    entries
        .iter()
        .filter(|entry| entry.date < before)
        .flat_map(|entry| entry.lines.iter())
        .filter(|line| line.account_code == account_code)
        .map(JournalLine::net)
        .sum()
}
