//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating journal data that maintains
//! the ledger invariants (or breaks exactly one of them on purpose).

use chrono::{Days, NaiveDate};
use core_kernel::OwnerId;
use domain_ledger::{EntryDraft, JournalEntry, JournalLine};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::{AccountFixtures, DateFixtures};

/// Strategy for positive amounts with two decimal places (0.01 to 1,000,000.00)
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a date within 2024
pub fn date_2024_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..366u64).prop_map(|offset| {
        DateFixtures::year_start()
            .checked_add_days(Days::new(offset))
            .unwrap_or_else(DateFixtures::year_start)
    })
}

/// Strategy for entry numbers such as "A-042"
pub fn entry_number_strategy() -> impl Strategy<Value = String> {
    ("[A-C]", 1u32..1000u32).prop_map(|(series, n)| format!("{}-{:03}", series, n))
}

/// Strategy for a postable account code from the fixture chart
pub fn postable_code_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(AccountFixtures::postable_codes())
}

/// Strategy for a balanced line set
///
/// Generates 1..=5 debit lines on random postable accounts and splits their
/// total across 1..=3 credit lines, so debits equal credits exactly.
pub fn balanced_lines_strategy() -> impl Strategy<Value = Vec<JournalLine>> {
    (
        prop::collection::vec((postable_code_strategy(), amount_strategy()), 1..=5),
        prop::collection::vec(postable_code_strategy(), 1..=3),
    )
        .prop_map(|(debits, credit_codes)| {
            let total: Decimal = debits.iter().map(|(_, amount)| *amount).sum();
            let mut lines: Vec<JournalLine> = debits
                .into_iter()
                .map(|(code, amount)| JournalLine::debit(code, amount))
                .collect();

            // Split into whole cents; the last credit takes the remainder
            let parts = Decimal::from(credit_codes.len() as u64);
            let share = (total / parts).round_dp(2);
            let mut remaining = total;
            for (i, code) in credit_codes.iter().enumerate() {
                let amount = if i + 1 == credit_codes.len() { remaining } else { share };
                remaining -= amount;
                if amount > Decimal::ZERO {
                    lines.push(JournalLine::credit(*code, amount));
                }
            }
            lines
        })
}

/// Strategy for a balanced draft dated within 2024
pub fn balanced_draft_strategy() -> impl Strategy<Value = EntryDraft> {
    (entry_number_strategy(), date_2024_strategy(), balanced_lines_strategy()).prop_map(
        |(number, date, lines)| {
            let mut draft = EntryDraft::new(number, date, "Generated entry");
            draft.lines = lines;
            draft
        },
    )
}

/// Strategy for a set of stored entries with distinct entry numbers
pub fn entry_set_strategy(max_entries: usize) -> impl Strategy<Value = Vec<JournalEntry>> {
    prop::collection::vec((date_2024_strategy(), balanced_lines_strategy()), 0..=max_entries).prop_map(
        |items| {
            let owner = OwnerId::new();
            items
                .into_iter()
                .enumerate()
                .map(|(i, (date, lines))| {
                    let mut draft = EntryDraft::new(format!("G-{:04}", i), date, "Generated entry");
                    draft.lines = lines;
                    JournalEntry::from_draft(owner, draft)
                })
                .collect()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn balanced_lines_balance(lines in balanced_lines_strategy()) {
            let debits: Decimal = lines.iter().map(|l| l.debit).sum();
            let credits: Decimal = lines.iter().map(|l| l.credit).sum();
            prop_assert_eq!(debits, credits);
        }

        #[test]
        fn amounts_are_positive(amount in amount_strategy()) {
            prop_assert!(amount > Decimal::ZERO);
        }
    }
}
