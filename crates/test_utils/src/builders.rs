//! Test Data Builders
//!
//! Provides builder patterns for constructing ledger test data with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::OwnerId;
use domain_ledger::{
    Account, AccountKind, EntryDraft, EntryStatus, EntryType, JournalEntry, JournalLine,
};
use rust_decimal::Decimal;

use crate::fixtures::{AccountFixtures, AmountFixtures, DateFixtures, IdFixtures};

/// Builder for constructing test accounts
pub struct AccountBuilder {
    code: String,
    name: String,
    kind: AccountKind,
    description: Option<String>,
    active: bool,
}

impl Default for AccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountBuilder {
    /// Creates a new builder for an active asset leaf
    pub fn new() -> Self {
        Self {
            code: "1099".to_string(),
            name: "Test account".to_string(),
            kind: AccountKind::Asset,
            description: None,
            active: true,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: AccountKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Account {
        Account {
            code: self.code,
            name: self.name,
            kind: self.kind,
            description: self.description,
            active: self.active,
        }
    }
}

/// Builder for journal entry drafts and stored entries
///
/// Defaults to a balanced cash sale with IGV against the
/// [`AccountFixtures::small_chart`] accounts.
pub struct JournalEntryBuilder {
    owner: OwnerId,
    entry_number: String,
    date: NaiveDate,
    entry_type: EntryType,
    memo: String,
    reference: Option<String>,
    status: EntryStatus,
    lines: Option<Vec<JournalLine>>,
}

impl Default for JournalEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalEntryBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            owner: IdFixtures::owner_id(),
            entry_number: "A-001".to_string(),
            date: DateFixtures::january(15),
            entry_type: EntryType::Daily,
            memo: "Cash sale".to_string(),
            reference: None,
            status: EntryStatus::Draft,
            lines: None,
        }
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_number(mut self, entry_number: impl Into<String>) -> Self {
        self.entry_number = entry_number.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    /// Replaces the default lines
    pub fn with_lines(mut self, lines: Vec<JournalLine>) -> Self {
        self.lines = Some(lines);
        self
    }

    /// Appends a debit line, dropping the default lines on first use
    pub fn debit(mut self, code: impl Into<String>, amount: Decimal) -> Self {
        self.lines
            .get_or_insert_with(Vec::new)
            .push(JournalLine::debit(code, amount));
        self
    }

    /// Appends a credit line, dropping the default lines on first use
    pub fn credit(mut self, code: impl Into<String>, amount: Decimal) -> Self {
        self.lines
            .get_or_insert_with(Vec::new)
            .push(JournalLine::credit(code, amount));
        self
    }

    fn default_lines() -> Vec<JournalLine> {
        vec![
            JournalLine::debit(AccountFixtures::CASH, AmountFixtures::sale_gross()),
            JournalLine::credit(AccountFixtures::SALES, AmountFixtures::sale_net()),
            JournalLine::credit(AccountFixtures::IGV, AmountFixtures::sale_igv()),
        ]
    }

    /// Builds the caller-side draft
    pub fn draft(self) -> EntryDraft {
        EntryDraft {
            entry_number: self.entry_number,
            date: self.date,
            entry_type: self.entry_type,
            memo: self.memo,
            reference: self.reference,
            lines: self.lines.unwrap_or_else(Self::default_lines),
        }
    }

    /// Builds a stored entry with the configured owner and status
    pub fn build(self) -> JournalEntry {
        let owner = self.owner;
        let status = self.status;
        let mut entry = JournalEntry::from_draft(owner, self.draft());
        entry.status = status;
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_entry_is_balanced() {
        let entry = JournalEntryBuilder::new().build();
        assert_eq!(entry.total_debit(), entry.total_credit());
        assert_eq!(entry.lines.len(), 3);
    }

    #[test]
    fn test_explicit_lines_replace_defaults() {
        let draft = JournalEntryBuilder::new()
            .debit(AccountFixtures::PURCHASES, dec!(50))
            .credit(AccountFixtures::CASH, dec!(50))
            .draft();
        assert_eq!(draft.lines.len(), 2);
    }

    #[test]
    fn test_account_builder() {
        let account = AccountBuilder::new().with_code("1012").inactive().build();
        assert_eq!(account.code, "1012");
        assert!(!account.active);
    }
}
