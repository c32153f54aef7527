//! Journal entries and their lines
//!
//! A journal entry is a dated header with an ordered list of lines. Every
//! line touches exactly one account on exactly one side. Entries are the
//! only source of movements in the ledger; balances are always recomputed
//! from them.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{EntryId, OwnerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Opening balances at the start of a fiscal year
    Opening,
    /// Day-to-day operations
    #[default]
    Daily,
    /// Period-end adjustments
    Adjustment,
    /// Closing of result accounts
    Closing,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Opening => "opening",
            EntryType::Daily => "daily",
            EntryType::Adjustment => "adjustment",
            EntryType::Closing => "closing",
        }
    }
}

/// Lifecycle status of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Editable working copy
    #[default]
    Draft,
    /// Finalized; header and lines are frozen
    Posted,
    /// Cancelled; kept for the audit trail
    Voided,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Posted => "posted",
            EntryStatus::Voided => "voided",
        }
    }

    /// Only drafts may have their header or lines changed
    pub fn is_editable(&self) -> bool {
        *self == EntryStatus::Draft
    }

    /// Posted entries must be voided instead of deleted
    pub fn is_deletable(&self) -> bool {
        *self != EntryStatus::Posted
    }

    pub fn can_transition_to(&self, target: EntryStatus) -> bool {
        matches!(
            (self, target),
            (EntryStatus::Draft, EntryStatus::Posted)
                | (EntryStatus::Draft, EntryStatus::Voided)
                | (EntryStatus::Posted, EntryStatus::Voided)
        )
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One debit or credit movement against a single account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
    #[serde(default)]
    pub memo: Option<String>,
}

impl JournalLine {
    /// Creates a debit line
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Sets the debit amount; a positive debit clears the credit side
    pub fn set_debit(&mut self, amount: Decimal) {
        self.debit = amount;
        if amount > Decimal::ZERO {
            self.credit = Decimal::ZERO;
        }
    }

    /// Sets the credit amount; a positive credit clears the debit side
    pub fn set_credit(&mut self, amount: Decimal) {
        self.credit = amount;
        if amount > Decimal::ZERO {
            self.debit = Decimal::ZERO;
        }
    }

    /// Debit minus credit
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Line memo if present and non-empty, otherwise `fallback`
    pub fn display_memo<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.memo.as_deref() {
            Some(memo) if !memo.is_empty() => memo,
            _ => fallback,
        }
    }
}

/// Caller-supplied header and lines for a new or edited entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub entry_number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub entry_type: EntryType,
    pub memo: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub lines: Vec<JournalLine>,
}

impl EntryDraft {
    pub fn new(entry_number: impl Into<String>, date: NaiveDate, memo: impl Into<String>) -> Self {
        Self {
            entry_number: entry_number.into(),
            date,
            entry_type: EntryType::Daily,
            memo: memo.into(),
            reference: None,
            lines: Vec::new(),
        }
    }

    pub fn with_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_line(mut self, line: JournalLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn debit(self, account_code: impl Into<String>, amount: Decimal) -> Self {
        self.with_line(JournalLine::debit(account_code, amount))
    }

    pub fn credit(self, account_code: impl Into<String>, amount: Decimal) -> Self {
        self.with_line(JournalLine::credit(account_code, amount))
    }
}

/// A stored journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub owner_id: OwnerId,
    pub entry_number: String,
    pub date: NaiveDate,
    pub entry_type: EntryType,
    pub memo: String,
    pub reference: Option<String>,
    pub status: EntryStatus,
    pub lines: Vec<JournalLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Materializes a draft as a new entry for `owner_id`
    pub fn from_draft(owner_id: OwnerId, draft: EntryDraft) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new_v7(),
            owner_id,
            entry_number: draft.entry_number,
            date: draft.date,
            entry_type: draft.entry_type,
            memo: draft.memo,
            reference: draft.reference,
            status: EntryStatus::Draft,
            lines: draft.lines,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces header and lines from a draft, keeping identity and status
    pub fn apply_draft(&mut self, draft: EntryDraft) {
        self.entry_number = draft.entry_number;
        self.date = draft.date;
        self.entry_type = draft.entry_type;
        self.memo = draft.memo;
        self.reference = draft.reference;
        self.lines = draft.lines;
        self.updated_at = Utc::now();
    }

    /// The header and lines as an editable draft
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            entry_number: self.entry_number.clone(),
            date: self.date,
            entry_type: self.entry_type,
            memo: self.memo.clone(),
            reference: self.reference.clone(),
            lines: self.lines.clone(),
        }
    }

    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Memo shown for a line: its own memo, falling back to the entry memo
    pub fn line_memo<'a>(&'a self, line: &'a JournalLine) -> &'a str {
        line.display_memo(&self.memo)
    }
}
