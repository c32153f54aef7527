//! Journal entry DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_ledger::{EntryDraft, EntryType, JournalEntry, JournalLine};

/// Header and lines of an entry to create or overwrite
///
/// Blank numbers and empty line sets are accepted here and rejected by the
/// ledger validator, so clients get every violation in one response.
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    #[serde(default)]
    #[validate(length(max = 64))]
    pub entry_number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub entry_type: EntryType,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub memo: String,
    #[validate(length(max = 255))]
    pub reference: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub lines: Vec<LineRequest>,
}

impl From<EntryRequest> for EntryDraft {
    fn from(request: EntryRequest) -> Self {
        EntryDraft {
            entry_number: request.entry_number,
            date: request.date,
            entry_type: request.entry_type,
            memo: request.memo,
            reference: request.reference,
            lines: request.lines.into_iter().map(JournalLine::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineRequest {
    #[serde(default)]
    pub account_code: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub memo: Option<String>,
}

impl From<LineRequest> for JournalLine {
    fn from(request: LineRequest) -> Self {
        JournalLine {
            account_code: request.account_code,
            debit: request.debit.unwrap_or(Decimal::ZERO),
            credit: request.credit.unwrap_or(Decimal::ZERO),
            memo: request.memo,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceLinesRequest {
    #[validate(length(max = 500))]
    pub lines: Vec<LineRequest>,
}

/// An entry with its column totals
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            total_debit: entry.total_debit(),
            total_credit: entry.total_credit(),
            entry,
        }
    }
}
