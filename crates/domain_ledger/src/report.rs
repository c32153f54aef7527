//! Period reports: journal, general ledger and trial balance
//!
//! All reports are read-only aggregations over already-fetched entries. They
//! trust persisted data and never re-validate it, and they include entries of
//! every status.

use chrono::NaiveDate;
use core_kernel::{DateRange, EntryId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::account::AccountKind;
use crate::catalog::AccountCatalog;
use crate::entry::{EntryStatus, EntryType, JournalEntry};
use crate::projection::{LedgerMovement, LedgerProjection, LedgerSummary};

/// A journal line as shown in the journal report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub account_code: String,
    pub account_name: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub memo: String,
}

/// One entry of the journal report with its own totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalReportEntry {
    pub entry_id: EntryId,
    pub entry_number: String,
    pub date: NaiveDate,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub memo: String,
    pub reference: Option<String>,
    pub lines: Vec<ReportLine>,
    pub debit_total: Decimal,
    pub credit_total: Decimal,
}

/// The journal ("libro diario") for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalReport {
    pub range: DateRange,
    pub entries: Vec<JournalReportEntry>,
    pub grand_debit_total: Decimal,
    pub grand_credit_total: Decimal,
}

impl JournalReport {
    /// Fills in account names from the catalog
    pub fn with_account_names(mut self, catalog: &AccountCatalog) -> Self {
        for line in self.entries.iter_mut().flat_map(|e| e.lines.iter_mut()) {
            line.account_name = catalog.name_of(&line.account_code).map(str::to_string);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the journal report for `range`
///
/// Entries dated within the range are ordered by date, then entry number.
/// Per-entry totals sum debits and credits independently; grand totals are
/// the sums of the per-entry totals.
pub fn journal_report(range: &DateRange, entries: &[JournalEntry]) -> JournalReport {
    let mut selected: Vec<&JournalEntry> = entries
        .iter()
        .filter(|entry| range.contains(entry.date))
        .collect();
    selected.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.entry_number.cmp(&b.entry_number))
    });

    let entries: Vec<JournalReportEntry> = selected
        .into_iter()
        .map(|entry| JournalReportEntry {
            entry_id: entry.id,
            entry_number: entry.entry_number.clone(),
            date: entry.date,
            entry_type: entry.entry_type,
            status: entry.status,
            memo: entry.memo.clone(),
            reference: entry.reference.clone(),
            lines: entry
                .lines
                .iter()
                .map(|line| ReportLine {
                    account_code: line.account_code.clone(),
                    account_name: None,
                    debit: line.debit,
                    credit: line.credit,
                    memo: entry.line_memo(line).to_string(),
                })
                .collect(),
            debit_total: entry.total_debit(),
            credit_total: entry.total_credit(),
        })
        .collect();

    JournalReport {
        range: *range,
        grand_debit_total: entries.iter().map(|e| e.debit_total).sum(),
        grand_credit_total: entries.iter().map(|e| e.credit_total).sum(),
        entries,
    }
}

/// The general ledger ("libro mayor") of one account for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedger {
    pub account_code: String,
    pub account_name: Option<String>,
    pub range: DateRange,
    pub movements: Vec<LedgerMovement>,
    #[serde(flatten)]
    pub summary: LedgerSummary,
}

impl GeneralLedger {
    /// Materializes a projection
    pub fn from_projection(
        account_code: impl Into<String>,
        account_name: Option<String>,
        range: DateRange,
        projection: &LedgerProjection<'_>,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            account_name,
            range,
            movements: projection.movements().collect(),
            summary: projection.summary(),
        }
    }
}

/// Sums of one account in the trial balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    pub account_code: String,
    pub account_name: Option<String>,
    pub kind: Option<AccountKind>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Net debit balance, zero when the account nets to credit
    pub debit_balance: Decimal,
    /// Net credit balance, zero when the account nets to debit
    pub credit_balance: Decimal,
}

/// Trial balance ("balance de comprobación") for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    pub range: DateRange,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub total_debit_balance: Decimal,
    pub total_credit_balance: Decimal,
}

impl TrialBalance {
    /// Returns true if both the sums and the balances agree
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit && self.total_debit_balance == self.total_credit_balance
    }
}

/// Builds the trial balance for `range`
///
/// Every account code moved by a line dated within the range gets one row,
/// ordered by code. Codes missing from the catalog still appear, without a
/// name or kind.
pub fn trial_balance(range: &DateRange, entries: &[JournalEntry], catalog: &AccountCatalog) -> TrialBalance {
    let mut sums: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries.iter().filter(|e| range.contains(e.date)) {
        for line in &entry.lines {
            let (debit, credit) = sums.entry(line.account_code.as_str()).or_default();
            *debit += line.debit;
            *credit += line.credit;
        }
    }

    let rows: Vec<TrialBalanceRow> = sums
        .into_iter()
        .map(|(code, (total_debit, total_credit))| {
            let net = total_debit - total_credit;
            let account = catalog.get(code);
            TrialBalanceRow {
                account_code: code.to_string(),
                account_name: account.map(|a| a.name.clone()),
                kind: account.map(|a| a.kind),
                total_debit,
                total_credit,
                debit_balance: net.max(Decimal::ZERO),
                credit_balance: (-net).max(Decimal::ZERO),
            }
        })
        .collect();

    TrialBalance {
        range: *range,
        total_debit: rows.iter().map(|r| r.total_debit).sum(),
        total_credit: rows.iter().map(|r| r.total_credit).sum(),
        total_debit_balance: rows.iter().map(|r| r.debit_balance).sum(),
        total_credit_balance: rows.iter().map(|r| r.credit_balance).sum(),
        rows,
    }
}
