//! PostgreSQL Ledger Adapter
//!
//! Implements the ledger's `AccountStore` and `EntryStore` ports on top of
//! `LedgerRepository`, translating between domain models and row structs and
//! between `DatabaseError` and `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_ledger::LedgerService;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresLedgerAdapter::new(pool));
//! let service = LedgerService::with_store(adapter);
//! ```

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{
    DateRange, DomainPort, EntryId, HealthCheckResult, HealthCheckable, LineId,
    OperationMetadata, OwnerId, PortError,
};
use domain_ledger::{
    Account, AccountKind, AccountPatch, AccountStore, EntryStatus, EntryStore, EntryType,
    JournalEntry, JournalLine,
};

use crate::error::DatabaseError;
use crate::repositories::ledger::{
    AccountKind as DbAccountKind, AccountRow, EntryStatus as DbEntryStatus,
    EntryType as DbEntryType, EntryWithLines, LedgerRepository, NewAccount, NewEntry, NewLine,
};

const ADAPTER_ID: &str = "postgres-ledger-adapter";

/// PostgreSQL-backed implementation of the ledger store ports
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - unique and foreign key violations -> `PortError::Conflict`
/// - connection failures -> `PortError::Connection`
/// - anything else -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    repository: LedgerRepository,
}

impl PostgresLedgerAdapter {
    /// Creates a new adapter over the given pool
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            repository: LedgerRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLedgerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl AccountStore for PostgresLedgerAdapter {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn list_accounts(&self, owner: OwnerId) -> Result<Vec<Account>, PortError> {
        let rows = self.repository.list_accounts(*owner.as_uuid()).await?;
        Ok(rows.into_iter().map(row_to_account).collect())
    }

    #[instrument(skip(self, account), fields(owner = %owner, code = %account.code))]
    async fn create_account(&self, owner: OwnerId, account: Account) -> Result<Account, PortError> {
        let row = self
            .repository
            .insert_account(&to_new_account(owner, &account))
            .await
            .map_err(|e| match e {
                DatabaseError::DuplicateEntry(_) => {
                    PortError::conflict(format!("account code {} already exists", account.code))
                }
                other => other.into(),
            })?;
        Ok(row_to_account(row))
    }

    #[instrument(skip(self, patch), fields(owner = %owner, code = %code))]
    async fn update_account(
        &self,
        owner: OwnerId,
        code: &str,
        patch: AccountPatch,
    ) -> Result<Account, PortError> {
        let row = self
            .repository
            .get_account(*owner.as_uuid(), code)
            .await
            .map_err(|e| not_found_as(e, "Account", code))?;

        let mut account = row_to_account(row);
        patch.apply(&mut account);

        let row = self
            .repository
            .update_account(&to_new_account(owner, &account))
            .await
            .map_err(|e| not_found_as(e, "Account", code))?;
        Ok(row_to_account(row))
    }

    #[instrument(skip(self), fields(owner = %owner, code = %code))]
    async fn delete_account(&self, owner: OwnerId, code: &str) -> Result<(), PortError> {
        self.repository
            .delete_account(*owner.as_uuid(), code)
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKeyViolation(_) => {
                    PortError::conflict(format!("account {} is referenced by journal lines", code))
                }
                other => not_found_as(other, "Account", code),
            })
    }

    #[instrument(skip(self, accounts), fields(owner = %owner, count = accounts.len()))]
    async fn insert_missing_accounts(
        &self,
        owner: OwnerId,
        accounts: Vec<Account>,
    ) -> Result<usize, PortError> {
        let rows: Vec<NewAccount> = accounts.iter().map(|a| to_new_account(owner, a)).collect();
        let inserted = self.repository.insert_missing_accounts(&rows).await?;
        debug!(inserted, "Inserted missing accounts");
        Ok(inserted as usize)
    }
}

#[async_trait]
impl EntryStore for PostgresLedgerAdapter {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn list_entries(
        &self,
        owner: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, PortError> {
        let (from, to) = match range {
            Some(range) => (
                (!range.is_open_start()).then_some(range.start),
                (!range.is_open_end()).then_some(range.end),
            ),
            None => (None, None),
        };

        let rows = self
            .repository
            .list_entries(*owner.as_uuid(), from, to)
            .await?;
        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    #[instrument(skip(self), fields(owner = %owner, entry_id = %id))]
    async fn get_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, PortError> {
        let row = self
            .repository
            .get_entry(*owner.as_uuid(), *id.as_uuid())
            .await
            .map_err(|e| not_found_as(e, "JournalEntry", id))?;
        Ok(row_to_entry(row))
    }

    async fn count_lines_for_account(&self, owner: OwnerId, code: &str) -> Result<usize, PortError> {
        let count = self
            .repository
            .count_lines_for_account(*owner.as_uuid(), code)
            .await?;
        Ok(count.max(0) as usize)
    }

    #[instrument(skip(self, entry, metadata), fields(entry_number = %entry.entry_number, lines = entry.lines.len()))]
    async fn create_entry_with_lines(
        &self,
        entry: JournalEntry,
        metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError> {
        log_metadata(metadata);
        self.repository
            .insert_entry(&to_new_entry(&entry), &to_new_lines(&entry.lines))
            .await
            .map_err(|e| duplicate_number(e, &entry.entry_number))?;

        self.get_entry(entry.owner_id, entry.id).await
    }

    #[instrument(skip(self, entry, metadata), fields(entry_id = %entry.id))]
    async fn update_entry(
        &self,
        entry: JournalEntry,
        expected: EntryStatus,
        metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError> {
        log_metadata(metadata);
        self.repository
            .update_entry(
                &to_new_entry(&entry),
                status_to_db(expected),
                &to_new_lines(&entry.lines),
            )
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => PortError::not_found("JournalEntry", entry.id),
                other => duplicate_number(other, &entry.entry_number),
            })?;

        self.get_entry(entry.owner_id, entry.id).await
    }

    #[instrument(skip(self, lines, metadata), fields(entry_id = %id, lines = lines.len()))]
    async fn replace_entry_lines(
        &self,
        owner: OwnerId,
        id: EntryId,
        expected: EntryStatus,
        lines: Vec<JournalLine>,
        metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError> {
        log_metadata(metadata);
        self.repository
            .replace_lines(
                *owner.as_uuid(),
                *id.as_uuid(),
                status_to_db(expected),
                &to_new_lines(&lines),
            )
            .await
            .map_err(|e| not_found_as(e, "JournalEntry", id))
    }

    #[instrument(skip(self, metadata), fields(entry_id = %id))]
    async fn delete_entry(
        &self,
        owner: OwnerId,
        id: EntryId,
        metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError> {
        log_metadata(metadata);
        self.repository
            .delete_entry(*owner.as_uuid(), *id.as_uuid())
            .await
            .map_err(|e| not_found_as(e, "JournalEntry", id))
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn log_metadata(metadata: Option<&OperationMetadata>) {
    if let Some(metadata) = metadata {
        debug!(
            initiated_by = metadata.initiated_by.as_deref().unwrap_or("-"),
            correlation_id = metadata.correlation_id.as_deref().unwrap_or("-"),
            context = ?metadata.context,
            "Ledger write"
        );
    }
}

fn not_found_as(error: DatabaseError, entity: &str, id: impl std::fmt::Display) -> PortError {
    match error {
        DatabaseError::NotFound(_) => PortError::not_found(entity, id),
        other => other.into(),
    }
}

fn duplicate_number(error: DatabaseError, entry_number: &str) -> PortError {
    match error {
        DatabaseError::DuplicateEntry(_) => {
            PortError::conflict(format!("entry number {} already exists", entry_number))
        }
        other => other.into(),
    }
}

fn to_new_account(owner: OwnerId, account: &Account) -> NewAccount {
    NewAccount {
        owner_id: *owner.as_uuid(),
        code: account.code.clone(),
        name: account.name.clone(),
        kind: kind_to_db(account.kind),
        description: account.description.clone(),
        active: account.active,
    }
}

fn row_to_account(row: AccountRow) -> Account {
    Account {
        code: row.code,
        name: row.name,
        kind: kind_from_db(row.kind),
        description: row.description,
        active: row.active,
    }
}

fn to_new_entry(entry: &JournalEntry) -> NewEntry {
    NewEntry {
        entry_id: *entry.id.as_uuid(),
        owner_id: *entry.owner_id.as_uuid(),
        entry_number: entry.entry_number.clone(),
        entry_date: entry.date,
        entry_type: entry_type_to_db(entry.entry_type),
        memo: entry.memo.clone(),
        reference: entry.reference.clone(),
        status: status_to_db(entry.status),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

fn to_new_lines(lines: &[JournalLine]) -> Vec<NewLine> {
    lines
        .iter()
        .map(|line| NewLine {
            line_id: *LineId::new_v7().as_uuid(),
            account_code: line.account_code.clone(),
            debit: line.debit,
            credit: line.credit,
            memo: line.memo.clone(),
        })
        .collect()
}

fn row_to_entry(row: EntryWithLines) -> JournalEntry {
    let EntryWithLines { entry, lines } = row;
    JournalEntry {
        id: EntryId::from_uuid(entry.entry_id),
        owner_id: OwnerId::from_uuid(entry.owner_id),
        entry_number: entry.entry_number,
        date: entry.entry_date,
        entry_type: entry_type_from_db(entry.entry_type),
        memo: entry.memo,
        reference: entry.reference,
        status: status_from_db(entry.status),
        lines: lines
            .into_iter()
            .map(|line| JournalLine {
                account_code: line.account_code,
                debit: line.debit,
                credit: line.credit,
                memo: line.memo,
            })
            .collect(),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

fn kind_to_db(kind: AccountKind) -> DbAccountKind {
    match kind {
        AccountKind::Asset => DbAccountKind::Asset,
        AccountKind::Liability => DbAccountKind::Liability,
        AccountKind::Equity => DbAccountKind::Equity,
        AccountKind::Income => DbAccountKind::Income,
        AccountKind::Expense => DbAccountKind::Expense,
        AccountKind::Cost => DbAccountKind::Cost,
        AccountKind::IntermediateBalance => DbAccountKind::IntermediateBalance,
        AccountKind::Memorandum => DbAccountKind::Memorandum,
    }
}

fn kind_from_db(kind: DbAccountKind) -> AccountKind {
    match kind {
        DbAccountKind::Asset => AccountKind::Asset,
        DbAccountKind::Liability => AccountKind::Liability,
        DbAccountKind::Equity => AccountKind::Equity,
        DbAccountKind::Income => AccountKind::Income,
        DbAccountKind::Expense => AccountKind::Expense,
        DbAccountKind::Cost => AccountKind::Cost,
        DbAccountKind::IntermediateBalance => AccountKind::IntermediateBalance,
        DbAccountKind::Memorandum => AccountKind::Memorandum,
    }
}

fn entry_type_to_db(entry_type: EntryType) -> DbEntryType {
    match entry_type {
        EntryType::Opening => DbEntryType::Opening,
        EntryType::Daily => DbEntryType::Daily,
        EntryType::Adjustment => DbEntryType::Adjustment,
        EntryType::Closing => DbEntryType::Closing,
    }
}

fn entry_type_from_db(entry_type: DbEntryType) -> EntryType {
    match entry_type {
        DbEntryType::Opening => EntryType::Opening,
        DbEntryType::Daily => EntryType::Daily,
        DbEntryType::Adjustment => EntryType::Adjustment,
        DbEntryType::Closing => EntryType::Closing,
    }
}

fn status_to_db(status: EntryStatus) -> DbEntryStatus {
    match status {
        EntryStatus::Draft => DbEntryStatus::Draft,
        EntryStatus::Posted => DbEntryStatus::Posted,
        EntryStatus::Voided => DbEntryStatus::Voided,
    }
}

fn status_from_db(status: DbEntryStatus) -> EntryStatus {
    match status {
        DbEntryStatus::Draft => EntryStatus::Draft,
        DbEntryStatus::Posted => EntryStatus::Posted,
        DbEntryStatus::Voided => EntryStatus::Voided,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_kind_mapping_is_total() {
        for kind in AccountKind::all() {
            assert_eq!(kind_from_db(kind_to_db(kind)), kind);
        }
    }

    #[test]
    fn test_entry_conversion_keeps_line_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let draft = domain_ledger::EntryDraft::new("A-001", date, "Sale")
            .debit("1011", dec!(118))
            .credit("7011", dec!(100))
            .credit("40111", dec!(18));
        let entry = JournalEntry::from_draft(OwnerId::new(), draft);

        let header = to_new_entry(&entry);
        let lines = to_new_lines(&entry.lines);
        assert_eq!(header.entry_number, "A-001");
        assert_eq!(header.status, DbEntryStatus::Draft);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].account_code, "40111");
        assert_ne!(lines[0].line_id, lines[1].line_id);
    }

    #[test]
    fn test_duplicate_number_message() {
        let error = duplicate_number(DatabaseError::DuplicateEntry("uk".to_string()), "A-001");
        assert!(error.is_conflict());
        assert!(error.to_string().contains("A-001"));
    }
}
