//! Ledger repository implementation
//!
//! Database access for the chart of accounts and the journal. Every write
//! that touches an entry header together with its lines runs inside a single
//! transaction, so a failed insert never leaves a header without its lines.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for accounts, journal entries and journal lines
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Lists every account of an owner ordered by code
    pub async fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<AccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT owner_id, code, name, kind, description, active, created_at
            FROM accounts
            WHERE owner_id = $1
            ORDER BY code
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts one account
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` when the code already exists
    pub async fn insert_account(&self, account: &NewAccount) -> Result<AccountRow, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (owner_id, code, name, kind, description, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING owner_id, code, name, kind, description, active, created_at
            "#,
        )
        .bind(account.owner_id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.kind)
        .bind(&account.description)
        .bind(account.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Overwrites the mutable columns of an account
    pub async fn update_account(&self, account: &NewAccount) -> Result<AccountRow, DatabaseError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET name = $3, kind = $4, description = $5, active = $6
            WHERE owner_id = $1 AND code = $2
            RETURNING owner_id, code, name, kind, description, active, created_at
            "#,
        )
        .bind(account.owner_id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(account.kind)
        .bind(&account.description)
        .bind(account.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Account", &account.code))
    }

    /// Retrieves one account by code
    pub async fn get_account(&self, owner_id: Uuid, code: &str) -> Result<AccountRow, DatabaseError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT owner_id, code, name, kind, description, active, created_at
            FROM accounts
            WHERE owner_id = $1 AND code = $2
            "#,
        )
        .bind(owner_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Account", code))
    }

    /// Deletes an account
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ForeignKeyViolation` while journal lines reference it
    pub async fn delete_account(&self, owner_id: Uuid, code: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM accounts WHERE owner_id = $1 AND code = $2")
            .bind(owner_id)
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Account", code));
        }
        Ok(())
    }

    /// Inserts a batch of accounts in one transaction, skipping existing codes
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    pub async fn insert_missing_accounts(&self, accounts: &[NewAccount]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for account in accounts {
            let result = sqlx::query(
                r#"
                INSERT INTO accounts (owner_id, code, name, kind, description, active)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (owner_id, code) DO NOTHING
                "#,
            )
            .bind(account.owner_id)
            .bind(&account.code)
            .bind(&account.name)
            .bind(account.kind)
            .bind(&account.description)
            .bind(account.active)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    // ========================================================================
    // Journal entries
    // ========================================================================

    /// Lists entries with their lines, ordered by date then entry number
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Owning tenant
    /// * `from` - Inclusive lower date bound, if any
    /// * `to` - Inclusive upper date bound, if any
    pub async fn list_entries(
        &self,
        owner_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EntryWithLines>, DatabaseError> {
        let headers = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT entry_id, owner_id, entry_number, entry_date, entry_type,
                   memo, reference, status, created_at, updated_at
            FROM journal_entries
            WHERE owner_id = $1
              AND ($2::date IS NULL OR entry_date >= $2)
              AND ($3::date IS NULL OR entry_date <= $3)
            ORDER BY entry_date, entry_number
            "#,
        )
        .bind(owner_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.entry_id).collect();
        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT line_id, entry_id, position, account_code, debit, credit, memo
            FROM journal_lines
            WHERE entry_id = ANY($1)
            ORDER BY entry_id, position
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let mut by_entry: HashMap<Uuid, Vec<LineRow>> = HashMap::new();
        for line in lines {
            by_entry.entry(line.entry_id).or_default().push(line);
        }

        Ok(headers
            .into_iter()
            .map(|entry| {
                let lines = by_entry.remove(&entry.entry_id).unwrap_or_default();
                EntryWithLines { entry, lines }
            })
            .collect())
    }

    /// Retrieves one entry with its lines
    pub async fn get_entry(&self, owner_id: Uuid, entry_id: Uuid) -> Result<EntryWithLines, DatabaseError> {
        let entry = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT entry_id, owner_id, entry_number, entry_date, entry_type,
                   memo, reference, status, created_at, updated_at
            FROM journal_entries
            WHERE owner_id = $1 AND entry_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("JournalEntry", entry_id))?;

        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT line_id, entry_id, position, account_code, debit, credit, memo
            FROM journal_lines
            WHERE entry_id = $1
            ORDER BY position
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(EntryWithLines { entry, lines })
    }

    /// Counts journal lines posted to an account code
    pub async fn count_lines_for_account(&self, owner_id: Uuid, code: &str) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM journal_lines WHERE owner_id = $1 AND account_code = $2",
        )
        .bind(owner_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Inserts a header and its lines in one transaction
    pub async fn insert_entry(&self, entry: &NewEntry, lines: &[NewLine]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO journal_entries (
                entry_id, owner_id, entry_number, entry_date, entry_type,
                memo, reference, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.entry_id)
        .bind(entry.owner_id)
        .bind(&entry.entry_number)
        .bind(entry.entry_date)
        .bind(entry.entry_type)
        .bind(&entry.memo)
        .bind(&entry.reference)
        .bind(entry.status)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_lines(&mut tx, entry.entry_id, entry.owner_id, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrites a header and replaces its lines in one transaction
    pub async fn update_entry(
        &self,
        entry: &NewEntry,
        expected: EntryStatus,
        lines: &[NewLine],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE journal_entries
            SET entry_number = $3, entry_date = $4, entry_type = $5, memo = $6,
                reference = $7, status = $8, updated_at = $9
            WHERE owner_id = $1 AND entry_id = $2 AND status = $10
            "#,
        )
        .bind(entry.owner_id)
        .bind(entry.entry_id)
        .bind(&entry.entry_number)
        .bind(entry.entry_date)
        .bind(entry.entry_type)
        .bind(&entry.memo)
        .bind(&entry.reference)
        .bind(entry.status)
        .bind(entry.updated_at)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(missed_entry(&mut tx, entry.owner_id, entry.entry_id).await);
        }

        delete_lines(&mut tx, entry.entry_id).await?;
        insert_lines(&mut tx, entry.entry_id, entry.owner_id, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replaces the line set of an entry in one transaction
    pub async fn replace_lines(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        expected: EntryStatus,
        lines: &[NewLine],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE journal_entries SET updated_at = $3
            WHERE owner_id = $1 AND entry_id = $2 AND status = $4
            "#,
        )
        .bind(owner_id)
        .bind(entry_id)
        .bind(Utc::now())
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(missed_entry(&mut tx, owner_id, entry_id).await);
        }

        delete_lines(&mut tx, entry_id).await?;
        insert_lines(&mut tx, entry_id, owner_id, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes an entry; its lines go with it through the cascade
    pub async fn delete_entry(&self, owner_id: Uuid, entry_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE owner_id = $1 AND entry_id = $2")
            .bind(owner_id)
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("JournalEntry", entry_id));
        }
        Ok(())
    }

    /// Runs a trivial query to confirm the pool can reach the database
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Explains a guarded UPDATE that matched no row: the entry is gone, or its
/// status moved since the caller read it
async fn missed_entry(tx: &mut Transaction<'_, Postgres>, owner_id: Uuid, entry_id: Uuid) -> DatabaseError {
    let status = sqlx::query_scalar::<_, EntryStatus>(
        "SELECT status FROM journal_entries WHERE owner_id = $1 AND entry_id = $2",
    )
    .bind(owner_id)
    .bind(entry_id)
    .fetch_optional(&mut **tx)
    .await;

    match status {
        Ok(Some(status)) => {
            DatabaseError::StaleWrite(format!("entry {} is now {:?}", entry_id, status))
        }
        Ok(None) => DatabaseError::not_found("JournalEntry", entry_id),
        Err(e) => e.into(),
    }
}

async fn delete_lines(tx: &mut Transaction<'_, Postgres>, entry_id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM journal_lines WHERE entry_id = $1")
        .bind(entry_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    owner_id: Uuid,
    lines: &[NewLine],
) -> Result<(), DatabaseError> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO journal_lines (
                line_id, entry_id, owner_id, position, account_code, debit, credit, memo
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(line.line_id)
        .bind(entry_id)
        .bind(owner_id)
        .bind(position as i32)
        .bind(&line.account_code)
        .bind(line.debit)
        .bind(line.credit)
        .bind(&line.memo)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// ============================================================================
// Row types
// ============================================================================

/// Database enum for account kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_kind", rename_all = "snake_case")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
    Cost,
    IntermediateBalance,
    Memorandum,
}

/// Database enum for entry types
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "snake_case")]
pub enum EntryType {
    Opening,
    Daily,
    Adjustment,
    Closing,
}

/// Database enum for entry statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "entry_status", rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Posted,
    Voided,
}

/// Account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub owner_id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Account values for insert or update
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub owner_id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    pub active: bool,
}

/// Journal entry header row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntryRow {
    pub entry_id: Uuid,
    pub owner_id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub entry_type: EntryType,
    pub memo: String,
    pub reference: Option<String>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Journal entry header values for insert or update
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub entry_id: Uuid,
    pub owner_id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub entry_type: EntryType,
    pub memo: String,
    pub reference: Option<String>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Journal line row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineRow {
    pub line_id: Uuid,
    pub entry_id: Uuid,
    pub position: i32,
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub memo: Option<String>,
}

/// Journal line values for insert; position follows slice order
#[derive(Debug, Clone)]
pub struct NewLine {
    pub line_id: Uuid,
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub memo: Option<String>,
}

/// An entry header with its lines in position order
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    pub entry: EntryRow,
    pub lines: Vec<LineRow>,
}
