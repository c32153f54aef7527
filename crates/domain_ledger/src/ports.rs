//! Ledger Domain Ports
//!
//! This module defines the store interfaces the ledger engine needs from its
//! persistence layer. The engine itself never talks to a database; it
//! validates and projects over data fetched through these traits.
//!
//! # Adapters
//!
//! - **PostgresLedgerAdapter** (infra_db): SQL tables, transactional writes
//! - **InMemoryLedgerStore** (this crate): a single locked map, for tests and
//!   local runs
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryLedgerStore::new());
//! let service = LedgerService::new(store.clone(), store);
//! ```

use async_trait::async_trait;

use core_kernel::{DateRange, DomainPort, EntryId, OperationMetadata, OwnerId, PortError};

use crate::account::{Account, AccountPatch};
use crate::entry::{EntryStatus, JournalEntry, JournalLine};

/// Persistence of the chart of accounts
#[async_trait]
pub trait AccountStore: DomainPort {
    /// Lists every account of the owner, active or not
    async fn list_accounts(&self, owner: OwnerId) -> Result<Vec<Account>, PortError>;

    /// Inserts a new account
    ///
    /// # Returns
    ///
    /// The stored account, or `PortError::Conflict` when the code is taken
    async fn create_account(&self, owner: OwnerId, account: Account) -> Result<Account, PortError>;

    /// Applies a patch to an existing account
    ///
    /// # Returns
    ///
    /// The updated account, or `PortError::NotFound`
    async fn update_account(
        &self,
        owner: OwnerId,
        code: &str,
        patch: AccountPatch,
    ) -> Result<Account, PortError>;

    /// Deletes an account by code
    async fn delete_account(&self, owner: OwnerId, code: &str) -> Result<(), PortError>;

    /// Inserts accounts whose codes do not exist yet, leaving existing ones untouched
    ///
    /// # Returns
    ///
    /// The number of accounts actually inserted
    async fn insert_missing_accounts(
        &self,
        owner: OwnerId,
        accounts: Vec<Account>,
    ) -> Result<usize, PortError>;
}

/// Persistence of journal entries and their lines
///
/// Every write that touches both a header and its lines must be atomic:
/// either all of it becomes visible or none of it does.
#[async_trait]
pub trait EntryStore: DomainPort {
    // ========================================================================
    // Queries
    // ========================================================================

    /// Lists the owner's entries with their lines, ordered by date then number
    ///
    /// # Arguments
    ///
    /// * `owner` - Owning tenant
    /// * `range` - Optional inclusive date filter; `None` returns every entry
    async fn list_entries(
        &self,
        owner: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, PortError>;

    /// Retrieves one entry with its lines
    async fn get_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, PortError>;

    /// Counts journal lines that reference an account code
    async fn count_lines_for_account(&self, owner: OwnerId, code: &str) -> Result<usize, PortError>;

    // ========================================================================
    // Atomic writes
    // ========================================================================

    /// Inserts a header and all of its lines as one unit
    ///
    /// # Returns
    ///
    /// The stored entry, or `PortError::Conflict` on a duplicate entry number
    async fn create_entry_with_lines(
        &self,
        entry: JournalEntry,
        metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError>;

    /// Overwrites a header and replaces its full line set as one unit
    ///
    /// The write only applies while the stored status is still `expected`;
    /// otherwise nothing changes and `PortError::Conflict` is returned.
    async fn update_entry(
        &self,
        entry: JournalEntry,
        expected: EntryStatus,
        metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError>;

    /// Replaces the full line set of an entry as one unit, under the same
    /// status guard as [`EntryStore::update_entry`]
    async fn replace_entry_lines(
        &self,
        owner: OwnerId,
        id: EntryId,
        expected: EntryStatus,
        lines: Vec<JournalLine>,
        metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Deletes an entry together with its lines
    async fn delete_entry(
        &self,
        owner: OwnerId,
        id: EntryId,
        metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError>;
}
