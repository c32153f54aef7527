//! In-memory ledger store
//!
//! Accounts and entries of every owner live behind one `RwLock`, so each
//! write runs under a single exclusive guard and is all-or-nothing. Used by
//! tests and by the API server when `storage = memory`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::debug;

use core_kernel::{
    DateRange, DomainPort, EntryId, HealthCheckResult, HealthCheckable, OperationMetadata,
    OwnerId, PortError,
};

use crate::account::{Account, AccountPatch};
use crate::entry::{EntryStatus, JournalEntry, JournalLine};
use crate::ports::{AccountStore, EntryStore};

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<OwnerId, BTreeMap<String, Account>>,
    entries: HashMap<EntryId, JournalEntry>,
}

impl StoreState {
    fn owned_entry(&self, owner: OwnerId, id: EntryId) -> Result<&JournalEntry, PortError> {
        self.entries
            .get(&id)
            .filter(|entry| entry.owner_id == owner)
            .ok_or_else(|| PortError::not_found("JournalEntry", id))
    }

    /// The entry, provided its status has not moved away from `expected`
    fn entry_in_status(
        &self,
        owner: OwnerId,
        id: EntryId,
        expected: EntryStatus,
    ) -> Result<&JournalEntry, PortError> {
        let entry = self.owned_entry(owner, id)?;
        if entry.status != expected {
            return Err(PortError::conflict(format!(
                "entry {} is {}, expected {}",
                entry.entry_number, entry.status, expected
            )));
        }
        Ok(entry)
    }

    fn number_taken(&self, entry: &JournalEntry) -> bool {
        self.entries.values().any(|other| {
            other.owner_id == entry.owner_id
                && other.entry_number == entry.entry_number
                && other.id != entry.id
        })
    }
}

/// Ledger store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<StoreState>,
    unavailable: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a connection error until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PortError::connection("in-memory ledger store is unavailable"));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, PortError> {
        self.check_available()?;
        self.state
            .read()
            .map_err(|_| PortError::internal("ledger store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, PortError> {
        self.check_available()?;
        self.state
            .write()
            .map_err(|_| PortError::internal("ledger store lock poisoned"))
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        match self.read() {
            Ok(_) => HealthCheckResult::healthy("memory", start.elapsed().as_millis() as u64),
            Err(e) => HealthCheckResult::unhealthy(
                "memory",
                start.elapsed().as_millis() as u64,
                e.to_string(),
            ),
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryLedgerStore {
    async fn list_accounts(&self, owner: OwnerId) -> Result<Vec<Account>, PortError> {
        let state = self.read()?;
        Ok(state
            .accounts
            .get(&owner)
            .map(|accounts| accounts.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_account(&self, owner: OwnerId, account: Account) -> Result<Account, PortError> {
        let mut state = self.write()?;
        let accounts = state.accounts.entry(owner).or_default();
        if accounts.contains_key(&account.code) {
            return Err(PortError::conflict(format!(
                "account code {} already exists",
                account.code
            )));
        }
        accounts.insert(account.code.clone(), account.clone());
        Ok(account)
    }

    async fn update_account(
        &self,
        owner: OwnerId,
        code: &str,
        patch: AccountPatch,
    ) -> Result<Account, PortError> {
        let mut state = self.write()?;
        let account = state
            .accounts
            .get_mut(&owner)
            .and_then(|accounts| accounts.get_mut(code))
            .ok_or_else(|| PortError::not_found("Account", code))?;
        patch.apply(account);
        Ok(account.clone())
    }

    async fn delete_account(&self, owner: OwnerId, code: &str) -> Result<(), PortError> {
        let mut state = self.write()?;
        let referenced = state.entries.values().any(|entry| {
            entry.owner_id == owner && entry.lines.iter().any(|line| line.account_code == code)
        });
        if referenced {
            return Err(PortError::conflict(format!(
                "account {} is referenced by journal lines",
                code
            )));
        }
        state
            .accounts
            .get_mut(&owner)
            .and_then(|accounts| accounts.remove(code))
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Account", code))
    }

    async fn insert_missing_accounts(
        &self,
        owner: OwnerId,
        accounts: Vec<Account>,
    ) -> Result<usize, PortError> {
        let mut state = self.write()?;
        let existing = state.accounts.entry(owner).or_default();
        let mut inserted = 0;
        for account in accounts {
            if !existing.contains_key(&account.code) {
                existing.insert(account.code.clone(), account);
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl EntryStore for InMemoryLedgerStore {
    async fn list_entries(
        &self,
        owner: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, PortError> {
        let state = self.read()?;
        let mut entries: Vec<JournalEntry> = state
            .entries
            .values()
            .filter(|entry| entry.owner_id == owner)
            .filter(|entry| range.map_or(true, |r| r.contains(entry.date)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.entry_number.cmp(&b.entry_number))
        });
        Ok(entries)
    }

    async fn get_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, PortError> {
        let state = self.read()?;
        state.owned_entry(owner, id).cloned()
    }

    async fn count_lines_for_account(&self, owner: OwnerId, code: &str) -> Result<usize, PortError> {
        let state = self.read()?;
        Ok(state
            .entries
            .values()
            .filter(|entry| entry.owner_id == owner)
            .flat_map(|entry| entry.lines.iter())
            .filter(|line| line.account_code == code)
            .count())
    }

    async fn create_entry_with_lines(
        &self,
        entry: JournalEntry,
        metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError> {
        let mut state = self.write()?;
        if state.number_taken(&entry) {
            return Err(PortError::conflict(format!(
                "entry number {} already exists",
                entry.entry_number
            )));
        }
        debug!(
            entry_id = %entry.id,
            correlation_id = ?metadata.and_then(|m| m.correlation_id.as_deref()),
            "Storing journal entry in memory"
        );
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        entry: JournalEntry,
        expected: EntryStatus,
        _metadata: Option<&OperationMetadata>,
    ) -> Result<JournalEntry, PortError> {
        let mut state = self.write()?;
        state.entry_in_status(entry.owner_id, entry.id, expected)?;
        if state.number_taken(&entry) {
            return Err(PortError::conflict(format!(
                "entry number {} already exists",
                entry.entry_number
            )));
        }
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn replace_entry_lines(
        &self,
        owner: OwnerId,
        id: EntryId,
        expected: EntryStatus,
        lines: Vec<JournalLine>,
        _metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut state = self.write()?;
        state.entry_in_status(owner, id, expected)?;
        if let Some(entry) = state.entries.get_mut(&id) {
            entry.lines = lines;
            entry.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn delete_entry(
        &self,
        owner: OwnerId,
        id: EntryId,
        _metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut state = self.write()?;
        state.owned_entry(owner, id)?;
        state.entries.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;
    use crate::entry::EntryDraft;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(owner: OwnerId, number: &str) -> JournalEntry {
        JournalEntry::from_draft(
            owner,
            EntryDraft::new(number, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), "Test")
                .debit("1011", dec!(10))
                .credit("7011", dec!(10)),
        )
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let store = InMemoryLedgerStore::new();
        let alice = OwnerId::new();
        let bob = OwnerId::new();

        store
            .create_account(alice, Account::new("1011", "Cash", AccountKind::Asset))
            .await
            .unwrap();
        let stored = store.create_entry_with_lines(entry(alice, "A-001"), None).await.unwrap();

        assert!(store.list_accounts(bob).await.unwrap().is_empty());
        assert!(store.get_entry(bob, stored.id).await.unwrap_err().is_not_found());
        // Same number is fine for another owner
        assert!(store.create_entry_with_lines(entry(bob, "A-001"), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerId::new();
        store.create_entry_with_lines(entry(owner, "A-001"), None).await.unwrap();
        let err = store
            .create_entry_with_lines(entry(owner, "A-001"), None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_writes_require_expected_status() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerId::new();
        let stored = store.create_entry_with_lines(entry(owner, "A-001"), None).await.unwrap();

        let mut posted = stored.clone();
        posted.status = EntryStatus::Posted;
        store.update_entry(posted, EntryStatus::Draft, None).await.unwrap();

        let mut reverted = stored.clone();
        reverted.memo = "Edited".to_string();
        let err = store
            .update_entry(reverted, EntryStatus::Draft, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = store
            .replace_entry_lines(owner, stored.id, EntryStatus::Draft, Vec::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let current = store.get_entry(owner, stored.id).await.unwrap();
        assert_eq!(current.status, EntryStatus::Posted);
        assert_eq!(current.memo, "Test");
        assert_eq!(current.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_missing_skips_existing() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerId::new();
        store
            .create_account(owner, Account::new("10", "Custom cash", AccountKind::Asset))
            .await
            .unwrap();

        let inserted = store
            .insert_missing_accounts(
                owner,
                vec![
                    Account::new("10", "Cash", AccountKind::Asset),
                    Account::new("1011", "Cash on hand", AccountKind::Asset),
                ],
            )
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        let accounts = store.list_accounts(owner).await.unwrap();
        assert_eq!(accounts[0].name, "Custom cash");
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = InMemoryLedgerStore::new();
        store.set_unavailable(true);
        assert!(store.list_accounts(OwnerId::new()).await.unwrap_err().is_transient());
        assert!(!store.health_check().await.is_healthy());
    }
}
