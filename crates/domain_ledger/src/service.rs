//! Ledger service
//!
//! Orchestrates the catalog, validator and reports over the store ports.
//! Every write is validated against a fresh snapshot of the owner's accounts
//! and entries first; nothing reaches the store unless validation passed.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{DateRange, EntryId, OperationMetadata, OwnerId, PortError};

use crate::account::{validate_code, Account, AccountPatch, StandardChart};
use crate::catalog::{AccountCatalog, AccountView};
use crate::entry::{EntryDraft, EntryStatus, JournalEntry, JournalLine};
use crate::error::LedgerError;
use crate::ports::{AccountStore, EntryStore};
use crate::projection::{opening_balance, project};
use crate::report::{journal_report, trial_balance, GeneralLedger, JournalReport, TrialBalance};
use crate::validation::{EntryValidator, ValidationError};

/// Accounts are imported in chunks of this size
pub const IMPORT_BATCH_SIZE: usize = 100;

/// Application service for the ledger
#[derive(Clone)]
pub struct LedgerService {
    accounts: Arc<dyn AccountStore>,
    entries: Arc<dyn EntryStore>,
}

impl LedgerService {
    /// Creates a new ledger service
    ///
    /// # Arguments
    ///
    /// * `accounts` - Store for the chart of accounts
    /// * `entries` - Store for journal entries
    pub fn new(accounts: Arc<dyn AccountStore>, entries: Arc<dyn EntryStore>) -> Self {
        Self { accounts, entries }
    }

    /// Creates a service over a single store implementing both ports
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: AccountStore + EntryStore,
    {
        Self {
            accounts: store.clone(),
            entries: store,
        }
    }

    // ========================================================================
    // Account catalog
    // ========================================================================

    /// Loads the owner's full chart of accounts
    pub async fn catalog(&self, owner: OwnerId) -> Result<AccountCatalog, LedgerError> {
        let accounts = self.accounts.list_accounts(owner).await?;
        Ok(AccountCatalog::new(accounts))
    }

    /// Lists accounts with derived hierarchy attributes, optionally filtered
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn list_accounts(
        &self,
        owner: OwnerId,
        search: Option<&str>,
    ) -> Result<Vec<AccountView>, LedgerError> {
        let catalog = self.catalog(owner).await?;
        let accounts = match search {
            Some(term) => catalog.search(term),
            None => catalog.iter().collect(),
        };
        Ok(accounts.into_iter().map(|a| catalog.view(a)).collect())
    }

    /// Active leaf accounts, for entry forms
    pub async fn postable_accounts(&self, owner: OwnerId) -> Result<Vec<Account>, LedgerError> {
        let catalog = self.catalog(owner).await?;
        Ok(catalog.postable_accounts().into_iter().cloned().collect())
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `InvalidAccount` if the code is empty or contains whitespace
    /// - `DuplicateAccountCode` if the code already exists for the owner
    #[instrument(skip(self, account), fields(owner = %owner, code = %account.code))]
    pub async fn create_account(&self, owner: OwnerId, account: Account) -> Result<Account, LedgerError> {
        validate_code(&account.code)?;
        let code = account.code.clone();

        let created = self
            .accounts
            .create_account(owner, account)
            .await
            .map_err(|e| match e {
                PortError::Conflict { .. } => LedgerError::DuplicateAccountCode(code.clone()),
                other => LedgerError::Persistence(other),
            })?;

        info!(code = %created.code, "Account created");
        Ok(created)
    }

    /// Updates name, kind, description or active flag of an account
    #[instrument(skip(self, patch), fields(owner = %owner, code = %code))]
    pub async fn update_account(
        &self,
        owner: OwnerId,
        code: &str,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        self.accounts
            .update_account(owner, code, patch)
            .await
            .map_err(|e| account_error(e, code))
    }

    /// Deletes an account that has no sub-accounts and no journal lines
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the code does not exist
    /// - `AccountHasChildren` while descendant accounts exist
    /// - `AccountInUse` while journal lines reference the code
    #[instrument(skip(self), fields(owner = %owner, code = %code))]
    pub async fn delete_account(&self, owner: OwnerId, code: &str) -> Result<(), LedgerError> {
        let catalog = self.catalog(owner).await?;
        if !catalog.contains(code) {
            return Err(LedgerError::AccountNotFound(code.to_string()));
        }

        let child_count = catalog.descendants(code).count();
        if child_count > 0 {
            return Err(LedgerError::AccountHasChildren {
                code: code.to_string(),
                child_count,
            });
        }

        let line_count = self.entries.count_lines_for_account(owner, code).await?;
        if line_count > 0 {
            return Err(LedgerError::AccountInUse {
                code: code.to_string(),
                line_count,
            });
        }

        self.accounts
            .delete_account(owner, code)
            .await
            .map_err(|e| match e {
                PortError::Conflict { .. } => LedgerError::AccountInUse {
                    code: code.to_string(),
                    line_count: 0,
                },
                other => account_error(other, code),
            })?;

        info!("Account deleted");
        Ok(())
    }

    /// Inserts accounts whose codes are new, in batches, skipping existing ones
    ///
    /// # Returns
    ///
    /// The number of accounts inserted
    #[instrument(skip(self, accounts), fields(owner = %owner, count = accounts.len()))]
    pub async fn import_accounts(&self, owner: OwnerId, accounts: Vec<Account>) -> Result<usize, LedgerError> {
        for account in &accounts {
            validate_code(&account.code)?;
        }

        let mut inserted = 0;
        for batch in accounts.chunks(IMPORT_BATCH_SIZE) {
            inserted += self
                .accounts
                .insert_missing_accounts(owner, batch.to_vec())
                .await?;
        }

        info!(inserted, "Accounts imported");
        Ok(inserted)
    }

    /// Imports the built-in standard chart of accounts
    pub async fn load_standard_chart(&self, owner: OwnerId) -> Result<usize, LedgerError> {
        self.import_accounts(owner, StandardChart::create_standard_accounts())
            .await
    }

    // ========================================================================
    // Journal entries
    // ========================================================================

    pub async fn list_entries(
        &self,
        owner: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(self.entries.list_entries(owner, range).await?)
    }

    pub async fn get_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, LedgerError> {
        self.entries
            .get_entry(owner, id)
            .await
            .map_err(|e| entry_error(e, id))
    }

    /// Validates and stores a new draft entry with all of its lines
    ///
    /// # Errors
    ///
    /// - `Validation` with every violated rule; nothing is written
    /// - `Persistence` if the store fails; no partial entry is visible
    #[instrument(skip(self, draft), fields(owner = %owner, entry_number = %draft.entry_number))]
    pub async fn create_entry(&self, owner: OwnerId, draft: EntryDraft) -> Result<JournalEntry, LedgerError> {
        let (catalog, existing) = self.snapshot(owner).await?;
        if let Err(errors) = EntryValidator::new(&catalog, &existing).validate(&draft, None) {
            warn!(violations = errors.len(), first = %errors.first(), "Journal entry rejected");
            return Err(LedgerError::Validation(errors));
        }

        let entry = JournalEntry::from_draft(owner, draft);
        let (id, entry_number) = (entry.id, entry.entry_number.clone());
        let metadata = write_metadata(owner, &entry);
        let stored = self
            .entries
            .create_entry_with_lines(entry, Some(&metadata))
            .await
            .map_err(|e| duplicate_number_error(e, &entry_number, id))?;

        info!(entry_id = %stored.id, lines = stored.lines.len(), "Journal entry created");
        Ok(stored)
    }

    /// Replaces header and lines of a draft entry
    ///
    /// # Errors
    ///
    /// - `EntryLocked` if the entry is posted or voided
    /// - `Validation` if the new content breaks a rule
    #[instrument(skip(self, draft), fields(owner = %owner, entry_id = %id))]
    pub async fn update_entry(
        &self,
        owner: OwnerId,
        id: EntryId,
        draft: EntryDraft,
    ) -> Result<JournalEntry, LedgerError> {
        let mut entry = self.get_entry(owner, id).await?;
        ensure_editable(&entry)?;

        let (catalog, existing) = self.snapshot(owner).await?;
        if let Err(errors) = EntryValidator::new(&catalog, &existing).validate(&draft, Some(id)) {
            warn!(violations = errors.len(), first = %errors.first(), "Journal entry update rejected");
            return Err(LedgerError::Validation(errors));
        }

        let expected = entry.status;
        entry.apply_draft(draft);
        let entry_number = entry.entry_number.clone();
        let metadata = write_metadata(owner, &entry);
        let stored = match self.entries.update_entry(entry, expected, Some(&metadata)).await {
            Ok(stored) => stored,
            Err(e) if e.is_conflict() => {
                return Err(match self.status_moved(owner, id, expected).await {
                    Some(changed) => changed,
                    None => duplicate_number_error(e, &entry_number, id),
                });
            }
            Err(e) => return Err(entry_error(e, id)),
        };

        info!("Journal entry updated");
        Ok(stored)
    }

    /// Replaces only the lines of a draft entry
    #[instrument(skip(self, lines), fields(owner = %owner, entry_id = %id, lines = lines.len()))]
    pub async fn replace_lines(
        &self,
        owner: OwnerId,
        id: EntryId,
        lines: Vec<JournalLine>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut entry = self.get_entry(owner, id).await?;
        ensure_editable(&entry)?;

        let mut draft = entry.to_draft();
        draft.lines = lines;

        let (catalog, existing) = self.snapshot(owner).await?;
        if let Err(errors) = EntryValidator::new(&catalog, &existing).validate(&draft, Some(id)) {
            warn!(violations = errors.len(), first = %errors.first(), "Line replacement rejected");
            return Err(LedgerError::Validation(errors));
        }

        let metadata = write_metadata(owner, &entry);
        if let Err(e) = self
            .entries
            .replace_entry_lines(owner, id, entry.status, draft.lines.clone(), Some(&metadata))
            .await
        {
            return Err(self.write_error(e, owner, id, entry.status).await);
        }

        entry.apply_draft(draft);
        info!("Journal lines replaced");
        Ok(entry)
    }

    /// Deletes an entry with its lines; posted entries must be voided instead
    #[instrument(skip(self), fields(owner = %owner, entry_id = %id))]
    pub async fn delete_entry(&self, owner: OwnerId, id: EntryId) -> Result<(), LedgerError> {
        let entry = self.get_entry(owner, id).await?;
        if !entry.status.is_deletable() {
            return Err(LedgerError::EntryLocked {
                entry_number: entry.entry_number,
                status: entry.status,
                action: "deleted",
            });
        }

        let metadata = write_metadata(owner, &entry);
        self.entries
            .delete_entry(owner, id, Some(&metadata))
            .await
            .map_err(|e| entry_error(e, id))?;

        info!(entry_number = %entry.entry_number, "Journal entry deleted");
        Ok(())
    }

    /// Moves a draft to posted after validating it again
    #[instrument(skip(self), fields(owner = %owner, entry_id = %id))]
    pub async fn post_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, LedgerError> {
        let entry = self.get_entry(owner, id).await?;
        ensure_transition(&entry, EntryStatus::Posted)?;

        let (catalog, existing) = self.snapshot(owner).await?;
        EntryValidator::new(&catalog, &existing)
            .validate_entry(&entry)
            .map_err(|errors| {
                warn!(first = %errors.first(), "Posting rejected");
                LedgerError::Validation(errors)
            })?;

        self.set_status(owner, entry, EntryStatus::Posted).await
    }

    /// Voids a draft or posted entry; voided entries stay in the journal
    #[instrument(skip(self), fields(owner = %owner, entry_id = %id))]
    pub async fn void_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, LedgerError> {
        let entry = self.get_entry(owner, id).await?;
        ensure_transition(&entry, EntryStatus::Voided)?;
        self.set_status(owner, entry, EntryStatus::Voided).await
    }

    async fn set_status(
        &self,
        owner: OwnerId,
        mut entry: JournalEntry,
        status: EntryStatus,
    ) -> Result<JournalEntry, LedgerError> {
        let id = entry.id;
        let expected = entry.status;
        entry.status = status;
        entry.updated_at = chrono::Utc::now();

        let metadata = write_metadata(owner, &entry).with_context("status", status.as_str());
        let stored = match self.entries.update_entry(entry, expected, Some(&metadata)).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.write_error(e, owner, id, expected).await),
        };

        info!(status = %stored.status, "Journal entry status changed");
        Ok(stored)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// General ledger of one account
    ///
    /// With `carry_forward` the running balance starts from the net movement
    /// of every entry dated before the period; otherwise it starts at zero.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for a non-empty code missing from the catalog
    #[instrument(skip(self), fields(owner = %owner, account = %account_code))]
    pub async fn general_ledger(
        &self,
        owner: OwnerId,
        account_code: &str,
        range: DateRange,
        carry_forward: bool,
    ) -> Result<GeneralLedger, LedgerError> {
        if account_code.is_empty() {
            let projection = project(account_code, &range, &[]);
            return Ok(GeneralLedger::from_projection(account_code, None, range, &projection));
        }

        let catalog = self.catalog(owner).await?;
        let account_name = catalog
            .name_of(account_code)
            .map(str::to_string)
            .ok_or_else(|| LedgerError::AccountNotFound(account_code.to_string()))?;

        let entries = if carry_forward {
            self.entries.list_entries(owner, None).await?
        } else {
            self.entries.list_entries(owner, Some(range)).await?
        };

        let opening = if carry_forward {
            opening_balance(account_code, range.start, &entries)
        } else {
            rust_decimal::Decimal::ZERO
        };
        let projection = project(account_code, &range, &entries).starting_at(opening);

        Ok(GeneralLedger::from_projection(
            account_code,
            Some(account_name),
            range,
            &projection,
        ))
    }

    /// Journal of every entry in the period with account names resolved
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn journal_report(&self, owner: OwnerId, range: DateRange) -> Result<JournalReport, LedgerError> {
        let catalog = self.catalog(owner).await?;
        let entries = self.entries.list_entries(owner, Some(range)).await?;
        Ok(journal_report(&range, &entries).with_account_names(&catalog))
    }

    /// Per-account sums and balances for the period
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn trial_balance(&self, owner: OwnerId, range: DateRange) -> Result<TrialBalance, LedgerError> {
        let catalog = self.catalog(owner).await?;
        let entries = self.entries.list_entries(owner, Some(range)).await?;
        Ok(trial_balance(&range, &entries, &catalog))
    }

    async fn snapshot(&self, owner: OwnerId) -> Result<(AccountCatalog, Vec<JournalEntry>), LedgerError> {
        let catalog = self.catalog(owner).await?;
        let entries = self.entries.list_entries(owner, None).await?;
        Ok((catalog, entries))
    }

    /// `StatusChanged` if the stored entry has left `expected` since it was read
    async fn status_moved(&self, owner: OwnerId, id: EntryId, expected: EntryStatus) -> Option<LedgerError> {
        match self.entries.get_entry(owner, id).await {
            Ok(current) if current.status != expected => Some(LedgerError::StatusChanged {
                entry_number: current.entry_number,
                status: current.status,
            }),
            _ => None,
        }
    }

    async fn write_error(
        &self,
        error: PortError,
        owner: OwnerId,
        id: EntryId,
        expected: EntryStatus,
    ) -> LedgerError {
        if error.is_conflict() {
            if let Some(changed) = self.status_moved(owner, id, expected).await {
                return changed;
            }
        }
        entry_error(error, id)
    }
}

fn ensure_editable(entry: &JournalEntry) -> Result<(), LedgerError> {
    if entry.status.is_editable() {
        Ok(())
    } else {
        Err(LedgerError::EntryLocked {
            entry_number: entry.entry_number.clone(),
            status: entry.status,
            action: "edited",
        })
    }
}

fn ensure_transition(entry: &JournalEntry, target: EntryStatus) -> Result<(), LedgerError> {
    if entry.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(LedgerError::InvalidStatusTransition {
            entry_number: entry.entry_number.clone(),
            from: entry.status,
            to: target,
        })
    }
}

fn write_metadata(owner: OwnerId, entry: &JournalEntry) -> OperationMetadata {
    OperationMetadata::default()
        .initiated_by(owner.to_string())
        .with_context("entry_number", entry.entry_number.clone())
}

fn account_error(error: PortError, code: &str) -> LedgerError {
    if error.is_not_found() {
        LedgerError::AccountNotFound(code.to_string())
    } else {
        LedgerError::Persistence(error)
    }
}

fn entry_error(error: PortError, id: EntryId) -> LedgerError {
    if error.is_not_found() {
        LedgerError::EntryNotFound(id.to_string())
    } else {
        LedgerError::Persistence(error)
    }
}

/// A store-level uniqueness conflict means another write took the number first
fn duplicate_number_error(error: PortError, entry_number: &str, id: EntryId) -> LedgerError {
    if error.is_conflict() {
        LedgerError::Validation(
            ValidationError::DuplicateEntryNumber {
                entry_number: entry_number.to_string(),
            }
            .into(),
        )
    } else {
        entry_error(error, id)
    }
}
