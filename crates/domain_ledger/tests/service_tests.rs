//! Service tests for domain_ledger against the in-memory store

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use async_trait::async_trait;
use core_kernel::{
    DateRange, DomainPort, EntryId, OperationMetadata, OwnerId, PortError, MAX_LINE_AMOUNT,
};
use domain_ledger::{
    Account, AccountKind, AccountPatch, EntryStatus, EntryStore, InMemoryLedgerStore, JournalEntry,
    JournalLine, LedgerError, LedgerService, StandardChart,
};
use test_utils::{
    assert_rejected_with, AccountBuilder, AccountFixtures, DateFixtures, IdFixtures,
    JournalEntryBuilder,
};

async fn setup() -> (LedgerService, Arc<InMemoryLedgerStore>) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let service = LedgerService::with_store(store.clone());
    service
        .import_accounts(IdFixtures::owner_id(), AccountFixtures::small_chart())
        .await
        .unwrap();
    (service, store)
}

// ============================================================================
// Account Tests
// ============================================================================

mod account_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_duplicate_code_rejected() {
        let (service, _) = setup().await;
        let result = service
            .create_account(
                IdFixtures::owner_id(),
                AccountBuilder::new().with_code(AccountFixtures::CASH).build(),
            )
            .await;
        assert!(matches!(result, Err(LedgerError::DuplicateAccountCode(code)) if code == "1011"));
    }

    #[tokio::test]
    async fn test_create_rejects_whitespace_code() {
        let (service, _) = setup().await;
        let result = service
            .create_account(IdFixtures::owner_id(), AccountBuilder::new().with_code("10 1").build())
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidAccount { .. })));
    }

    #[tokio::test]
    async fn test_new_child_turns_parent_into_summary() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        service
            .create_account(owner, AccountBuilder::new().with_code("10111").build())
            .await
            .unwrap();

        let views = service.list_accounts(owner, Some("1011")).await.unwrap();
        let cash = views.iter().find(|v| v.account.code == "1011").unwrap();
        assert!(!cash.is_leaf);
        let child = views.iter().find(|v| v.account.code == "10111").unwrap();
        assert_eq!(child.parent_code.as_deref(), Some("1011"));
        assert_eq!(child.level, 4);
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let (service, _) = setup().await;
        let result = service
            .update_account(IdFixtures::owner_id(), "9999", AccountPatch::default())
            .await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_guards() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();

        let result = service.delete_account(owner, "10").await;
        assert!(matches!(result, Err(LedgerError::AccountHasChildren { .. })));

        service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();
        let result = service.delete_account(owner, AccountFixtures::CASH).await;
        assert!(matches!(result, Err(LedgerError::AccountInUse { line_count: 1, .. })));

        service.delete_account(owner, AccountFixtures::BANK).await.unwrap();
        let result = service.delete_account(owner, AccountFixtures::BANK).await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_standard_chart_import_skips_existing() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let inserted = service.load_standard_chart(owner).await.unwrap();

        let existing = AccountFixtures::small_chart();
        let overlap = StandardChart::create_standard_accounts()
            .iter()
            .filter(|a| existing.iter().any(|e| e.code == a.code))
            .count();
        assert_eq!(inserted, StandardChart::create_standard_accounts().len() - overlap);

        assert_eq!(service.load_standard_chart(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_in_batches() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let service = LedgerService::with_store(store);
        let accounts: Vec<Account> = (0..250)
            .map(|i| Account::new(format!("9{:03}", i), format!("Cost center {}", i), AccountKind::Cost))
            .collect();
        let inserted = service
            .import_accounts(IdFixtures::owner_id(), accounts)
            .await
            .unwrap();
        assert_eq!(inserted, 250);
    }
}

// ============================================================================
// Entry Tests
// ============================================================================

mod entry_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_refetch_revalidates() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();

        let fetched = service.get_entry(owner, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, EntryStatus::Draft);

        let posted = service.post_entry(owner, created.id).await.unwrap();
        assert_eq!(posted.status, EntryStatus::Posted);
    }

    #[tokio::test]
    async fn test_rejected_entry_is_not_written() {
        let (service, store) = setup().await;
        let owner = IdFixtures::owner_id();
        let draft = JournalEntryBuilder::new()
            .debit(AccountFixtures::CASH, dec!(100.00))
            .credit(AccountFixtures::SALES, dec!(99.98))
            .draft();

        let result = service.create_entry(owner, draft).await;
        assert_rejected_with(&result, "unbalanced_entry");
        assert!(store.list_entries(owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_entry_number() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        service
            .create_entry(owner, JournalEntryBuilder::new().with_number("A-001").draft())
            .await
            .unwrap();
        let result = service
            .create_entry(owner, JournalEntryBuilder::new().with_number("A-001").draft())
            .await;
        assert_rejected_with(&result, "duplicate_entry_number");

        // Other owners have their own numbering
        service
            .import_accounts(IdFixtures::other_owner_id(), AccountFixtures::small_chart())
            .await
            .unwrap();
        assert!(service
            .create_entry(
                IdFixtures::other_owner_id(),
                JournalEntryBuilder::new().with_number("A-001").draft()
            )
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_own_number_and_replaces_lines() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();

        let edited = JournalEntryBuilder::new()
            .with_memo("Corrected sale")
            .debit(AccountFixtures::BANK, dec!(59))
            .credit(AccountFixtures::SALES, dec!(50))
            .credit(AccountFixtures::IGV, dec!(9))
            .draft();
        let updated = service.update_entry(owner, created.id, edited).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.memo, "Corrected sale");
        assert_eq!(updated.lines.len(), 3);
        assert_eq!(updated.total_debit(), dec!(59));
    }

    #[tokio::test]
    async fn test_replace_lines_validates() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();

        let result = service
            .replace_lines(
                owner,
                created.id,
                vec![JournalLine::debit(AccountFixtures::CASH_SUMMARY, dec!(10))],
            )
            .await;
        assert_rejected_with(&result, "unbalanced_entry");

        let replaced = service
            .replace_lines(
                owner,
                created.id,
                vec![
                    JournalLine::debit(AccountFixtures::PURCHASES, dec!(10)),
                    JournalLine::credit(AccountFixtures::CASH, dec!(10)),
                ],
            )
            .await
            .unwrap();
        assert_eq!(service.get_entry(owner, created.id).await.unwrap().lines, replaced.lines);
    }

    #[tokio::test]
    async fn test_posted_entry_is_locked() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();
        service.post_entry(owner, created.id).await.unwrap();

        let edit = service
            .update_entry(owner, created.id, JournalEntryBuilder::new().draft())
            .await;
        assert!(matches!(edit, Err(LedgerError::EntryLocked { action: "edited", .. })));

        let delete = service.delete_entry(owner, created.id).await;
        assert!(matches!(delete, Err(LedgerError::EntryLocked { action: "deleted", .. })));

        let repost = service.post_entry(owner, created.id).await;
        assert!(matches!(repost, Err(LedgerError::InvalidStatusTransition { .. })));

        let voided = service.void_entry(owner, created.id).await.unwrap();
        assert_eq!(voided.status, EntryStatus::Voided);
        service.delete_entry(owner, created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let (service, _) = setup().await;
        let result = service.get_entry(IdFixtures::owner_id(), EntryId::new()).await;
        assert!(matches!(result, Err(LedgerError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn test_sub_cent_lines_are_not_stored() {
        let (service, store) = setup().await;
        let owner = IdFixtures::owner_id();
        let mut lines: Vec<JournalLine> = (0..10)
            .map(|_| JournalLine::debit(AccountFixtures::CASH, dec!(0.005)))
            .collect();
        lines.push(JournalLine::credit(AccountFixtures::SALES, dec!(0.05)));

        let result = service
            .create_entry(owner, JournalEntryBuilder::new().with_lines(lines).draft())
            .await;
        assert_rejected_with(&result, "amount_precision");
        assert!(store.list_entries(owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_not_stored() {
        let (service, store) = setup().await;
        let owner = IdFixtures::owner_id();
        let half = Decimal::MAX / dec!(2) + dec!(1);
        for number in ["A-001", "A-002"] {
            let result = service
                .create_entry(
                    owner,
                    JournalEntryBuilder::new()
                        .with_number(number)
                        .debit(AccountFixtures::CASH, half)
                        .credit(AccountFixtures::SALES, half)
                        .draft(),
                )
                .await;
            assert_rejected_with(&result, "amount_too_large");
        }
        assert!(store.list_entries(owner, None).await.unwrap().is_empty());

        let report = service.journal_report(owner, DateRange::unbounded()).await.unwrap();
        assert_eq!(report.grand_debit_total, Decimal::ZERO);
    }

    /// Posts the entry through the inner store right before every guarded
    /// write, the way a concurrent `post` request would
    struct PostsFirstStore {
        inner: Arc<InMemoryLedgerStore>,
    }

    impl PostsFirstStore {
        async fn post_behind(&self, owner: OwnerId, id: EntryId) -> Result<(), PortError> {
            let mut current = self.inner.get_entry(owner, id).await?;
            current.status = EntryStatus::Posted;
            self.inner.update_entry(current, EntryStatus::Draft, None).await?;
            Ok(())
        }
    }

    impl DomainPort for PostsFirstStore {}

    #[async_trait]
    impl EntryStore for PostsFirstStore {
        async fn list_entries(
            &self,
            owner: OwnerId,
            range: Option<DateRange>,
        ) -> Result<Vec<JournalEntry>, PortError> {
            self.inner.list_entries(owner, range).await
        }

        async fn get_entry(&self, owner: OwnerId, id: EntryId) -> Result<JournalEntry, PortError> {
            self.inner.get_entry(owner, id).await
        }

        async fn count_lines_for_account(&self, owner: OwnerId, code: &str) -> Result<usize, PortError> {
            self.inner.count_lines_for_account(owner, code).await
        }

        async fn create_entry_with_lines(
            &self,
            entry: JournalEntry,
            metadata: Option<&OperationMetadata>,
        ) -> Result<JournalEntry, PortError> {
            self.inner.create_entry_with_lines(entry, metadata).await
        }

        async fn update_entry(
            &self,
            entry: JournalEntry,
            expected: EntryStatus,
            metadata: Option<&OperationMetadata>,
        ) -> Result<JournalEntry, PortError> {
            self.post_behind(entry.owner_id, entry.id).await?;
            self.inner.update_entry(entry, expected, metadata).await
        }

        async fn replace_entry_lines(
            &self,
            owner: OwnerId,
            id: EntryId,
            expected: EntryStatus,
            lines: Vec<JournalLine>,
            metadata: Option<&OperationMetadata>,
        ) -> Result<(), PortError> {
            self.post_behind(owner, id).await?;
            self.inner.replace_entry_lines(owner, id, expected, lines, metadata).await
        }

        async fn delete_entry(
            &self,
            owner: OwnerId,
            id: EntryId,
            metadata: Option<&OperationMetadata>,
        ) -> Result<(), PortError> {
            self.inner.delete_entry(owner, id, metadata).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_post_is_not_reverted() {
        let (service, store) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();
        let racing = LedgerService::new(
            store.clone(),
            Arc::new(PostsFirstStore { inner: store.clone() }),
        );

        let edit = racing
            .update_entry(owner, created.id, JournalEntryBuilder::new().with_memo("Edited").draft())
            .await;
        assert!(matches!(
            edit,
            Err(LedgerError::StatusChanged { status: EntryStatus::Posted, .. })
        ));

        let stored = store.get_entry(owner, created.id).await.unwrap();
        assert_eq!(stored.status, EntryStatus::Posted);
        assert_eq!(stored.memo, created.memo);
    }

    #[tokio::test]
    async fn test_concurrent_post_blocks_line_replacement() {
        let (service, store) = setup().await;
        let owner = IdFixtures::owner_id();
        let created = service
            .create_entry(owner, JournalEntryBuilder::new().draft())
            .await
            .unwrap();
        let racing = LedgerService::new(
            store.clone(),
            Arc::new(PostsFirstStore { inner: store.clone() }),
        );

        let replaced = racing
            .replace_lines(
                owner,
                created.id,
                vec![
                    JournalLine::debit(AccountFixtures::PURCHASES, dec!(10)),
                    JournalLine::credit(AccountFixtures::CASH, dec!(10)),
                ],
            )
            .await;
        assert!(matches!(replaced, Err(LedgerError::StatusChanged { .. })));
        assert_eq!(store.get_entry(owner, created.id).await.unwrap().lines, created.lines);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_persistence() {
        let (service, store) = setup().await;
        store.set_unavailable(true);
        let result = service
            .create_entry(IdFixtures::owner_id(), JournalEntryBuilder::new().draft())
            .await;
        match result {
            Err(err @ LedgerError::Persistence(_)) => assert!(!err.is_recoverable()),
            other => panic!("expected persistence error, got {:?}", other),
        }
        store.set_unavailable(false);
        assert!(store.list_entries(IdFixtures::owner_id(), None).await.unwrap().is_empty());
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    async fn seed(service: &LedgerService) {
        let owner = IdFixtures::owner_id();
        let drafts = vec![
            JournalEntryBuilder::new()
                .with_number("A-001")
                .with_date(DateFixtures::january(5))
                .draft(),
            JournalEntryBuilder::new()
                .with_number("A-002")
                .with_date(DateFixtures::january(20))
                .debit(AccountFixtures::PURCHASES, dec!(40))
                .credit(AccountFixtures::CASH, dec!(40))
                .draft(),
            JournalEntryBuilder::new()
                .with_number("B-001")
                .with_date(DateFixtures::february(3))
                .debit(AccountFixtures::CASH, dec!(10))
                .credit(AccountFixtures::SALES, dec!(10))
                .draft(),
        ];
        for draft in drafts {
            service.create_entry(owner, draft).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_general_ledger_without_carry_forward() {
        let (service, _) = setup().await;
        seed(&service).await;

        let ledger = service
            .general_ledger(
                IdFixtures::owner_id(),
                AccountFixtures::CASH,
                DateFixtures::february_period(),
                false,
            )
            .await
            .unwrap();

        assert_eq!(ledger.account_name.as_deref(), Some("Cash"));
        assert_eq!(ledger.summary.opening_balance, Decimal::ZERO);
        assert_eq!(ledger.movements.len(), 1);
        assert_eq!(ledger.movements[0].running_balance, dec!(10));
    }

    #[tokio::test]
    async fn test_general_ledger_with_carry_forward() {
        let (service, _) = setup().await;
        seed(&service).await;

        let ledger = service
            .general_ledger(
                IdFixtures::owner_id(),
                AccountFixtures::CASH,
                DateFixtures::february_period(),
                true,
            )
            .await
            .unwrap();

        assert_eq!(ledger.summary.opening_balance, dec!(78));
        assert_eq!(ledger.movements[0].running_balance, dec!(88));
        assert_eq!(ledger.summary.closing_balance, dec!(88));
    }

    #[tokio::test]
    async fn test_journal_totals_at_largest_line_amount() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        for number in ["A-001", "A-002"] {
            service
                .create_entry(
                    owner,
                    JournalEntryBuilder::new()
                        .with_number(number)
                        .debit(AccountFixtures::CASH, MAX_LINE_AMOUNT)
                        .credit(AccountFixtures::SALES, MAX_LINE_AMOUNT)
                        .draft(),
                )
                .await
                .unwrap();
        }

        let journal = service.journal_report(owner, DateRange::unbounded()).await.unwrap();
        assert_eq!(journal.grand_debit_total, MAX_LINE_AMOUNT * dec!(2));
        assert_eq!(journal.grand_credit_total, journal.grand_debit_total);

        let tb = service.trial_balance(owner, DateRange::unbounded()).await.unwrap();
        assert!(tb.is_balanced());
    }

    #[tokio::test]
    async fn test_general_ledger_unknown_and_empty_account() {
        let (service, _) = setup().await;
        let owner = IdFixtures::owner_id();
        let range = DateFixtures::january_period();

        let result = service.general_ledger(owner, "9999", range, false).await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));

        let empty = service.general_ledger(owner, "", range, false).await.unwrap();
        assert!(empty.movements.is_empty());
    }

    #[tokio::test]
    async fn test_journal_report_and_trial_balance() {
        let (service, _) = setup().await;
        seed(&service).await;
        let owner = IdFixtures::owner_id();

        let journal = service
            .journal_report(owner, DateFixtures::january_period())
            .await
            .unwrap();
        assert_eq!(journal.entries.len(), 2);
        assert_eq!(journal.grand_debit_total, dec!(158));
        assert_eq!(journal.grand_credit_total, dec!(158));
        assert_eq!(journal.entries[0].lines[0].account_name.as_deref(), Some("Cash"));

        let tb = service
            .trial_balance(owner, DateFixtures::january_period())
            .await
            .unwrap();
        assert!(tb.is_balanced());
        let cash = tb.rows.iter().find(|r| r.account_code == AccountFixtures::CASH).unwrap();
        assert_eq!(cash.debit_balance, dec!(78));
    }
}
