//! Ledger Domain - Double-Entry Bookkeeping Engine
//!
//! This crate implements the accounting core of the ERP: the chart of
//! accounts, journal entries with their validation rules, and the read-only
//! views derived from them (general ledger, journal and trial balance).
//!
//! # Double-Entry Principles
//!
//! - Every journal entry balances: total debits equal total credits
//!   within 0.01 currency units
//! - Every line moves exactly one side: a debit or a credit, never both
//! - Only leaf accounts accept movements; summary accounts aggregate
//!   their sub-accounts by code prefix
//!
//! # Account Hierarchy
//!
//! Codes are hierarchical by prefix. With `10`, `101` and `1011` in the
//! catalog, `10` and `101` are summary accounts and `1011` is postable.
//! Leaf status is derived from the code set on every read.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{EntryDraft, LedgerService, InMemoryLedgerStore};
//!
//! let service = LedgerService::with_store(Arc::new(InMemoryLedgerStore::new()));
//! service.load_standard_chart(owner).await?;
//!
//! let draft = EntryDraft::new("A-001", date, "Cash sale")
//!     .debit("1011", dec!(118))
//!     .credit("7011", dec!(100))
//!     .credit("40111", dec!(18));
//!
//! let entry = service.create_entry(owner, draft).await?;
//! ```

pub mod account;
pub mod catalog;
pub mod entry;
pub mod validation;
pub mod projection;
pub mod report;
pub mod ports;
pub mod service;
pub mod adapters;
pub mod error;

pub use account::{Account, AccountKind, AccountPatch, StandardChart, validate_code};
pub use catalog::{AccountCatalog, AccountView, is_leaf};
pub use entry::{EntryDraft, EntryStatus, EntryType, JournalEntry, JournalLine};
pub use validation::{EntryValidator, ValidationError, ValidationErrors, validate};
pub use projection::{LedgerMovement, LedgerProjection, LedgerSummary, opening_balance, project};
pub use report::{
    GeneralLedger, JournalReport, JournalReportEntry, ReportLine, TrialBalance, TrialBalanceRow,
    journal_report, trial_balance,
};
pub use ports::{AccountStore, EntryStore};
pub use service::{LedgerService, IMPORT_BATCH_SIZE};
pub use adapters::InMemoryLedgerStore;
pub use error::LedgerError;
