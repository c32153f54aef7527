//! Ledger domain errors

use core_kernel::{PortError, TemporalError};
use thiserror::Error;

use crate::entry::EntryStatus;
use crate::validation::ValidationErrors;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The candidate entry broke one or more validation rules
    #[error("Journal entry rejected: {0}")]
    Validation(ValidationErrors),

    /// Account code or kind is not acceptable
    #[error("Invalid account '{code}': {reason}")]
    InvalidAccount { code: String, reason: String },

    /// Account code already exists for the owner
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Account is still referenced by journal lines
    #[error("Account {code} is used by {line_count} journal line(s) and cannot be deleted")]
    AccountInUse { code: String, line_count: usize },

    /// Account still has sub-accounts
    #[error("Account {code} has {child_count} sub-account(s) and cannot be deleted")]
    AccountHasChildren { code: String, child_count: usize },

    /// Entry is no longer editable or deletable in its current status
    #[error("Journal entry {entry_number} is {status} and cannot be {action}")]
    EntryLocked {
        entry_number: String,
        status: EntryStatus,
        action: &'static str,
    },

    /// Requested status change is not allowed
    #[error("Journal entry {entry_number} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        entry_number: String,
        from: EntryStatus,
        to: EntryStatus,
    },

    /// Another request changed the entry's status between read and write
    #[error("Journal entry {entry_number} became {status} before the change was saved")]
    StatusChanged {
        entry_number: String,
        status: EntryStatus,
    },

    /// Report period is malformed
    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] TemporalError),

    /// Store failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PortError),
}

impl LedgerError {
    pub fn invalid_account(code: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::InvalidAccount {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the caller can fix the input and resubmit
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LedgerError::Persistence(_))
    }

    /// Returns true for references to a missing account or entry
    pub fn is_not_found(&self) -> bool {
        match self {
            LedgerError::AccountNotFound(_) | LedgerError::EntryNotFound(_) => true,
            LedgerError::Persistence(err) => err.is_not_found(),
            _ => false,
        }
    }
}

impl From<ValidationErrors> for LedgerError {
    fn from(errors: ValidationErrors) -> Self {
        LedgerError::Validation(errors)
    }
}
