//! Account types for the chart of accounts
//!
//! An account is identified by its code. Codes are hierarchical by prefix:
//! `"10"` is the parent of `"101"`, which is the parent of `"1011"`. Whether
//! an account is a summary node or a postable leaf is never stored; it is
//! derived from the full set of codes by [`crate::catalog::AccountCatalog`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Kinds of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Income accounts (credit normal balance)
    Income,
    /// Expense accounts (debit normal balance)
    Expense,
    /// Cost accounts by function (debit normal balance)
    Cost,
    /// Intermediate balances such as gross margin (credit normal balance)
    IntermediateBalance,
    /// Memorandum (off-balance) accounts
    Memorandum,
}

impl AccountKind {
    /// Returns true if this account kind has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(
            self,
            AccountKind::Asset | AccountKind::Expense | AccountKind::Cost | AccountKind::Memorandum
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "asset",
            AccountKind::Liability => "liability",
            AccountKind::Equity => "equity",
            AccountKind::Income => "income",
            AccountKind::Expense => "expense",
            AccountKind::Cost => "cost",
            AccountKind::IntermediateBalance => "intermediate_balance",
            AccountKind::Memorandum => "memorandum",
        }
    }

    pub fn all() -> [AccountKind; 8] {
        [
            AccountKind::Asset,
            AccountKind::Liability,
            AccountKind::Equity,
            AccountKind::Income,
            AccountKind::Expense,
            AccountKind::Cost,
            AccountKind::IntermediateBalance,
            AccountKind::Memorandum,
        ]
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountKind::all()
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LedgerError::invalid_account(s, "unknown account kind"))
    }
}

/// An account in the chart of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Hierarchical account code, unique per owner (e.g., "1011")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account kind
    pub kind: AccountKind,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the account is offered for new postings
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Account {
    /// Creates a new active account
    ///
    /// # Arguments
    ///
    /// * `code` - Account code
    /// * `name` - Account name
    /// * `kind` - Kind of account
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            description: None,
            active: true,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the account inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns true if `other` extends this account's code as a proper prefix
    pub fn is_ancestor_of(&self, other: &str) -> bool {
        other.len() > self.code.len() && other.starts_with(self.code.as_str())
    }
}

/// Partial update of an account; the code itself is immutable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl AccountPatch {
    /// Applies the patch in place
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(kind) = self.kind {
            account.kind = kind;
        }
        if let Some(description) = &self.description {
            account.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(active) = self.active {
            account.active = active;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.description.is_none() && self.active.is_none()
    }
}

/// Checks that an account code is usable as a hierarchy key
///
/// # Errors
///
/// Returns `LedgerError::InvalidAccount` for empty codes or codes containing whitespace
pub fn validate_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty() {
        return Err(LedgerError::invalid_account(code, "code must not be empty"));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(LedgerError::invalid_account(code, "code must not contain whitespace"));
    }
    Ok(())
}

/// Starter chart of accounts, modelled on the Peruvian general chart (PCGE)
///
/// Codes follow the PCGE class scheme: the first digit is the class, each
/// further digit one level deeper.
pub struct StandardChart;

impl StandardChart {
    /// Creates the standard accounts, summary levels included
    pub fn create_standard_accounts() -> Vec<Account> {
        vec![
            // Class 1: current assets
            Account::new("10", "Cash and cash equivalents", AccountKind::Asset),
            Account::new("101", "Cash on hand", AccountKind::Asset),
            Account::new("1011", "Cash", AccountKind::Asset),
            Account::new("104", "Bank current accounts", AccountKind::Asset),
            Account::new("1041", "Operating current accounts", AccountKind::Asset),
            Account::new("12", "Trade receivables", AccountKind::Asset),
            Account::new("121", "Invoices receivable", AccountKind::Asset),
            Account::new("1212", "Invoices issued in portfolio", AccountKind::Asset),
            // Class 2: inventories
            Account::new("20", "Merchandise", AccountKind::Asset),
            Account::new("201", "Manufactured merchandise", AccountKind::Asset),
            Account::new("2011", "Merchandise on hand", AccountKind::Asset),
            // Class 3: non-current assets
            Account::new("33", "Property, plant and equipment", AccountKind::Asset),
            Account::new("335", "Furniture and fixtures", AccountKind::Asset),
            Account::new("3351", "Furniture", AccountKind::Asset),
            // Class 4: liabilities
            Account::new("40", "Taxes payable", AccountKind::Liability),
            Account::new("401", "Central government", AccountKind::Liability),
            Account::new("4011", "General sales tax (IGV)", AccountKind::Liability),
            Account::new("40111", "IGV - own account", AccountKind::Liability),
            Account::new("42", "Trade payables", AccountKind::Liability),
            Account::new("421", "Invoices payable", AccountKind::Liability),
            Account::new("4212", "Invoices received", AccountKind::Liability),
            // Class 5: equity
            Account::new("50", "Share capital", AccountKind::Equity),
            Account::new("501", "Paid-in capital", AccountKind::Equity),
            Account::new("5011", "Common shares", AccountKind::Equity),
            Account::new("59", "Retained earnings", AccountKind::Equity),
            Account::new("591", "Undistributed profits", AccountKind::Equity),
            Account::new("5911", "Accumulated profits", AccountKind::Equity),
            // Class 6: expenses by nature
            Account::new("60", "Purchases", AccountKind::Expense),
            Account::new("601", "Merchandise purchases", AccountKind::Expense),
            Account::new("6011", "Merchandise", AccountKind::Expense),
            Account::new("63", "Third-party services", AccountKind::Expense),
            Account::new("636", "Utilities", AccountKind::Expense),
            Account::new("6361", "Electricity", AccountKind::Expense),
            Account::new("69", "Cost of sales", AccountKind::Expense),
            Account::new("691", "Merchandise sold", AccountKind::Expense),
            Account::new("6911", "Cost of merchandise sold", AccountKind::Expense),
            // Class 7: income
            Account::new("70", "Sales", AccountKind::Income),
            Account::new("701", "Merchandise sales", AccountKind::Income),
            Account::new("7011", "Domestic merchandise sales", AccountKind::Income),
            // Class 8: intermediate balances
            Account::new("80", "Gross trading margin", AccountKind::IntermediateBalance),
            Account::new("801", "Trading margin", AccountKind::IntermediateBalance),
            // Class 9: costs by function
            Account::new("94", "Administrative expenses", AccountKind::Cost),
            Account::new("941", "Administration", AccountKind::Cost),
            // Class 0: memorandum accounts
            Account::new("01", "Goods and securities delivered", AccountKind::Memorandum),
            Account::new("011", "Goods on consignment", AccountKind::Memorandum),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_round_trips_through_str() {
        for kind in AccountKind::all() {
            assert_eq!(kind.as_str().parse::<AccountKind>().unwrap(), kind);
        }
        assert!("Activo".parse::<AccountKind>().is_err());
    }

    #[test]
    fn test_is_ancestor_of_requires_proper_prefix() {
        let cash = Account::new("10", "Cash", AccountKind::Asset);
        assert!(cash.is_ancestor_of("1011"));
        assert!(!cash.is_ancestor_of("10"));
        assert!(!cash.is_ancestor_of("20"));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut account = Account::new("1011", "Cash", AccountKind::Asset).with_description("Till");
        AccountPatch {
            name: Some("Petty cash".to_string()),
            ..Default::default()
        }
        .apply(&mut account);

        assert_eq!(account.name, "Petty cash");
        assert_eq!(account.kind, AccountKind::Asset);
        assert_eq!(account.description.as_deref(), Some("Till"));
    }

    #[test]
    fn test_patch_empty_description_clears_it() {
        let mut account = Account::new("1011", "Cash", AccountKind::Asset).with_description("Till");
        AccountPatch {
            description: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut account);
        assert!(account.description.is_none());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("1011").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("10 11").is_err());
    }

    #[test]
    fn test_standard_chart_codes_are_unique() {
        let accounts = StandardChart::create_standard_accounts();
        let mut codes: Vec<_> = accounts.iter().map(|a| a.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), accounts.len());
    }
}
