//! Account catalog
//!
//! An immutable snapshot of one owner's chart of accounts. The leaf/summary
//! distinction is computed from the codes in the snapshot, never stored, so
//! adding `"1011"` under an existing `"101"` immediately turns `"101"` into a
//! summary account.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::account::Account;

/// Returns true if no other account's code extends `account.code` as a prefix
///
/// `all_accounts` may or may not contain `account` itself. An account whose
/// code is the empty string is never a leaf while any other account exists.
pub fn is_leaf(account: &Account, all_accounts: &[Account]) -> bool {
    !all_accounts.iter().any(|other| account.is_ancestor_of(&other.code))
}

/// An account together with its derived hierarchy attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    pub is_leaf: bool,
    pub level: usize,
    pub parent_code: Option<String>,
}

/// Snapshot of a chart of accounts ordered by code
#[derive(Debug, Clone, Default)]
pub struct AccountCatalog {
    accounts: BTreeMap<String, Account>,
}

impl AccountCatalog {
    /// Builds a catalog; when a code appears twice the first account wins
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let mut map = BTreeMap::new();
        for account in accounts {
            map.entry(account.code.clone()).or_insert(account);
        }
        Self { accounts: map }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.accounts.contains_key(code)
    }

    /// Display name of an account, if the code exists
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.get(code).map(|a| a.name.as_str())
    }

    /// Accounts in code order
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Every account whose code strictly extends `code`
    ///
    /// Codes sharing a prefix are contiguous in lexicographic order and sort
    /// after the prefix itself, so this is a single range scan.
    pub fn descendants<'s, 'c>(&'s self, code: &'c str) -> impl Iterator<Item = &'s Account> + 'c
    where
        's: 'c,
    {
        self.accounts
            .range::<str, _>((Bound::Excluded(code), Bound::Unbounded))
            .map(|(_, account)| account)
            .take_while(move |account| account.code.starts_with(code))
    }

    /// Returns true if no account in the catalog extends `code`
    pub fn is_leaf(&self, code: &str) -> bool {
        self.descendants(code).next().is_none()
    }

    /// The nearest existing account whose code is a proper prefix of `code`
    pub fn parent(&self, code: &str) -> Option<&Account> {
        proper_prefixes(code).rev().find_map(|prefix| self.get(prefix))
    }

    /// Depth in the hierarchy: 1 for top-level accounts
    pub fn level(&self, code: &str) -> usize {
        proper_prefixes(code).filter(|prefix| self.contains(prefix)).count() + 1
    }

    /// Accounts whose nearest existing ancestor is `code`
    pub fn children<'a>(&'a self, code: &str) -> Vec<&'a Account> {
        self.descendants(code)
            .filter(|account| {
                self.parent(&account.code)
                    .is_some_and(|parent| parent.code == code)
            })
            .collect()
    }

    /// Case-insensitive substring match on code or name
    pub fn search(&self, term: &str) -> Vec<&Account> {
        let term = term.trim();
        if term.is_empty() {
            return self.iter().collect();
        }
        let needle = term.to_lowercase();
        self.iter()
            .filter(|account| {
                account.code.to_lowercase().contains(&needle)
                    || account.name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Active leaf accounts, the ones offered for new journal lines
    pub fn postable_accounts(&self) -> Vec<&Account> {
        self.iter()
            .filter(|account| account.active && self.is_leaf(&account.code))
            .collect()
    }

    /// Attaches derived hierarchy attributes to an account
    pub fn view(&self, account: &Account) -> AccountView {
        AccountView {
            account: account.clone(),
            is_leaf: self.is_leaf(&account.code),
            level: self.level(&account.code),
            parent_code: self.parent(&account.code).map(|p| p.code.clone()),
        }
    }

    pub fn views(&self) -> Vec<AccountView> {
        self.iter().map(|account| self.view(account)).collect()
    }
}

impl FromIterator<Account> for AccountCatalog {
    fn from_iter<T: IntoIterator<Item = Account>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Proper, non-empty prefixes of `code`, shortest first
fn proper_prefixes(code: &str) -> impl DoubleEndedIterator<Item = &str> {
    code.char_indices()
        .map(|(idx, _)| idx)
        .filter(|idx| *idx > 0)
        .map(move |idx| &code[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;

    fn catalog() -> AccountCatalog {
        AccountCatalog::new(vec![
            Account::new("10", "Cash and equivalents", AccountKind::Asset),
            Account::new("101", "Cash on hand", AccountKind::Asset),
            Account::new("1011", "Cash", AccountKind::Asset),
            Account::new("1041", "Bank", AccountKind::Asset),
            Account::new("70", "Sales", AccountKind::Income),
            Account::new("7011", "Domestic sales", AccountKind::Income).inactive(),
        ])
    }

    #[test]
    fn test_leaf_detection() {
        let catalog = catalog();
        assert!(!catalog.is_leaf("10"));
        assert!(!catalog.is_leaf("101"));
        assert!(catalog.is_leaf("1011"));
        assert!(catalog.is_leaf("1041"));
    }

    #[test]
    fn test_free_function_matches_catalog() {
        let accounts: Vec<_> = catalog().iter().cloned().collect();
        for account in &accounts {
            assert_eq!(is_leaf(account, &accounts), catalog().is_leaf(&account.code));
        }
    }

    #[test]
    fn test_parent_skips_missing_levels() {
        let catalog = catalog();
        assert_eq!(catalog.parent("1011").map(|a| a.code.as_str()), Some("101"));
        assert_eq!(catalog.parent("1041").map(|a| a.code.as_str()), Some("10"));
        assert!(catalog.parent("10").is_none());
    }

    #[test]
    fn test_level_counts_existing_ancestors() {
        let catalog = catalog();
        assert_eq!(catalog.level("10"), 1);
        assert_eq!(catalog.level("101"), 2);
        assert_eq!(catalog.level("1011"), 3);
        assert_eq!(catalog.level("1041"), 2);
    }

    #[test]
    fn test_children_are_direct_only() {
        let catalog = catalog();
        let children: Vec<_> = catalog.children("10").iter().map(|a| a.code.as_str()).collect();
        assert_eq!(children, vec!["101", "1041"]);
    }

    #[test]
    fn test_search_by_code_and_name() {
        let catalog = catalog();
        assert_eq!(catalog.search("10").len(), 4);
        assert_eq!(catalog.search("SALES").len(), 2);
        assert_eq!(catalog.search("").len(), catalog.len());
    }

    #[test]
    fn test_postable_excludes_summaries_and_inactive() {
        let catalog = catalog();
        let codes: Vec<_> = catalog
            .postable_accounts()
            .iter()
            .map(|a| a.code.as_str())
            .collect();
        assert_eq!(codes, vec!["1011", "1041"]);
    }
}
