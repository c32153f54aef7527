//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the ledger. The small chart below is
//! enough to exercise every validation rule: it has summary accounts at two
//! levels, several postable leaves and one inactive leaf.

use chrono::NaiveDate;
use core_kernel::{DateRange, OwnerId};
use domain_ledger::{Account, AccountCatalog, AccountKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for chart of accounts test data
pub struct AccountFixtures;

impl AccountFixtures {
    /// Cash on hand, a postable leaf
    pub const CASH: &'static str = "1011";
    /// Bank current account, a postable leaf
    pub const BANK: &'static str = "1041";
    /// Trade receivables, a postable leaf
    pub const RECEIVABLES: &'static str = "1212";
    /// IGV payable, a postable leaf
    pub const IGV: &'static str = "40111";
    /// Trade payables, a postable leaf
    pub const PAYABLES: &'static str = "4212";
    /// Merchandise purchases, a postable leaf
    pub const PURCHASES: &'static str = "6011";
    /// Domestic sales, a postable leaf
    pub const SALES: &'static str = "7011";
    /// Closed-down account, a leaf but inactive
    pub const INACTIVE: &'static str = "6019";
    /// Summary account with sub-accounts
    pub const CASH_SUMMARY: &'static str = "10";

    /// A small chart of accounts with summary levels
    pub fn small_chart() -> Vec<Account> {
        vec![
            Account::new("10", "Cash and cash equivalents", AccountKind::Asset),
            Account::new("101", "Cash on hand", AccountKind::Asset),
            Account::new(Self::CASH, "Cash", AccountKind::Asset),
            Account::new(Self::BANK, "Operating current accounts", AccountKind::Asset),
            Account::new("12", "Trade receivables", AccountKind::Asset),
            Account::new(Self::RECEIVABLES, "Invoices issued", AccountKind::Asset),
            Account::new("40", "Taxes payable", AccountKind::Liability),
            Account::new(Self::IGV, "IGV - own account", AccountKind::Liability),
            Account::new("42", "Trade payables", AccountKind::Liability),
            Account::new(Self::PAYABLES, "Invoices received", AccountKind::Liability),
            Account::new("60", "Purchases", AccountKind::Expense),
            Account::new(Self::PURCHASES, "Merchandise", AccountKind::Expense),
            Account::new(Self::INACTIVE, "Discontinued purchases", AccountKind::Expense).inactive(),
            Account::new("70", "Sales", AccountKind::Income),
            Account::new(Self::SALES, "Domestic merchandise sales", AccountKind::Income),
        ]
    }

    pub fn small_catalog() -> AccountCatalog {
        AccountCatalog::new(Self::small_chart())
    }

    /// Codes of the active postable accounts in [`Self::small_chart`]
    pub fn postable_codes() -> Vec<&'static str> {
        vec![
            Self::CASH,
            Self::BANK,
            Self::RECEIVABLES,
            Self::IGV,
            Self::PAYABLES,
            Self::PURCHASES,
            Self::SALES,
        ]
    }
}

/// Fixture for temporal test data
pub struct DateFixtures;

impl DateFixtures {
    /// Jan 1, 2024
    pub fn year_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// A day in January 2024
    pub fn january(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    /// A day in February 2024
    pub fn february(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    pub fn january_period() -> DateRange {
        DateRange::month(2024, 1).unwrap()
    }

    pub fn february_period() -> DateRange {
        DateRange::month(2024, 2).unwrap()
    }

    pub fn year_2024() -> DateRange {
        DateRange::new(Self::year_start(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()).unwrap()
    }
}

/// Fixture for amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// Net sale before IGV
    pub fn sale_net() -> Decimal {
        dec!(100.00)
    }

    /// IGV on [`Self::sale_net`]
    pub fn sale_igv() -> Decimal {
        dec!(18.00)
    }

    /// Sale total including IGV
    pub fn sale_gross() -> Decimal {
        dec!(118.00)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic owner ID for testing
    pub fn owner_id() -> OwnerId {
        OwnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// A second deterministic owner for isolation tests
    pub fn other_owner_id() -> OwnerId {
        OwnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postable_codes_match_catalog() {
        let catalog = AccountFixtures::small_catalog();
        let postable: Vec<_> = catalog
            .postable_accounts()
            .iter()
            .map(|a| a.code.clone())
            .collect();
        let mut expected: Vec<_> = AccountFixtures::postable_codes()
            .into_iter()
            .map(String::from)
            .collect();
        expected.sort();
        assert_eq!(postable, expected);
    }

    #[test]
    fn test_summary_fixture_is_not_leaf() {
        let catalog = AccountFixtures::small_catalog();
        assert!(!catalog.is_leaf(AccountFixtures::CASH_SUMMARY));
        assert!(catalog.is_leaf(AccountFixtures::INACTIVE));
    }
}
