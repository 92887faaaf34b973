//! Account types for the chart of accounts
//!
//! This module defines the account structure for double-entry bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::AccountId;

use crate::error::LedgerError;

/// Side of a journal line, and the side an account's balance grows on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit (left) side
    Debit,
    /// Credit (right) side
    Credit,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Debit => "debit",
            Side::Credit => "credit",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Side::Debit),
            "credit" => Ok(Side::Credit),
            other => Err(LedgerError::InvalidAccount(format!("unknown side '{}'", other))),
        }
    }
}

/// Types of accounts in the chart of accounts
///
/// The set is closed; parsing any other tag fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// The side on which balances of this type naturally accumulate
    pub fn normal_side(&self) -> Side {
        match self {
            AccountType::Asset | AccountType::Expense => Side::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Side::Credit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asset" => Ok(AccountType::Asset),
            "liability" => Ok(AccountType::Liability),
            "equity" => Ok(AccountType::Equity),
            "revenue" => Ok(AccountType::Revenue),
            "expense" => Ok(AccountType::Expense),
            other => Err(LedgerError::InvalidAccount(format!(
                "unknown account type '{}'",
                other
            ))),
        }
    }
}

/// An account in the chart of accounts
///
/// Accounts are addressed by their human-assigned `number`; `id` is the
/// internal surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Account number (e.g., "1100")
    pub number: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Description
    pub description: Option<String>,
    /// Whether new postings are allowed
    pub is_active: bool,
    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new active account
    ///
    /// # Arguments
    ///
    /// * `number` - Account number
    /// * `name` - Account name
    /// * `account_type` - Type of account
    pub fn new(number: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            number: number.into(),
            name: name.into(),
            account_type,
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Side on which this account's balance is positive
    pub fn normal_side(&self) -> Side {
        self.account_type.normal_side()
    }

    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        if self.number.trim().is_empty() {
            return Err(LedgerError::InvalidAccount("account number is empty".into()));
        }
        if self.number.trim() != self.number {
            return Err(LedgerError::InvalidAccount(format!(
                "account number '{}' has surrounding whitespace",
                self.number
            )));
        }
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidAccount(format!(
                "account {} has no name",
                self.number
            )));
        }
        Ok(())
    }
}

/// Well-known account numbers in the standard estate chart
pub mod standard {
    pub const CASH: &str = "1000";
    pub const ACCOUNTS_RECEIVABLE: &str = "1100";
    pub const ESTATE_MANAGEMENT_FUND: &str = "2100";
    pub const RETAINED_SURPLUS: &str = "3000";
    pub const SERVICE_CHARGE_INCOME: &str = "4000";
    pub const MAINTENANCE_EXPENSE: &str = "5000";
}

/// Standard chart of accounts for an estate management ledger
pub struct EstateChartOfAccounts;

impl EstateChartOfAccounts {
    /// Creates the standard estate accounts
    pub fn create_standard_accounts() -> Vec<Account> {
        vec![
            Account::new(standard::CASH, "Cash", AccountType::Asset),
            Account::new(standard::ACCOUNTS_RECEIVABLE, "Accounts Receivable", AccountType::Asset)
                .with_description("Service charges billed to residents and not yet collected"),
            Account::new(
                standard::ESTATE_MANAGEMENT_FUND,
                "Estate Management Fund",
                AccountType::Liability,
            )
            .with_description("Service charges held on behalf of the estate"),
            Account::new(standard::RETAINED_SURPLUS, "Retained Surplus", AccountType::Equity),
            Account::new(
                standard::SERVICE_CHARGE_INCOME,
                "Service Charge Income",
                AccountType::Revenue,
            ),
            Account::new(
                standard::MAINTENANCE_EXPENSE,
                "Maintenance Expense",
                AccountType::Expense,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_side_follows_classification() {
        assert_eq!(AccountType::Asset.normal_side(), Side::Debit);
        assert_eq!(AccountType::Expense.normal_side(), Side::Debit);
        assert_eq!(AccountType::Liability.normal_side(), Side::Credit);
        assert_eq!(AccountType::Equity.normal_side(), Side::Credit);
        assert_eq!(AccountType::Revenue.normal_side(), Side::Credit);
    }

    #[test]
    fn test_account_type_rejects_unknown_tag() {
        assert_eq!("Asset".parse::<AccountType>().unwrap(), AccountType::Asset);
        assert!("contra-asset".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_account_type_serde_is_lowercase() {
        let json = serde_json::to_string(&AccountType::Liability).unwrap();
        assert_eq!(json, "\"liability\"");
        assert!(serde_json::from_str::<AccountType>("\"income\"").is_err());
    }

    #[test]
    fn test_account_validation() {
        assert!(Account::new("1000", "Cash", AccountType::Asset).validate().is_ok());
        assert!(Account::new("", "Cash", AccountType::Asset).validate().is_err());
        assert!(Account::new(" 1000", "Cash", AccountType::Asset).validate().is_err());
        assert!(Account::new("1000", "  ", AccountType::Asset).validate().is_err());
    }

    #[test]
    fn test_standard_chart_has_billing_accounts() {
        let accounts = EstateChartOfAccounts::create_standard_accounts();
        let ar = accounts
            .iter()
            .find(|a| a.number == standard::ACCOUNTS_RECEIVABLE)
            .unwrap();
        let fund = accounts
            .iter()
            .find(|a| a.number == standard::ESTATE_MANAGEMENT_FUND)
            .unwrap();
        assert_eq!(ar.account_type, AccountType::Asset);
        assert_eq!(fund.account_type, AccountType::Liability);
    }
}
