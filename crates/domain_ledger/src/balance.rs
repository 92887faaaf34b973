//! Balances as of a date
//!
//! Balances are derived from the journal on every call; nothing is cached.
//! An entry counts towards `as_of` when its entry date is on or before it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{instrument, warn};

use core_kernel::{Currency, Money};

use crate::account::{Account, Side};
use crate::error::LedgerError;
use crate::journal::PostedLine;
use crate::store::LedgerStore;

/// An account together with its balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account: Account,
    /// Signed so that a positive value lies on the account's normal side
    pub balance: Money,
    /// True if at least one counted line touches the account
    pub referenced: bool,
}

/// Computes balances from the journal
#[derive(Clone)]
pub struct BalanceEngine {
    store: Arc<dyn LedgerStore>,
    currency: Currency,
}

impl BalanceEngine {
    pub fn new(store: Arc<dyn LedgerStore>, currency: Currency) -> Self {
        Self { store, currency }
    }

    /// Balance of one account as of `as_of`
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the number is not registered
    #[instrument(skip(self))]
    pub async fn balance_as_of(
        &self,
        account_number: &str,
        as_of: NaiveDate,
    ) -> Result<Money, LedgerError> {
        let account = self
            .store
            .find_account(account_number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()))?;

        let lines = self.store.account_lines_as_of(account_number, as_of).await?;
        let mut net = 0_i64;
        for line in &lines {
            net = accumulate(net, line)?;
        }
        self.signed(net, account.normal_side())
    }

    /// Balances of every registered account as of `as_of`, keyed by number
    ///
    /// Reads the journal once and groups lines by account.
    #[instrument(skip(self))]
    pub async fn all_balances_as_of(
        &self,
        as_of: NaiveDate,
    ) -> Result<BTreeMap<String, AccountBalance>, LedgerError> {
        let accounts = self.store.list_accounts().await?;
        let lines = self.store.lines_as_of(as_of).await?;

        let mut net: HashMap<&str, i64> = HashMap::new();
        for line in &lines {
            let slot = net.entry(line.account_number.as_str()).or_insert(0);
            *slot = accumulate(*slot, line)?;
        }

        let mut balances = BTreeMap::new();
        for account in accounts {
            let entry = net.remove(account.number.as_str());
            let balance = self.signed(entry.unwrap_or(0), account.normal_side())?;
            balances.insert(
                account.number.clone(),
                AccountBalance {
                    account,
                    balance,
                    referenced: entry.is_some(),
                },
            );
        }

        for orphan in net.keys() {
            warn!(account_number = %orphan, "Lines reference an unregistered account");
        }

        Ok(balances)
    }

    fn signed(&self, debit_minus_credit: i64, normal_side: Side) -> Result<Money, LedgerError> {
        let minor = match normal_side {
            Side::Debit => debit_minus_credit,
            Side::Credit => debit_minus_credit
                .checked_neg()
                .ok_or_else(|| overflow("balance"))?,
        };
        Ok(Money::from_minor(minor, self.currency))
    }
}

fn accumulate(net: i64, line: &PostedLine) -> Result<i64, LedgerError> {
    let amount = line.amount.minor();
    match line.side {
        Side::Debit => net.checked_add(amount),
        Side::Credit => net.checked_sub(amount),
    }
    .ok_or_else(|| overflow(&line.account_number))
}

fn overflow(what: &str) -> LedgerError {
    LedgerError::BalanceOverflow(what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::journal::JournalDraft;
    use crate::memory::InMemoryLedgerStore;
    use crate::poster::JournalPoster;
    use crate::registry::AccountRegistry;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (JournalPoster, BalanceEngine) {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
        let registry = AccountRegistry::new(store.clone());
        for (number, name, kind) in [
            ("1000", "Cash", AccountType::Asset),
            ("2100", "Fund", AccountType::Liability),
            ("5000", "Maintenance", AccountType::Expense),
        ] {
            registry.create_account(number, name, kind).await.unwrap();
        }
        (
            JournalPoster::new(store.clone(), Currency::USD),
            BalanceEngine::new(store, Currency::USD),
        )
    }

    #[tokio::test]
    async fn test_sign_follows_normal_side() {
        let (poster, balances) = setup().await;
        poster
            .post(
                JournalDraft::new(date(2024, 1, 10), "Contribution")
                    .debit("1000", usd(10_000))
                    .credit("2100", usd(10_000)),
            )
            .await
            .unwrap();

        let as_of = date(2024, 12, 31);
        assert_eq!(balances.balance_as_of("1000", as_of).await.unwrap(), usd(10_000));
        assert_eq!(balances.balance_as_of("2100", as_of).await.unwrap(), usd(10_000));
    }

    #[tokio::test]
    async fn test_as_of_is_inclusive_of_entry_date() {
        let (poster, balances) = setup().await;
        poster
            .post(
                JournalDraft::new(date(2024, 6, 1), "Repairs")
                    .debit("5000", usd(300))
                    .credit("1000", usd(300)),
            )
            .await
            .unwrap();

        assert_eq!(balances.balance_as_of("5000", date(2024, 5, 31)).await.unwrap(), usd(0));
        assert_eq!(balances.balance_as_of("5000", date(2024, 6, 1)).await.unwrap(), usd(300));
        assert_eq!(balances.balance_as_of("1000", date(2024, 6, 1)).await.unwrap(), usd(-300));
    }

    #[tokio::test]
    async fn test_all_balances_includes_untouched_accounts() {
        let (poster, balances) = setup().await;
        poster
            .post(
                JournalDraft::new(date(2024, 1, 1), "Contribution")
                    .debit("1000", usd(50))
                    .credit("2100", usd(50)),
            )
            .await
            .unwrap();

        let all = balances.all_balances_as_of(date(2024, 1, 1)).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all["1000"].referenced);
        assert!(!all["5000"].referenced);
        assert!(all["5000"].balance.is_zero());
        assert_eq!(all.keys().cloned().collect::<Vec<_>>(), vec!["1000", "2100", "5000"]);
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let (_, balances) = setup().await;
        assert!(matches!(
            balances.balance_as_of("7777", date(2024, 1, 1)).await,
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}
