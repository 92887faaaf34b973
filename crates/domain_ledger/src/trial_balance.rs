//! Trial balance reporting

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument, warn};

use core_kernel::{AccountId, Currency, Money};

use crate::account::{AccountType, Side};
use crate::balance::{AccountBalance, BalanceEngine};
use crate::error::LedgerError;
use crate::store::LedgerStore;

/// Trial balance report
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    /// Cutoff date
    pub as_of: NaiveDate,
    /// One row per reported account, ordered by number
    pub rows: Vec<TrialBalanceRow>,
    /// Total debits
    pub total_debits: Money,
    /// Total credits
    pub total_credits: Money,
    /// Whether the trial balance is balanced
    pub balanced: bool,
}

/// A single row in the trial balance
///
/// At most one of `debit` and `credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    pub account_id: AccountId,
    pub account_number: String,
    pub account_name: String,
    pub account_type: AccountType,
    /// Debit balance
    pub debit: Money,
    /// Credit balance
    pub credit: Money,
}

impl TrialBalanceRow {
    /// Places a signed balance in its column
    ///
    /// A balance below zero has crossed to the side opposite its account's
    /// normal side and is shown there.
    fn from_balance(entry: &AccountBalance) -> Result<Self, LedgerError> {
        let currency = entry.balance.currency();
        let side = if entry.balance.is_negative() {
            entry.account.normal_side().opposite()
        } else {
            entry.account.normal_side()
        };
        let amount = entry
            .balance
            .checked_abs()
            .map_err(|_| LedgerError::BalanceOverflow(entry.account.number.clone()))?;
        let (debit, credit) = match side {
            Side::Debit => (amount, Money::zero(currency)),
            Side::Credit => (Money::zero(currency), amount),
        };

        Ok(Self {
            account_id: entry.account.id,
            account_number: entry.account.number.clone(),
            account_name: entry.account.name.clone(),
            account_type: entry.account.account_type,
            debit,
            credit,
        })
    }
}

/// Builds trial balances from [`BalanceEngine`] snapshots
#[derive(Clone)]
pub struct TrialBalanceReporter {
    balances: BalanceEngine,
    currency: Currency,
}

impl TrialBalanceReporter {
    pub fn new(store: Arc<dyn LedgerStore>, currency: Currency) -> Self {
        Self {
            balances: BalanceEngine::new(store, currency),
            currency,
        }
    }

    /// Generates a trial balance as of a date
    ///
    /// Lists every active account and every account with ledger history,
    /// whether or not it is still active. An empty ledger yields a balanced
    /// all-zero report.
    #[instrument(skip(self))]
    pub async fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalance, LedgerError> {
        let snapshot = self.balances.all_balances_as_of(as_of).await?;

        let rows: Vec<TrialBalanceRow> = snapshot
            .values()
            .filter(|b| b.account.is_active || b.referenced)
            .map(TrialBalanceRow::from_balance)
            .collect::<Result<_, _>>()?;

        let total_debits = Money::checked_sum(self.currency, rows.iter().map(|r| &r.debit))
            .map_err(|_| LedgerError::BalanceOverflow("total debits".into()))?;
        let total_credits = Money::checked_sum(self.currency, rows.iter().map(|r| &r.credit))
            .map_err(|_| LedgerError::BalanceOverflow("total credits".into()))?;
        let balanced = total_debits == total_credits;

        if balanced {
            info!(rows = rows.len(), total = %total_debits, "Trial balance generated");
        } else {
            warn!(
                debits = %total_debits,
                credits = %total_credits,
                "Trial balance does not balance"
            );
        }

        Ok(TrialBalance {
            as_of,
            rows,
            total_debits,
            total_credits,
            balanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
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

    #[test]
    fn test_negative_balance_moves_to_opposite_column() {
        let entry = AccountBalance {
            account: Account::new("1000", "Cash", AccountType::Asset),
            balance: usd(-250),
            referenced: true,
        };
        let row = TrialBalanceRow::from_balance(&entry).unwrap();
        assert!(row.debit.is_zero());
        assert_eq!(row.credit, usd(250));
    }

    #[test]
    fn test_minimum_balance_reports_overflow() {
        let entry = AccountBalance {
            account: Account::new("1000", "Cash", AccountType::Asset),
            balance: usd(i64::MIN),
            referenced: true,
        };
        let result = TrialBalanceRow::from_balance(&entry);
        assert!(matches!(result, Err(LedgerError::BalanceOverflow(n)) if n == "1000"));
    }

    #[tokio::test]
    async fn test_empty_ledger_is_balanced() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let reporter = TrialBalanceReporter::new(store, Currency::USD);

        let report = reporter.trial_balance(date(2024, 1, 1)).await.unwrap();
        assert!(report.rows.is_empty());
        assert!(report.balanced);
        assert!(report.total_debits.is_zero());
    }

    #[tokio::test]
    async fn test_inactive_accounts_with_history_stay_visible() {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
        let registry = AccountRegistry::new(store.clone());
        let poster = JournalPoster::new(store.clone(), Currency::USD);
        let reporter = TrialBalanceReporter::new(store, Currency::USD);

        registry.create_account("1000", "Cash", AccountType::Asset).await.unwrap();
        registry.create_account("1900", "Old Float", AccountType::Asset).await.unwrap();
        registry.create_account("1950", "Unused", AccountType::Asset).await.unwrap();
        registry.create_account("4000", "Income", AccountType::Revenue).await.unwrap();

        poster
            .post(
                JournalDraft::new(date(2024, 1, 5), "Dues")
                    .debit("1900", usd(800))
                    .credit("4000", usd(800)),
            )
            .await
            .unwrap();
        registry.deactivate("1900").await.unwrap();
        registry.deactivate("1950").await.unwrap();

        let report = reporter.trial_balance(date(2024, 12, 31)).await.unwrap();
        let numbers: Vec<&str> = report.rows.iter().map(|r| r.account_number.as_str()).collect();

        assert_eq!(numbers, vec!["1000", "1900", "4000"]);
        assert!(report.balanced);
        assert_eq!(report.total_debits, usd(800));
        assert_eq!(report.total_credits, usd(800));
    }
}
