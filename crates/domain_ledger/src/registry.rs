//! Account registry
//!
//! Owns the chart of accounts: identity, classification and activation
//! state. Accounts are addressed by number.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::account::{Account, AccountType};
use crate::error::LedgerError;
use crate::store::LedgerStore;

/// Chart-of-accounts service over a [`LedgerStore`]
///
/// # Invariants
///
/// - Account numbers are unique
/// - Classification is fixed once any line references the account
/// - Referenced accounts are never deleted, only deactivated
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Registers a new active account
    ///
    /// # Errors
    ///
    /// - `InvalidAccount` if the number or name is blank
    /// - `DuplicateAccountNumber` if the number is taken
    #[instrument(skip(self, name))]
    pub async fn create_account(
        &self,
        number: &str,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Result<Account, LedgerError> {
        let account = Account::new(number, name, account_type);
        self.register(account).await
    }

    /// Registers a fully-built account record
    pub async fn register(&self, account: Account) -> Result<Account, LedgerError> {
        account.validate()?;
        self.store.insert_account(&account).await.map_err(|e| {
            if e.is_conflict() {
                LedgerError::DuplicateAccountNumber(account.number.clone())
            } else {
                LedgerError::Store(e)
            }
        })?;
        info!(number = %account.number, account_type = %account.account_type, "Account created");
        Ok(account)
    }

    /// Looks up an account by number
    pub async fn get_account(&self, number: &str) -> Result<Account, LedgerError> {
        self.store
            .find_account(number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()))
    }

    /// Disallows new postings to the account
    ///
    /// The account stays visible to balances and reports. Deactivating an
    /// inactive account is a no-op.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, number: &str) -> Result<Account, LedgerError> {
        self.set_active(number, false).await
    }

    /// Re-allows postings to a deactivated account
    #[instrument(skip(self))]
    pub async fn reactivate(&self, number: &str) -> Result<Account, LedgerError> {
        self.set_active(number, true).await
    }

    async fn set_active(&self, number: &str, active: bool) -> Result<Account, LedgerError> {
        let account = self.get_account(number).await?;
        if account.is_active == active {
            return Ok(account);
        }
        self.store.set_account_active(number, active).await?;
        info!(number, active, "Account activation changed");
        self.get_account(number).await
    }

    /// Changes the classification of an account with no ledger history
    ///
    /// # Errors
    ///
    /// `AccountInUse` once any posted line references the account
    #[instrument(skip(self))]
    pub async fn reclassify(
        &self,
        number: &str,
        account_type: AccountType,
    ) -> Result<Account, LedgerError> {
        let account = self.get_account(number).await?;
        if account.account_type == account_type {
            return Ok(account);
        }
        if self.store.is_account_referenced(number).await? {
            return Err(LedgerError::AccountInUse(number.to_string()));
        }
        // Same window as in `remove_account`; the store re-checks under its lock.
        self.store
            .reclassify_account(number, account_type)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    LedgerError::AccountInUse(number.to_string())
                } else {
                    LedgerError::Store(e)
                }
            })?;
        info!(number, account_type = %account_type, "Account reclassified");
        self.get_account(number).await
    }

    /// Hard-deletes an account with no ledger history
    ///
    /// # Errors
    ///
    /// `AccountInUse` once any posted line references the account
    #[instrument(skip(self))]
    pub async fn remove_account(&self, number: &str) -> Result<(), LedgerError> {
        self.get_account(number).await?;
        if self.store.is_account_referenced(number).await? {
            return Err(LedgerError::AccountInUse(number.to_string()));
        }
        // A posting may land between the check and the delete; the store
        // refuses to drop a referenced account.
        self.store.delete_account(number).await.map_err(|e| {
            if e.is_conflict() {
                LedgerError::AccountInUse(number.to_string())
            } else {
                LedgerError::Store(e)
            }
        })?;
        info!(number, "Account removed");
        Ok(())
    }

    /// Active accounts ordered by number
    pub async fn list_active(&self) -> Result<Vec<Account>, LedgerError> {
        let accounts = self.store.list_accounts().await?;
        Ok(accounts.into_iter().filter(|a| a.is_active).collect())
    }

    /// All accounts ordered by number
    pub async fn list_all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_accounts().await?)
    }

    /// Creates every account in `accounts` whose number is not yet taken
    ///
    /// Returns the number of accounts created.
    #[instrument(skip(self, accounts), fields(count = accounts.len()))]
    pub async fn seed_chart(&self, accounts: Vec<Account>) -> Result<usize, LedgerError> {
        let mut created = 0;
        for account in accounts {
            match self.register(account).await {
                Ok(_) => created += 1,
                Err(LedgerError::DuplicateAccountNumber(_)) => {}
                Err(e) => return Err(e),
            }
        }
        info!(created, "Chart of accounts seeded");
        Ok(created)
    }
}
