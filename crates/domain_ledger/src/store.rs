//! Storage port for the ledger
//!
//! Adapters: [`crate::memory::InMemoryLedgerStore`] here, and
//! `infra_db::PgLedgerStore` for PostgreSQL.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{JournalEntryId, PortError};

use crate::account::{Account, AccountType};
use crate::journal::{JournalEntry, PostedLine};

/// Persistence for accounts and the append-only journal
///
/// Implementations must write an entry and all its lines atomically, and
/// must never expose a partially written entry to readers.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Inserts an account; `Conflict` if the number is taken
    async fn insert_account(&self, account: &Account) -> Result<(), PortError>;

    /// Sets only the activation flag; `NotFound` if absent
    async fn set_account_active(&self, number: &str, active: bool) -> Result<(), PortError>;

    /// Changes the classification; `Conflict` if any line references the
    /// account, `NotFound` if absent
    ///
    /// The reference check and the write must be atomic with respect to
    /// `append_entry`.
    async fn reclassify_account(
        &self,
        number: &str,
        account_type: AccountType,
    ) -> Result<(), PortError>;

    /// Deletes an account; `Conflict` if any line references it
    async fn delete_account(&self, number: &str) -> Result<(), PortError>;

    async fn find_account(&self, number: &str) -> Result<Option<Account>, PortError>;

    /// All accounts ordered by number
    async fn list_accounts(&self) -> Result<Vec<Account>, PortError>;

    /// Returns true if any posted line references the account
    async fn is_account_referenced(&self, number: &str) -> Result<bool, PortError>;

    /// Appends a validated entry; `Conflict` if the id already exists
    async fn append_entry(&self, entry: &JournalEntry) -> Result<(), PortError>;

    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError>;

    /// Number of entries in the journal
    async fn entry_count(&self) -> Result<u64, PortError>;

    /// Every line on entries dated on or before `as_of`
    async fn lines_as_of(&self, as_of: NaiveDate) -> Result<Vec<PostedLine>, PortError>;

    /// Lines for one account on entries dated on or before `as_of`
    async fn account_lines_as_of(
        &self,
        number: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<PostedLine>, PortError>;
}
