//! In-memory ledger store
//!
//! Backs the unit tests and the `memory` storage mode of the server.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use core_kernel::{JournalEntryId, PortError};

use crate::account::{Account, AccountType};
use crate::journal::{JournalEntry, PostedLine};
use crate::store::LedgerStore;

#[derive(Default)]
struct State {
    accounts: BTreeMap<String, Account>,
    entries: Vec<JournalEntry>,
    entry_index: HashMap<JournalEntryId, usize>,
    referenced: HashSet<String>,
}

/// Ledger store holding everything behind one lock
///
/// An entry becomes visible to readers only once all its lines are in.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn flatten<'a>(entry: &'a JournalEntry) -> impl Iterator<Item = PostedLine> + 'a {
    entry.lines.iter().map(move |line| PostedLine {
        entry_id: entry.id,
        entry_date: entry.entry_date,
        account_number: line.account_number.clone(),
        side: line.side,
        amount: line.amount,
    })
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_account(&self, account: &Account) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&account.number) {
            return Err(PortError::conflict(format!(
                "account number {} already exists",
                account.number
            )));
        }
        state.accounts.insert(account.number.clone(), account.clone());
        Ok(())
    }

    async fn set_account_active(&self, number: &str, active: bool) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(number)
            .ok_or_else(|| PortError::not_found("Account", number))?;
        account.is_active = active;
        Ok(())
    }

    async fn reclassify_account(
        &self,
        number: &str,
        account_type: AccountType,
    ) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let referenced = state.referenced.contains(number);
        let account = state
            .accounts
            .get_mut(number)
            .ok_or_else(|| PortError::not_found("Account", number))?;
        if account.account_type == account_type {
            return Ok(());
        }
        if referenced {
            return Err(PortError::conflict(format!(
                "account {} is referenced by posted entries",
                number
            )));
        }
        account.account_type = account_type;
        Ok(())
    }

    async fn delete_account(&self, number: &str) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        if state.referenced.contains(number) {
            return Err(PortError::conflict(format!(
                "account {} is referenced by posted entries",
                number
            )));
        }
        state
            .accounts
            .remove(number)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Account", number))
    }

    async fn find_account(&self, number: &str) -> Result<Option<Account>, PortError> {
        Ok(self.state.read().await.accounts.get(number).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        Ok(self.state.read().await.accounts.values().cloned().collect())
    }

    async fn is_account_referenced(&self, number: &str) -> Result<bool, PortError> {
        Ok(self.state.read().await.referenced.contains(number))
    }

    async fn append_entry(&self, entry: &JournalEntry) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        if state.entry_index.contains_key(&entry.id) {
            return Err(PortError::conflict(format!("entry {} already exists", entry.id)));
        }
        if let Some(line) = entry
            .lines
            .iter()
            .find(|l| !state.accounts.contains_key(&l.account_number))
        {
            return Err(PortError::not_found("Account", &line.account_number));
        }

        for line in &entry.lines {
            state.referenced.insert(line.account_number.clone());
        }
        let position = state.entries.len();
        state.entries.push(entry.clone());
        state.entry_index.insert(entry.id, position);
        Ok(())
    }

    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .entry_index
            .get(&id)
            .and_then(|&i| state.entries.get(i))
            .cloned())
    }

    async fn entry_count(&self) -> Result<u64, PortError> {
        Ok(self.state.read().await.entries.len() as u64)
    }

    async fn lines_as_of(&self, as_of: NaiveDate) -> Result<Vec<PostedLine>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.entry_date <= as_of)
            .flat_map(flatten)
            .collect())
    }

    async fn account_lines_as_of(
        &self,
        number: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<PostedLine>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.entry_date <= as_of)
            .flat_map(flatten)
            .filter(|l| l.account_number == number)
            .collect())
    }
}
