//! Ledger Domain - Double-entry bookkeeping for estate service charges
//!
//! This crate provides:
//! - Chart of accounts with debit/credit-normal classification
//! - Journal posting with all-or-nothing validation
//! - Balances as of any accounting date
//! - Trial balance reporting
//! - The `LedgerStore` port and an in-memory adapter

pub mod account;
pub mod balance;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod memory;
pub mod poster;
pub mod registry;
pub mod store;
pub mod trial_balance;

pub use account::{standard, Account, AccountType, EstateChartOfAccounts, Side};
pub use balance::{AccountBalance, BalanceEngine};
pub use error::LedgerError;
pub use journal::{EntryReference, JournalDraft, JournalEntry, JournalLine, NewJournalLine, PostedLine};
pub use ledger::Ledger;
pub use memory::InMemoryLedgerStore;
pub use poster::{validate_lines, JournalPoster, REVERSAL_REFERENCE};
pub use registry::AccountRegistry;
pub use store::LedgerStore;
pub use trial_balance::{TrialBalance, TrialBalanceReporter, TrialBalanceRow};
