//! Ledger domain errors

use thiserror::Error;

use core_kernel::{ErrorKind, JournalEntryId, Money, PortError};

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An account with this number is already registered
    #[error("Duplicate account number: {0}")]
    DuplicateAccountNumber(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// The account has ledger history and cannot be changed this way
    #[error("Account in use: {0}")]
    AccountInUse(String),

    /// Account fields failed validation
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// An entry needs a debit side and a credit side
    #[error("Journal entry needs at least two lines, got {count}")]
    InsufficientLines { count: usize },

    /// A line references an account that is not registered
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// A line references a deactivated account
    #[error("Account is inactive: {0}")]
    InactiveAccount(String),

    /// A line does not carry exactly one positive amount
    #[error("Invalid line {index}: {reason}")]
    InvalidLine { index: usize, reason: String },

    /// Debits and credits differ
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    UnbalancedEntry { debits: Money, credits: Money },

    /// A running balance left the `i64` range
    #[error("Balance overflow for account {0}")]
    BalanceOverflow(String),

    /// Storage failure
    #[error("Ledger store error: {0}")]
    Store(#[from] PortError),
}

impl LedgerError {
    /// Returns the broad class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound(_) | LedgerError::EntryNotFound(_) => ErrorKind::NotFound,
            LedgerError::DuplicateAccountNumber(_) | LedgerError::AccountInUse(_) => {
                ErrorKind::Conflict
            }
            LedgerError::InvalidAccount(_)
            | LedgerError::InsufficientLines { .. }
            | LedgerError::UnknownAccount(_)
            | LedgerError::InactiveAccount(_)
            | LedgerError::InvalidLine { .. }
            | LedgerError::UnbalancedEntry { .. } => ErrorKind::Validation,
            LedgerError::BalanceOverflow(_) => ErrorKind::Storage,
            LedgerError::Store(e) if e.is_conflict() => ErrorKind::Conflict,
            LedgerError::Store(e) if e.is_not_found() => ErrorKind::NotFound,
            LedgerError::Store(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid_line(index: usize, reason: impl Into<String>) -> Self {
        LedgerError::InvalidLine {
            index,
            reason: reason.into(),
        }
    }
}
