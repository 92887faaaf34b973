//! Billing domain errors

use thiserror::Error;

use core_kernel::{ErrorKind, PortError, SubjectId, TemporalError};
use domain_ledger::LedgerError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// A configured billing account is absent, inactive or of the wrong type
    #[error("Missing required account {role} ({account_number}): {reason}")]
    MissingRequiredAccount {
        role: &'static str,
        account_number: String,
        reason: String,
    },

    /// Billing subject not found
    #[error("Billing subject not found: {0}")]
    SubjectNotFound(SubjectId),

    /// Another run billed the same period first
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Posting the bill's journal entry failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Period arithmetic left the supported date range
    #[error("Period error: {0}")]
    Period(#[from] TemporalError),

    /// Storage failure
    #[error("Billing store error: {0}")]
    Store(#[from] PortError),
}

impl BillingError {
    /// Returns the broad class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::MissingRequiredAccount { .. } => ErrorKind::Configuration,
            BillingError::SubjectNotFound(_) => ErrorKind::NotFound,
            BillingError::Conflict(_) => ErrorKind::Conflict,
            BillingError::Ledger(e) => e.kind(),
            BillingError::Period(_) => ErrorKind::Validation,
            BillingError::Store(e) if e.is_conflict() => ErrorKind::Conflict,
            BillingError::Store(_) => ErrorKind::Storage,
        }
    }
}
