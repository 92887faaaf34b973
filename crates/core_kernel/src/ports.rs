//! Ports and Adapters Infrastructure
//!
//! Storage for each domain sits behind an async port trait defined in the
//! domain crate. Adapters (in-memory, PostgreSQL) implement those traits and
//! report failures through the shared [`PortError`] type defined here.
//!
//! ```text
//!   domain_ledger::LedgerStore      domain_billing::BillingStore
//!            ▲        ▲                  ▲          ▲
//!            │        │                  │          │
//!     InMemoryLedger  PgLedgerStore   InMemory…   PgBillingStore
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// All adapters map their native failures onto these variants so domain
/// services can react uniformly (e.g. treat `Conflict` as a lost race).
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A uniqueness rule was violated (duplicate key, period already billed)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stored data could not be mapped back to a domain value
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Account", "1100");
        assert!(error.is_not_found());
        assert!(!error.is_conflict());
        assert!(error.to_string().contains("Account"));
        assert!(error.to_string().contains("1100"));
    }

    #[test]
    fn test_conflict() {
        let error = PortError::conflict("period already billed");
        assert!(error.is_conflict());
        assert!(!error.is_not_found());
    }
}
