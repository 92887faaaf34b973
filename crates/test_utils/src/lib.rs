//! Test Utilities Crate
//!
//! Shared test infrastructure for the estate ledger workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, amounts and ready-made ledgers
//! - `builders`: Builders for subjects and accounts
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Assertion helpers for ledger and billing results
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
