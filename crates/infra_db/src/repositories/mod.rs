//! Repository implementations
//!
//! Repositories own the SQL and speak in row types. The adapters in
//! [`crate::adapters`] map rows to domain types and implement the ports.
//!
//! Queries are built at runtime with `sqlx::query`/`query_as`, so the crate
//! builds without a live database.

pub mod billing;
pub mod ledger;

pub use billing::{BillRow, BillingRepository, SubjectRow};
pub use ledger::{AccountRow, DatedLineRow, JournalEntryRow, JournalLineRow, LedgerRepository, NewJournalEntry};
