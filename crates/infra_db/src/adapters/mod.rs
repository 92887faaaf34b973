//! Port adapters
//!
//! PostgreSQL implementations of the domain storage ports. Each adapter
//! converts between domain values and repository rows and reports failures
//! as `PortError`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_ledger::{Ledger, LedgerStore};
//! use infra_db::adapters::PgLedgerStore;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(PgLedgerStore::new(pool));
//! let ledger = Ledger::new(store, Currency::USD);
//! ```

pub mod billing;
pub mod ledger;

pub use billing::PgBillingStore;
pub use ledger::PgLedgerStore;
