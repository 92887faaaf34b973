//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the estate ledger, built on SQLx.
//!
//! # Architecture
//!
//! - [`repositories`] hold the SQL and work in row types
//! - [`adapters`] implement `LedgerStore` and `BillingStore` on top of them
//! - [`pool`] opens the connection pool and applies the embedded migrations
//!
//! Journal entries are append-only. A bill and its journal entry are always
//! written in the same transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgLedgerStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/estate_ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PgLedgerStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PgBillingStore, PgLedgerStore};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
