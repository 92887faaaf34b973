//! Billing Domain - Annual service-charge billing
//!
//! This crate provides:
//! - Billing subjects and their eligibility
//! - Service-charge bills linked to their journal entries
//! - The `BillingStore` port and an in-memory adapter
//! - The billing cycle generator
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingConfig, BillingCycleGenerator, InMemoryBillingStore};
//!
//! let ledger = Ledger::in_memory(Currency::USD);
//! let store = Arc::new(InMemoryBillingStore::new(ledger.store()));
//! let generator = BillingCycleGenerator::new(&ledger, store, BillingConfig::default());
//!
//! let summary = generator.generate_due_bills(as_of).await?;
//! println!("{}", summary.message);
//! ```

pub mod bill;
pub mod config;
pub mod error;
pub mod generator;
pub mod memory;
pub mod store;
pub mod subject;

pub use bill::{Bill, BillStatus};
pub use config::BillingConfig;
pub use error::BillingError;
pub use generator::{
    BillingCycleGenerator, BillingRunSummary, SubjectOutcome, SubjectStatus, BILL_REFERENCE,
    REASON_INACTIVE, REASON_MISSING_DATA,
};
pub use memory::InMemoryBillingStore;
pub use store::BillingStore;
pub use subject::{BillingSubject, Eligibility};
