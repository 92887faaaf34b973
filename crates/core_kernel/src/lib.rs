//! Core Kernel - Foundational types shared by the ledger and billing domains
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with exact minor-unit arithmetic
//! - Billing periods over calendar dates
//! - Strongly-typed identifiers
//! - The storage port error type

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{BillingPeriod, TemporalError, BILLING_CYCLE_MONTHS};
pub use identifiers::{AccountId, JournalEntryId, JournalLineId, SubjectId, BillId};
pub use ports::PortError;
pub use error::ErrorKind;
