//! Request and response bodies
//!
//! Field names are camelCase. Money crosses the boundary as a decimal number
//! in major units and is converted exactly to minor units; an amount with
//! more decimal places than the currency allows is rejected.

pub mod accounts;
pub mod billing;
pub mod journal;
pub mod reports;

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::error::ApiError;

/// Converts a request amount to `Money` in the ledger currency
pub fn to_money(amount: Decimal, currency: Currency) -> Result<Money, ApiError> {
    Ok(Money::from_decimal(amount, currency)?)
}
