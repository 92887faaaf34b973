//! Request handlers

pub mod accounts;
pub mod billing;
pub mod health;
pub mod journal;
pub mod reports;

use chrono::{NaiveDate, Utc};

/// The as-of date used when a request omits one
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
