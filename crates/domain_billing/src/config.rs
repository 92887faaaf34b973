//! Billing run configuration

use serde::{Deserialize, Serialize};

use domain_ledger::standard;

/// Default days between period end and payment due date
pub const DEFAULT_GRACE_DAYS: u32 = 30;

/// Default number of subjects billed at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Accounts and limits for the billing cycle generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Asset account debited for each bill
    pub receivable_account: String,
    /// Liability account credited for each bill
    pub fund_account: String,
    /// Days after period end until payment is due
    pub grace_days: u32,
    /// Maximum subjects processed concurrently
    pub concurrency: usize,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            receivable_account: standard::ACCOUNTS_RECEIVABLE.to_string(),
            fund_account: standard::ESTATE_MANAGEMENT_FUND.to_string(),
            grace_days: DEFAULT_GRACE_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl BillingConfig {
    pub fn with_accounts(
        mut self,
        receivable_account: impl Into<String>,
        fund_account: impl Into<String>,
    ) -> Self {
        self.receivable_account = receivable_account.into();
        self.fund_account = fund_account.into();
        self
    }

    pub fn with_grace_days(mut self, days: u32) -> Self {
        self.grace_days = days;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}
