//! Pre-built Test Fixtures
//!
//! Fixed dates, amounts and ledgers so that tests across crates agree on
//! the same scenario: subjects registered on 2023-01-01 with an annual
//! charge of 1,200.00 USD.

use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use core_kernel::{Currency, Money};
use domain_billing::{BillingConfig, BillingCycleGenerator, BillingStore, InMemoryBillingStore};
use domain_ledger::{EstateChartOfAccounts, Ledger, LedgerStore};

/// Registration date used by default subjects
pub static REGISTRATION_DATE: Lazy<NaiveDate> = Lazy::new(|| date(2023, 1, 1));

/// Shorthand for a calendar date
///
/// # Panics
///
/// Panics on an invalid date; only for use in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    /// The default annual service charge
    pub fn annual_charge() -> Money {
        Self::usd(120_000)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::from_minor(10_000, Currency::EUR)
    }
}

/// An in-memory USD ledger seeded with the standard estate chart
pub async fn ledger_with_standard_chart() -> Ledger {
    let ledger = Ledger::in_memory(Currency::USD);
    seed_standard_chart(&ledger).await;
    ledger
}

/// Seeds the standard chart into any ledger
pub async fn seed_standard_chart(ledger: &Ledger) {
    ledger
        .registry()
        .seed_chart(EstateChartOfAccounts::create_standard_accounts())
        .await
        .unwrap();
}

/// A ledger and billing generator sharing one store
pub struct BillingHarness {
    pub ledger: Ledger,
    pub store: Arc<dyn BillingStore>,
    pub generator: BillingCycleGenerator,
}

impl BillingHarness {
    /// A fully in-memory harness over the standard chart
    pub async fn in_memory(config: BillingConfig) -> Self {
        let ledger = ledger_with_standard_chart().await;
        let store: Arc<dyn BillingStore> = Arc::new(InMemoryBillingStore::new(ledger.store()));
        Self::assemble(ledger, store, config)
    }

    /// A harness over caller-supplied stores; the chart is seeded if missing
    pub async fn with_stores(
        ledger_store: Arc<dyn LedgerStore>,
        billing_store: Arc<dyn BillingStore>,
        config: BillingConfig,
    ) -> Self {
        let ledger = Ledger::new(ledger_store, Currency::USD);
        seed_standard_chart(&ledger).await;
        Self::assemble(ledger, billing_store, config)
    }

    fn assemble(ledger: Ledger, store: Arc<dyn BillingStore>, config: BillingConfig) -> Self {
        let generator = BillingCycleGenerator::new(&ledger, store.clone(), config);
        Self {
            ledger,
            store,
            generator,
        }
    }
}
