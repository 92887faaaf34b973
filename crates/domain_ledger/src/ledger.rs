//! Ledger facade
//!
//! Bundles the registry, poster, balance engine and reporter over one
//! store and one currency.

use std::sync::Arc;

use core_kernel::Currency;

use crate::balance::BalanceEngine;
use crate::memory::InMemoryLedgerStore;
use crate::poster::JournalPoster;
use crate::registry::AccountRegistry;
use crate::store::LedgerStore;
use crate::trial_balance::TrialBalanceReporter;

/// The ledger services sharing one store
///
/// # Example
///
/// ```rust,ignore
/// let ledger = Ledger::in_memory(Currency::USD);
/// ledger.registry().seed_chart(EstateChartOfAccounts::create_standard_accounts()).await?;
/// let report = ledger.reporter().trial_balance(as_of).await?;
/// ```
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    currency: Currency,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>, currency: Currency) -> Self {
        Self { store, currency }
    }

    /// A ledger over a fresh in-memory store
    pub fn in_memory(currency: Currency) -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()), currency)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn store(&self) -> Arc<dyn LedgerStore> {
        self.store.clone()
    }

    pub fn registry(&self) -> AccountRegistry {
        AccountRegistry::new(self.store.clone())
    }

    pub fn poster(&self) -> JournalPoster {
        JournalPoster::new(self.store.clone(), self.currency)
    }

    pub fn balances(&self) -> BalanceEngine {
        BalanceEngine::new(self.store.clone(), self.currency)
    }

    pub fn reporter(&self) -> TrialBalanceReporter {
        TrialBalanceReporter::new(self.store.clone(), self.currency)
    }
}
