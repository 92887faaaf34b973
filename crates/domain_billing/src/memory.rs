//! In-memory billing store

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use core_kernel::{PortError, SubjectId};
use domain_ledger::{JournalEntry, LedgerStore};

use crate::bill::Bill;
use crate::store::BillingStore;
use crate::subject::BillingSubject;

/// Billing store sharing a ledger store for the entry half of each bill
pub struct InMemoryBillingStore {
    ledger: Arc<dyn LedgerStore>,
    subjects: RwLock<BTreeMap<SubjectId, BillingSubject>>,
    bills: Mutex<HashMap<SubjectId, Vec<Bill>>>,
}

impl InMemoryBillingStore {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            subjects: RwLock::new(BTreeMap::new()),
            bills: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BillingStore for InMemoryBillingStore {
    async fn save_subject(&self, subject: &BillingSubject) -> Result<(), PortError> {
        self.subjects
            .write()
            .await
            .insert(subject.id, subject.clone());
        Ok(())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Option<BillingSubject>, PortError> {
        Ok(self.subjects.read().await.get(&id).cloned())
    }

    async fn list_subjects(&self) -> Result<Vec<BillingSubject>, PortError> {
        Ok(self.subjects.read().await.values().cloned().collect())
    }

    async fn latest_bill(&self, subject_id: SubjectId) -> Result<Option<Bill>, PortError> {
        let bills = self.bills.lock().await;
        Ok(bills
            .get(&subject_id)
            .and_then(|b| b.iter().max_by_key(|bill| bill.period_end))
            .cloned())
    }

    async fn bills_for_subject(&self, subject_id: SubjectId) -> Result<Vec<Bill>, PortError> {
        let bills = self.bills.lock().await;
        let mut found = bills.get(&subject_id).cloned().unwrap_or_default();
        found.sort_by_key(|b| b.period_start);
        Ok(found)
    }

    async fn commit_bill(&self, entry: &JournalEntry, bill: &Bill) -> Result<(), PortError> {
        // Held across the ledger append so the uniqueness check and the
        // insert see the same state.
        let mut bills = self.bills.lock().await;
        let existing = bills.entry(bill.subject_id).or_default();
        if existing.iter().any(|b| b.period_start == bill.period_start) {
            return Err(PortError::conflict(format!(
                "subject {} already billed for period starting {}",
                bill.subject_id, bill.period_start
            )));
        }

        self.ledger.append_entry(entry).await?;
        existing.push(bill.clone());
        Ok(())
    }
}
