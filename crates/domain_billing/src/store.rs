//! Storage port for billing subjects and bills

use async_trait::async_trait;

use core_kernel::{PortError, SubjectId};
use domain_ledger::JournalEntry;

use crate::bill::Bill;
use crate::subject::BillingSubject;

/// Persistence for subjects and bills
///
/// `commit_bill` writes a bill together with its journal entry: either both
/// become visible or neither does.
#[async_trait]
pub trait BillingStore: Send + Sync + 'static {
    /// Inserts or replaces a subject
    async fn save_subject(&self, subject: &BillingSubject) -> Result<(), PortError>;

    async fn get_subject(&self, id: SubjectId) -> Result<Option<BillingSubject>, PortError>;

    /// All subjects in a stable order
    async fn list_subjects(&self) -> Result<Vec<BillingSubject>, PortError>;

    /// The bill with the latest period for a subject
    async fn latest_bill(&self, subject_id: SubjectId) -> Result<Option<Bill>, PortError>;

    /// A subject's bills ordered by period start
    async fn bills_for_subject(&self, subject_id: SubjectId) -> Result<Vec<Bill>, PortError>;

    /// Atomically appends `entry` to the ledger and stores `bill`
    ///
    /// Returns `Conflict` if the subject already has a bill starting on the
    /// same date.
    async fn commit_bill(&self, entry: &JournalEntry, bill: &Bill) -> Result<(), PortError>;
}
