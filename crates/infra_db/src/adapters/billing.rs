//! PostgreSQL billing adapter
//!
//! Implements `domain_billing::BillingStore`. `commit_bill` writes the bill
//! and its journal entry in one transaction; the `uq_bills_subject_period`
//! constraint turns a concurrent duplicate into `PortError::Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{BillId, JournalEntryId, Money, PortError, SubjectId};
use domain_billing::{Bill, BillStatus, BillingStore, BillingSubject};
use domain_ledger::JournalEntry;

use crate::adapters::ledger::{entry_to_rows, parse_currency};
use crate::repositories::billing::{BillRow, BillingRepository, SubjectRow};

/// PostgreSQL-backed [`BillingStore`]
#[derive(Debug, Clone)]
pub struct PgBillingStore {
    repository: BillingRepository,
}

impl PgBillingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool),
        }
    }
}

#[async_trait]
impl BillingStore for PgBillingStore {
    #[instrument(skip(self, subject), fields(subject_id = %subject.id))]
    async fn save_subject(&self, subject: &BillingSubject) -> Result<(), PortError> {
        self.repository.upsert_subject(&subject_to_row(subject)).await?;
        Ok(())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Option<BillingSubject>, PortError> {
        self.repository
            .find_subject(*id.as_uuid())
            .await?
            .map(row_to_subject)
            .transpose()
    }

    async fn list_subjects(&self) -> Result<Vec<BillingSubject>, PortError> {
        self.repository
            .list_subjects()
            .await?
            .into_iter()
            .map(row_to_subject)
            .collect()
    }

    async fn latest_bill(&self, subject_id: SubjectId) -> Result<Option<Bill>, PortError> {
        self.repository
            .latest_bill(*subject_id.as_uuid())
            .await?
            .map(row_to_bill)
            .transpose()
    }

    async fn bills_for_subject(&self, subject_id: SubjectId) -> Result<Vec<Bill>, PortError> {
        self.repository
            .bills_for_subject(*subject_id.as_uuid())
            .await?
            .into_iter()
            .map(row_to_bill)
            .collect()
    }

    #[instrument(skip(self, entry, bill), fields(bill_number = %bill.bill_number, entry_id = %entry.id))]
    async fn commit_bill(&self, entry: &JournalEntry, bill: &Bill) -> Result<(), PortError> {
        self.repository
            .create_bill_with_entry(&entry_to_rows(entry), &bill_to_row(bill))
            .await?;
        debug!("Bill committed");
        Ok(())
    }
}

fn subject_to_row(subject: &BillingSubject) -> SubjectRow {
    SubjectRow {
        subject_id: *subject.id.as_uuid(),
        name: subject.name.clone(),
        unit: subject.unit.clone(),
        is_active: subject.is_active,
        service_charge_minor: subject.service_charge.map(|m| m.minor()),
        service_charge_currency: subject.service_charge.map(|m| m.currency().code().to_string()),
        registration_start_date: subject.registration_start_date,
        created_at: subject.created_at,
    }
}

fn row_to_subject(row: SubjectRow) -> Result<BillingSubject, PortError> {
    let service_charge = match (row.service_charge_minor, row.service_charge_currency.as_deref()) {
        (Some(minor), Some(code)) => Some(Money::from_minor(minor, parse_currency(code)?)),
        (None, None) => None,
        _ => {
            return Err(PortError::transformation(format!(
                "subject {} has a service charge without a currency",
                row.subject_id
            )))
        }
    };

    Ok(BillingSubject {
        id: SubjectId::from_uuid(row.subject_id),
        name: row.name,
        unit: row.unit,
        is_active: row.is_active,
        service_charge,
        registration_start_date: row.registration_start_date,
        created_at: row.created_at,
    })
}

fn bill_to_row(bill: &Bill) -> BillRow {
    BillRow {
        bill_id: *bill.id.as_uuid(),
        bill_number: bill.bill_number.clone(),
        subject_id: *bill.subject_id.as_uuid(),
        period_start: bill.period_start,
        period_end: bill.period_end,
        amount_minor: bill.amount.minor(),
        currency: bill.amount.currency().code().to_string(),
        due_date: bill.due_date,
        status: bill.status.as_str().to_string(),
        journal_entry_id: *bill.journal_entry_id.as_uuid(),
        created_at: bill.created_at,
    }
}

fn row_to_bill(row: BillRow) -> Result<Bill, PortError> {
    let status: BillStatus = row.status.parse().map_err(PortError::transformation)?;

    Ok(Bill {
        id: BillId::from_uuid(row.bill_id),
        bill_number: row.bill_number,
        subject_id: SubjectId::from_uuid(row.subject_id),
        period_start: row.period_start,
        period_end: row.period_end,
        amount: Money::from_minor(row.amount_minor, parse_currency(&row.currency)?),
        due_date: row.due_date,
        status,
        journal_entry_id: JournalEntryId::from_uuid(row.journal_entry_id),
        created_at: row.created_at,
    })
}
