//! Billing DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_billing::{Bill, BillStatus, BillingRunSummary, BillingSubject, SubjectOutcome, SubjectStatus};

use crate::dto::to_money;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRunResponse {
    pub as_of: NaiveDate,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_bills: usize,
    pub message: String,
    pub details: Vec<SubjectOutcomeDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_started: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectOutcomeDto {
    pub subject_id: Uuid,
    pub status: SubjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub bills_generated: usize,
}

impl From<SubjectOutcome> for SubjectOutcomeDto {
    fn from(outcome: SubjectOutcome) -> Self {
        Self {
            subject_id: *outcome.subject_id.as_uuid(),
            status: outcome.status,
            reason: outcome.reason,
            bills_generated: outcome.bills_generated,
        }
    }
}

impl From<BillingRunSummary> for BillingRunResponse {
    fn from(summary: BillingRunSummary) -> Self {
        Self {
            as_of: summary.as_of,
            success: summary.success,
            failed: summary.failed,
            skipped: summary.skipped,
            total_bills: summary.total_bills,
            message: summary.message,
            details: summary.details.into_iter().map(SubjectOutcomeDto::from).collect(),
            not_started: summary.not_started.iter().map(|id| *id.as_uuid()).collect(),
        }
    }
}

/// Body of `POST /billing/subjects` and `PUT /billing/subjects/:id`
///
/// A PUT replaces every field, so omitted optional fields are cleared.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: String,
    pub unit: Option<String>,
    /// Annual charge in major units of the ledger currency
    pub service_charge: Option<Decimal>,
    pub registration_start_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SubjectRequest {
    /// Builds a new subject with a fresh id
    pub fn into_subject(self, currency: Currency) -> Result<BillingSubject, ApiError> {
        let subject = BillingSubject::new(self.name.clone());
        self.apply_to(subject, currency)
    }

    /// Overwrites the editable fields of an existing subject
    ///
    /// The id and creation time are kept, so the subject's bills stay linked.
    pub fn apply_to(
        self,
        mut subject: BillingSubject,
        currency: Currency,
    ) -> Result<BillingSubject, ApiError> {
        subject.name = self.name;
        subject.unit = self.unit;
        subject.is_active = self.is_active;
        subject.service_charge = self
            .service_charge
            .map(|amount| to_money(amount, currency))
            .transpose()?;
        subject.registration_start_date = self.registration_start_date;
        Ok(subject)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub is_active: bool,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub service_charge: Option<Decimal>,
    pub registration_start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<BillingSubject> for SubjectResponse {
    fn from(subject: BillingSubject) -> Self {
        Self {
            id: *subject.id.as_uuid(),
            name: subject.name,
            unit: subject.unit,
            is_active: subject.is_active,
            service_charge: subject.service_charge.map(|m| m.to_decimal()),
            registration_start_date: subject.registration_start_date,
            created_at: subject.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub id: Uuid,
    pub bill_number: String,
    pub subject_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    /// Status as of today; pending bills past due read as overdue
    pub status: BillStatus,
    pub journal_entry_id: Uuid,
}

impl BillResponse {
    pub fn new(bill: Bill, today: NaiveDate) -> Self {
        Self {
            id: *bill.id.as_uuid(),
            status: bill.effective_status(today),
            bill_number: bill.bill_number,
            subject_id: *bill.subject_id.as_uuid(),
            period_start: bill.period_start,
            period_end: bill.period_end,
            amount: bill.amount.to_decimal(),
            currency: bill.amount.currency().code().to_string(),
            due_date: bill.due_date,
            journal_entry_id: *bill.journal_entry_id.as_uuid(),
        }
    }
}
