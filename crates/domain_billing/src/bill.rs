//! Service-charge bills
//!
//! A bill is a projection of the journal entry that justifies it. It is
//! always created together with that entry and never without it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillId, BillingPeriod, JournalEntryId, Money, SubjectId};

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Issued and awaiting payment
    Pending,
    /// Fully paid
    Paid,
    /// Past due date
    Overdue,
    /// Cancelled/voided
    Cancelled,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Paid => "paid",
            BillStatus::Overdue => "overdue",
            BillStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "paid" => Ok(BillStatus::Paid),
            "overdue" => Ok(BillStatus::Overdue),
            "cancelled" => Ok(BillStatus::Cancelled),
            other => Err(format!("unknown bill status '{}'", other)),
        }
    }
}

/// A service-charge bill for one subject and one annual period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Bill number (human-readable)
    pub bill_number: String,
    /// Billed subject
    pub subject_id: SubjectId,
    /// First day covered
    pub period_start: NaiveDate,
    /// First day not covered
    pub period_end: NaiveDate,
    /// Amount billed
    pub amount: Money,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Status
    pub status: BillStatus,
    /// Entry that posted this bill to the ledger
    pub journal_entry_id: JournalEntryId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a pending bill
    ///
    /// # Arguments
    ///
    /// * `id` - Bill id, already used as the entry's reference
    /// * `subject_id` - Billed subject
    /// * `period` - Covered period
    /// * `amount` - Amount billed
    /// * `due_date` - Payment due date
    /// * `journal_entry_id` - The posted entry backing this bill
    pub fn new(
        id: BillId,
        subject_id: SubjectId,
        period: BillingPeriod,
        amount: Money,
        due_date: NaiveDate,
        journal_entry_id: JournalEntryId,
    ) -> Self {
        Self {
            id,
            bill_number: bill_number(subject_id, period.start()),
            subject_id,
            period_start: period.start(),
            period_end: period.end(),
            amount,
            due_date,
            status: BillStatus::Pending,
            journal_entry_id,
            created_at: Utc::now(),
        }
    }

    /// Status as seen on `today`
    ///
    /// Stored status is not rewritten when the due date passes; a pending
    /// bill past its due date reads as overdue.
    pub fn effective_status(&self, today: NaiveDate) -> BillStatus {
        match self.status {
            BillStatus::Pending if today > self.due_date => BillStatus::Overdue,
            status => status,
        }
    }
}

/// `SC-<year>-<first 8 hex digits of the subject id>`
///
/// One bill per subject per period start keeps this unique.
fn bill_number(subject_id: SubjectId, period_start: NaiveDate) -> String {
    let simple = subject_id.as_uuid().simple().to_string();
    format!(
        "SC-{}-{}",
        period_start.year(),
        simple[..8].to_ascii_uppercase()
    )
}
