//! Billing repository implementation
//!
//! Database access for billing subjects and bills. A bill is always written
//! in the same transaction as the journal entry that posts it.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::ledger::{insert_entry, NewJournalEntry};

/// Database row for a billing subject
#[derive(Debug, Clone, FromRow)]
pub struct SubjectRow {
    pub subject_id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub is_active: bool,
    pub service_charge_minor: Option<i64>,
    pub service_charge_currency: Option<String>,
    pub registration_start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a bill
#[derive(Debug, Clone, FromRow)]
pub struct BillRow {
    pub bill_id: Uuid,
    pub bill_number: String,
    pub subject_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub amount_minor: i64,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub journal_entry_id: Uuid,
    pub created_at: DateTime<Utc>,
}

const BILL_COLUMNS: &str = r#"
    bill_id, bill_number, subject_id, period_start, period_end, amount_minor,
    currency, due_date, status, journal_entry_id, created_at
"#;

/// Repository for billing subjects and bills
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Creates a new BillingRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a subject or replaces its details
    pub async fn upsert_subject(&self, row: &SubjectRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO billing_subjects (
                subject_id, name, unit, is_active, service_charge_minor,
                service_charge_currency, registration_start_date, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (subject_id) DO UPDATE SET
                name = EXCLUDED.name,
                unit = EXCLUDED.unit,
                is_active = EXCLUDED.is_active,
                service_charge_minor = EXCLUDED.service_charge_minor,
                service_charge_currency = EXCLUDED.service_charge_currency,
                registration_start_date = EXCLUDED.registration_start_date
            "#,
        )
        .bind(row.subject_id)
        .bind(&row.name)
        .bind(&row.unit)
        .bind(row.is_active)
        .bind(row.service_charge_minor)
        .bind(&row.service_charge_currency)
        .bind(row.registration_start_date)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_subject(&self, subject_id: Uuid) -> Result<Option<SubjectRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT subject_id, name, unit, is_active, service_charge_minor,
                   service_charge_currency, registration_start_date, created_at
            FROM billing_subjects
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_subjects(&self) -> Result<Vec<SubjectRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT subject_id, name, unit, is_active, service_charge_minor,
                   service_charge_currency, registration_start_date, created_at
            FROM billing_subjects
            ORDER BY subject_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The bill with the latest period end for a subject
    pub async fn latest_bill(&self, subject_id: Uuid) -> Result<Option<BillRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM bills WHERE subject_id = $1 ORDER BY period_end DESC LIMIT 1",
            BILL_COLUMNS
        );
        let row = sqlx::query_as::<_, BillRow>(&sql)
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn bills_for_subject(&self, subject_id: Uuid) -> Result<Vec<BillRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM bills WHERE subject_id = $1 ORDER BY period_start",
            BILL_COLUMNS
        );
        let rows = sqlx::query_as::<_, BillRow>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Writes a journal entry and its bill in a single transaction
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` when `uq_bills_subject_period` rejects the bill; the
    /// entry is rolled back with it.
    pub async fn create_bill_with_entry(
        &self,
        entry: &NewJournalEntry,
        bill: &BillRow,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        insert_entry(&mut *tx, entry).await?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                bill_id, bill_number, subject_id, period_start, period_end,
                amount_minor, currency, due_date, status, journal_entry_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(bill.bill_id)
        .bind(&bill.bill_number)
        .bind(bill.subject_id)
        .bind(bill.period_start)
        .bind(bill.period_end)
        .bind(bill.amount_minor)
        .bind(&bill.currency)
        .bind(bill.due_date)
        .bind(&bill.status)
        .bind(bill.journal_entry_id)
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
