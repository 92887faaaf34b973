//! Ledger repository
//!
//! SQL for accounts, journal entries and journal lines.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Database row for an account
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub account_id: Uuid,
    pub account_number: String,
    pub name: String,
    pub account_type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Database row for a journal entry header
#[derive(Debug, Clone, FromRow)]
pub struct JournalEntryRow {
    pub entry_id: Uuid,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reverses_entry_id: Option<Uuid>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Database row for a journal line
#[derive(Debug, Clone, FromRow)]
pub struct JournalLineRow {
    pub line_id: Uuid,
    pub entry_id: Uuid,
    pub line_no: i32,
    pub account_number: String,
    pub side: String,
    pub amount_minor: i64,
    pub currency: String,
    pub memo: Option<String>,
}

/// A line joined with its entry's date, for balance scans
#[derive(Debug, Clone, FromRow)]
pub struct DatedLineRow {
    pub entry_id: Uuid,
    pub entry_date: NaiveDate,
    pub account_number: String,
    pub side: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// An entry and its lines, ready to insert
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub header: JournalEntryRow,
    pub lines: Vec<JournalLineRow>,
}

const DATED_LINE_COLUMNS: &str = r#"
    l.entry_id, e.entry_date, l.account_number, l.side, l.amount_minor, l.currency
"#;

/// Repository for ledger tables
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new ledger repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_account(&self, row: &AccountRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id, account_number, name, account_type,
                description, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.account_id)
        .bind(&row.account_number)
        .bind(&row.name)
        .bind(&row.account_type)
        .bind(&row.description)
        .bind(row.is_active)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Sets the activation flag without touching the other columns
    pub async fn set_account_active(&self, number: &str, active: bool) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE accounts SET is_active = $2 WHERE account_number = $1")
            .bind(number)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Account", number));
        }
        Ok(())
    }

    /// Changes an account's type unless journal lines reference it
    ///
    /// `FOR UPDATE` conflicts with the key-share lock a line insert takes on
    /// the account row, so an in-flight posting either commits first and is
    /// seen by the check, or waits until this transaction ends.
    pub async fn reclassify_account(
        &self,
        number: &str,
        account_type: &str,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT account_type FROM accounts WHERE account_number = $1 FOR UPDATE",
        )
        .bind(number)
        .fetch_optional(&mut *tx)
        .await?;

        let current = current.ok_or_else(|| DatabaseError::not_found("Account", number))?;
        if current == account_type {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET account_type = $2
            WHERE account_number = $1
              AND NOT EXISTS (SELECT 1 FROM journal_lines WHERE account_number = $1)
            "#,
        )
        .bind(number)
        .bind(account_type)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "account {} is referenced by journal lines",
                number
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Deletes an account; the foreign key from `journal_lines` refuses
    /// referenced accounts
    pub async fn delete_account(&self, number: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_number = $1")
            .bind(number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Account", number));
        }
        Ok(())
    }

    pub async fn find_account(&self, number: &str) -> Result<Option<AccountRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, account_number, name, account_type,
                   description, is_active, created_at
            FROM accounts
            WHERE account_number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, account_number, name, account_type,
                   description, is_active, created_at
            FROM accounts
            ORDER BY account_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn is_account_referenced(&self, number: &str) -> Result<bool, DatabaseError> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM journal_lines WHERE account_number = $1)",
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(referenced)
    }

    /// Inserts an entry with all its lines in one transaction
    pub async fn insert_entry(&self, entry: &NewJournalEntry) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_entry(&mut *tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_entry(
        &self,
        entry_id: Uuid,
    ) -> Result<Option<(JournalEntryRow, Vec<JournalLineRow>)>, DatabaseError> {
        let header = sqlx::query_as::<_, JournalEntryRow>(
            r#"
            SELECT entry_id, entry_date, description, reference_type, reference_id,
                   reverses_entry_id, currency, created_at
            FROM journal_entries
            WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, JournalLineRow>(
            r#"
            SELECT line_id, entry_id, line_no, account_number, side,
                   amount_minor, currency, memo
            FROM journal_lines
            WHERE entry_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((header, lines)))
    }

    pub async fn entry_count(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every line on entries dated on or before `as_of`, in one query
    pub async fn lines_as_of(&self, as_of: NaiveDate) -> Result<Vec<DatedLineRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM journal_lines l
            JOIN journal_entries e ON e.entry_id = l.entry_id
            WHERE e.entry_date <= $1
            ORDER BY e.entry_date, e.created_at, l.line_no
            "#,
            DATED_LINE_COLUMNS
        );
        let rows = sqlx::query_as::<_, DatedLineRow>(&sql)
            .bind(as_of)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn account_lines_as_of(
        &self,
        number: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<DatedLineRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM journal_lines l
            JOIN journal_entries e ON e.entry_id = l.entry_id
            WHERE l.account_number = $1 AND e.entry_date <= $2
            ORDER BY e.entry_date, e.created_at, l.line_no
            "#,
            DATED_LINE_COLUMNS
        );
        let rows = sqlx::query_as::<_, DatedLineRow>(&sql)
            .bind(number)
            .bind(as_of)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Inserts an entry header and its lines on an open connection
///
/// Callers own the transaction; the billing repository uses this to write a
/// bill and its entry together.
pub async fn insert_entry(
    conn: &mut PgConnection,
    entry: &NewJournalEntry,
) -> Result<(), DatabaseError> {
    let header = &entry.header;
    sqlx::query(
        r#"
        INSERT INTO journal_entries (
            entry_id, entry_date, description, reference_type,
            reference_id, reverses_entry_id, currency, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(header.entry_id)
    .bind(header.entry_date)
    .bind(&header.description)
    .bind(&header.reference_type)
    .bind(header.reference_id)
    .bind(header.reverses_entry_id)
    .bind(&header.currency)
    .bind(header.created_at)
    .execute(&mut *conn)
    .await?;

    for line in &entry.lines {
        sqlx::query(
            r#"
            INSERT INTO journal_lines (
                line_id, entry_id, line_no, account_number, side,
                amount_minor, currency, memo
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(line.line_id)
        .bind(line.entry_id)
        .bind(line.line_no)
        .bind(&line.account_number)
        .bind(&line.side)
        .bind(line.amount_minor)
        .bind(&line.currency)
        .bind(&line.memo)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
