//! PostgreSQL ledger adapter
//!
//! Implements `domain_ledger::LedgerStore` on top of [`LedgerRepository`],
//! converting between domain values and row types. Amounts are stored as
//! integer minor units with an ISO currency code beside them.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AccountId, Currency, JournalEntryId, JournalLineId, Money, PortError};
use domain_ledger::{
    Account, AccountType, EntryReference, JournalEntry, JournalLine, LedgerStore, PostedLine, Side,
};

use crate::repositories::ledger::{
    AccountRow, DatedLineRow, JournalEntryRow, JournalLineRow, LedgerRepository, NewJournalEntry,
};

/// PostgreSQL-backed [`LedgerStore`]
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    repository: LedgerRepository,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LedgerRepository::new(pool),
        }
    }

    /// Returns the underlying repository
    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[instrument(skip(self, account), fields(number = %account.number))]
    async fn insert_account(&self, account: &Account) -> Result<(), PortError> {
        self.repository.insert_account(&account_to_row(account)).await?;
        debug!("Account inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_account_active(&self, number: &str, active: bool) -> Result<(), PortError> {
        self.repository.set_account_active(number, active).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reclassify_account(
        &self,
        number: &str,
        account_type: AccountType,
    ) -> Result<(), PortError> {
        self.repository
            .reclassify_account(number, account_type.as_str())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, number: &str) -> Result<(), PortError> {
        self.repository.delete_account(number).await?;
        Ok(())
    }

    async fn find_account(&self, number: &str) -> Result<Option<Account>, PortError> {
        self.repository
            .find_account(number)
            .await?
            .map(row_to_account)
            .transpose()
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        self.repository
            .list_accounts()
            .await?
            .into_iter()
            .map(row_to_account)
            .collect()
    }

    async fn is_account_referenced(&self, number: &str) -> Result<bool, PortError> {
        Ok(self.repository.is_account_referenced(number).await?)
    }

    #[instrument(skip(self, entry), fields(entry_id = %entry.id, lines = entry.lines.len()))]
    async fn append_entry(&self, entry: &JournalEntry) -> Result<(), PortError> {
        self.repository.insert_entry(&entry_to_rows(entry)).await?;
        debug!("Entry appended");
        Ok(())
    }

    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError> {
        self.repository
            .find_entry(*id.as_uuid())
            .await?
            .map(|(header, lines)| rows_to_entry(header, lines))
            .transpose()
    }

    async fn entry_count(&self) -> Result<u64, PortError> {
        let count = self.repository.entry_count().await?;
        u64::try_from(count).map_err(|_| PortError::transformation("negative entry count"))
    }

    #[instrument(skip(self))]
    async fn lines_as_of(&self, as_of: NaiveDate) -> Result<Vec<PostedLine>, PortError> {
        self.repository
            .lines_as_of(as_of)
            .await?
            .into_iter()
            .map(row_to_posted_line)
            .collect()
    }

    async fn account_lines_as_of(
        &self,
        number: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<PostedLine>, PortError> {
        self.repository
            .account_lines_as_of(number, as_of)
            .await?
            .into_iter()
            .map(row_to_posted_line)
            .collect()
    }
}

// ============================================================================
// Row conversions
// ============================================================================

pub(crate) fn account_to_row(account: &Account) -> AccountRow {
    AccountRow {
        account_id: *account.id.as_uuid(),
        account_number: account.number.clone(),
        name: account.name.clone(),
        account_type: account.account_type.as_str().to_string(),
        description: account.description.clone(),
        is_active: account.is_active,
        created_at: account.created_at,
    }
}

pub(crate) fn row_to_account(row: AccountRow) -> Result<Account, PortError> {
    let account_type: AccountType = row
        .account_type
        .parse()
        .map_err(|e| PortError::transformation(format!("account {}: {}", row.account_number, e)))?;

    Ok(Account {
        id: AccountId::from_uuid(row.account_id),
        number: row.account_number,
        name: row.name,
        account_type,
        description: row.description,
        is_active: row.is_active,
        created_at: row.created_at,
    })
}

pub(crate) fn entry_to_rows(entry: &JournalEntry) -> NewJournalEntry {
    let entry_id = *entry.id.as_uuid();
    let header = JournalEntryRow {
        entry_id,
        entry_date: entry.entry_date,
        description: entry.description.clone(),
        reference_type: entry.reference.as_ref().map(|r| r.reference_type.clone()),
        reference_id: entry.reference.as_ref().map(|r| r.reference_id),
        reverses_entry_id: entry.reverses.map(|id| *id.as_uuid()),
        currency: entry.currency.code().to_string(),
        created_at: entry.created_at,
    };

    let lines = entry
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| JournalLineRow {
            line_id: *line.id.as_uuid(),
            entry_id,
            line_no: index as i32,
            account_number: line.account_number.clone(),
            side: line.side.as_str().to_string(),
            amount_minor: line.amount.minor(),
            currency: line.amount.currency().code().to_string(),
            memo: line.memo.clone(),
        })
        .collect();

    NewJournalEntry { header, lines }
}

fn rows_to_entry(header: JournalEntryRow, lines: Vec<JournalLineRow>) -> Result<JournalEntry, PortError> {
    let currency = parse_currency(&header.currency)?;

    let reference = match (header.reference_type, header.reference_id) {
        (Some(reference_type), Some(reference_id)) => Some(EntryReference {
            reference_type,
            reference_id,
        }),
        _ => None,
    };

    let lines = lines
        .into_iter()
        .map(|row| {
            Ok(JournalLine {
                id: JournalLineId::from_uuid(row.line_id),
                side: parse_side(&row.side)?,
                amount: Money::from_minor(row.amount_minor, parse_currency(&row.currency)?),
                account_number: row.account_number,
                memo: row.memo,
            })
        })
        .collect::<Result<Vec<_>, PortError>>()?;

    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(header.entry_id),
        entry_date: header.entry_date,
        description: header.description,
        reference,
        reverses: header.reverses_entry_id.map(JournalEntryId::from_uuid),
        currency,
        lines,
        created_at: header.created_at,
    })
}

fn row_to_posted_line(row: DatedLineRow) -> Result<PostedLine, PortError> {
    Ok(PostedLine {
        entry_id: JournalEntryId::from_uuid(row.entry_id),
        entry_date: row.entry_date,
        side: parse_side(&row.side)?,
        amount: Money::from_minor(row.amount_minor, parse_currency(&row.currency)?),
        account_number: row.account_number,
    })
}

fn parse_side(value: &str) -> Result<Side, PortError> {
    value
        .parse()
        .map_err(|_| PortError::transformation(format!("invalid side '{}'", value)))
}

pub(crate) fn parse_currency(value: &str) -> Result<Currency, PortError> {
    value
        .parse()
        .map_err(|_| PortError::transformation(format!("invalid currency '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain_ledger::standard;

    fn sample_entry() -> JournalEntry {
        let usd = |minor| Money::from_minor(minor, Currency::USD);
        JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: "Service charge".into(),
            reference: Some(EntryReference::new("bill", uuid::Uuid::nil())),
            reverses: None,
            currency: Currency::USD,
            lines: vec![
                JournalLine {
                    id: JournalLineId::new(),
                    account_number: standard::ACCOUNTS_RECEIVABLE.into(),
                    side: Side::Debit,
                    amount: usd(120_000),
                    memo: None,
                },
                JournalLine {
                    id: JournalLineId::new(),
                    account_number: standard::ESTATE_MANAGEMENT_FUND.into(),
                    side: Side::Credit,
                    amount: usd(120_000),
                    memo: Some("fund".into()),
                },
            ],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_rows_keep_line_order() {
        let entry = sample_entry();
        let rows = entry_to_rows(&entry);

        assert_eq!(rows.header.reference_type.as_deref(), Some("bill"));
        assert_eq!(rows.lines[0].line_no, 0);
        assert_eq!(rows.lines[1].side, "credit");
        assert_eq!(rows.lines[1].amount_minor, 120_000);

        let back = rows_to_entry(rows.header, rows.lines).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_unknown_account_type_is_transformation_error() {
        let row = AccountRow {
            account_id: uuid::Uuid::new_v4(),
            account_number: "9000".into(),
            name: "Suspense".into(),
            account_type: "contra".into(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(matches!(row_to_account(row), Err(PortError::Transformation { .. })));
    }
}
