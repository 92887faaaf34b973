//! Journal entry DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_ledger::{JournalDraft, JournalEntry, JournalLine, NewJournalLine, Side};

use crate::dto::to_money;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostEntryRequest {
    pub entry_date: NaiveDate,
    #[validate(length(min = 1, max = 500, message = "must be 1 to 500 characters"))]
    pub description: String,
    pub reference: Option<ReferenceDto>,
    #[validate(length(min = 2, message = "an entry needs at least two lines"))]
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDto {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub id: Uuid,
}

/// One line; exactly one of `debit` and `credit` must be present
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub account_number: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub memo: Option<String>,
}

impl PostEntryRequest {
    /// Converts the request to a draft in the ledger currency
    ///
    /// Line balance and account checks are left to the poster.
    pub fn into_draft(self, currency: Currency) -> Result<JournalDraft, ApiError> {
        let mut draft = JournalDraft::new(self.entry_date, self.description);
        if let Some(reference) = self.reference {
            draft = draft.with_reference(reference.reference_type, reference.id);
        }

        for line in self.lines {
            let mut new_line = NewJournalLine {
                account_number: line.account_number,
                debit: line.debit.map(|d| to_money(d, currency)).transpose()?,
                credit: line.credit.map(|c| to_money(c, currency)).transpose()?,
                memo: None,
            };
            if let Some(memo) = line.memo {
                new_line = new_line.with_memo(memo);
            }
            draft = draft.line(new_line);
        }
        Ok(draft)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReverseEntryRequest {
    pub entry_date: NaiveDate,
    #[validate(length(min = 1, message = "a reason is required"))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    pub description: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverses: Option<Uuid>,
    pub lines: Vec<LineResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: Uuid,
    pub account_number: String,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl From<JournalLine> for LineResponse {
    fn from(line: JournalLine) -> Self {
        Self {
            id: *line.id.as_uuid(),
            account_number: line.account_number,
            side: line.side,
            amount: line.amount.to_decimal(),
            memo: line.memo,
        }
    }
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            entry_date: entry.entry_date,
            description: entry.description,
            currency: entry.currency.code().to_string(),
            reference: entry.reference.map(|r| ReferenceDto {
                reference_type: r.reference_type,
                id: r.reference_id,
            }),
            reverses: entry.reverses.map(|id| *id.as_uuid()),
            lines: entry.lines.into_iter().map(LineResponse::from).collect(),
            created_at: entry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(debit: Decimal) -> PostEntryRequest {
        PostEntryRequest {
            entry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: "Levy".into(),
            reference: None,
            lines: vec![
                LineRequest {
                    account_number: "1100".into(),
                    debit: Some(debit),
                    credit: None,
                    memo: Some("unit 4".into()),
                },
                LineRequest {
                    account_number: "2100".into(),
                    debit: None,
                    credit: Some(debit),
                    memo: None,
                },
            ],
        }
    }

    #[test]
    fn test_amounts_convert_to_minor_units() {
        let draft = request(dec!(500.25)).into_draft(Currency::USD).unwrap();
        assert_eq!(draft.lines[0].debit.unwrap().minor(), 50_025);
        assert_eq!(draft.lines[0].memo.as_deref(), Some("unit 4"));
        assert_eq!(draft.lines[1].credit.unwrap().minor(), 50_025);
    }

    #[test]
    fn test_single_line_entry_fails_validation() {
        let mut one_line = request(dec!(10));
        one_line.lines.truncate(1);

        let errors = one_line.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("lines"));
        assert!(request(dec!(10)).validate().is_ok());
    }

    #[test]
    fn test_excess_precision_is_rejected() {
        let err = request(dec!(1.005)).into_draft(Currency::USD).unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }
}
