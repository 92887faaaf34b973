//! Journal entry and line types
//!
//! Callers describe an entry as a [`JournalDraft`] of [`NewJournalLine`]s.
//! The poster validates the draft and produces a [`JournalEntry`] whose
//! lines carry exactly one side and one positive amount.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Currency, JournalEntryId, JournalLineId, Money, MoneyError};

use crate::account::Side;

/// A line as submitted by a caller, before validation
///
/// Exactly one of `debit` and `credit` must be set, and it must be positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalLine {
    pub account_number: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    pub memo: Option<String>,
}

impl NewJournalLine {
    /// Creates a debit line
    pub fn debit(account_number: impl Into<String>, amount: Money) -> Self {
        Self {
            account_number: account_number.into(),
            debit: Some(amount),
            credit: None,
            memo: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_number: impl Into<String>, amount: Money) -> Self {
        Self {
            account_number: account_number.into(),
            debit: None,
            credit: Some(amount),
            memo: None,
        }
    }

    /// Adds a memo to the line
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// External reference attached to an entry, e.g. `("bill", <bill id>)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReference {
    pub reference_type: String,
    pub reference_id: Uuid,
}

impl EntryReference {
    pub fn new(reference_type: impl Into<String>, reference_id: Uuid) -> Self {
        Self {
            reference_type: reference_type.into(),
            reference_id,
        }
    }
}

/// An unvalidated journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalDraft {
    /// Accounting date
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference: Option<EntryReference>,
    /// Entry this draft offsets, for corrections
    pub reverses: Option<JournalEntryId>,
    pub lines: Vec<NewJournalLine>,
}

impl JournalDraft {
    /// Creates an empty draft
    ///
    /// # Arguments
    ///
    /// * `entry_date` - Accounting date of the entry
    /// * `description` - Free-text description
    pub fn new(entry_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            entry_date,
            description: description.into(),
            reference: None,
            reverses: None,
            lines: Vec::new(),
        }
    }

    /// Sets the reference
    pub fn with_reference(mut self, reference_type: impl Into<String>, reference_id: Uuid) -> Self {
        self.reference = Some(EntryReference::new(reference_type, reference_id));
        self
    }

    /// Adds a debit line
    pub fn debit(mut self, account_number: impl Into<String>, amount: Money) -> Self {
        self.lines.push(NewJournalLine::debit(account_number, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_number: impl Into<String>, amount: Money) -> Self {
        self.lines.push(NewJournalLine::credit(account_number, amount));
        self
    }

    /// Adds a custom line
    pub fn line(mut self, line: NewJournalLine) -> Self {
        self.lines.push(line);
        self
    }
}

/// A validated line of a posted entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub id: JournalLineId,
    pub account_number: String,
    pub side: Side,
    /// Always positive
    pub amount: Money,
    pub memo: Option<String>,
}

/// A posted, balanced journal entry
///
/// Entries are append-only; corrections are new entries linked through
/// `reverses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference: Option<EntryReference>,
    pub reverses: Option<JournalEntryId>,
    pub currency: Currency,
    pub lines: Vec<JournalLine>,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Sum of debit lines
    pub fn total_debits(&self) -> Result<Money, MoneyError> {
        self.side_total(Side::Debit)
    }

    /// Sum of credit lines
    pub fn total_credits(&self) -> Result<Money, MoneyError> {
        self.side_total(Side::Credit)
    }

    fn side_total(&self, side: Side) -> Result<Money, MoneyError> {
        Money::checked_sum(
            self.currency,
            self.lines.iter().filter(|l| l.side == side).map(|l| &l.amount),
        )
    }
}

/// One line of a posted entry, flattened with its entry's date
///
/// This is the unit the balance engine scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedLine {
    pub entry_id: JournalEntryId,
    pub entry_date: NaiveDate,
    pub account_number: String,
    pub side: Side,
    pub amount: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    #[test]
    fn test_draft_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draft = JournalDraft::new(date, "Opening")
            .debit("1000", usd(500))
            .credit("3000", usd(500))
            .with_reference("import", Uuid::nil());

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].debit, Some(usd(500)));
        assert!(draft.lines[0].credit.is_none());
        assert_eq!(draft.reference.unwrap().reference_type, "import");
    }
}
