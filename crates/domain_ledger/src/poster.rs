//! Journal posting
//!
//! Validates drafts and appends balanced entries to the ledger. Posting is
//! all-or-nothing: a rejected draft leaves no trace in the store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use core_kernel::{Currency, JournalEntryId, JournalLineId, Money};

use crate::account::{Account, Side};
use crate::error::LedgerError;
use crate::journal::{JournalDraft, JournalEntry, JournalLine, NewJournalLine};
use crate::store::LedgerStore;

/// Reference type used on correction entries
pub const REVERSAL_REFERENCE: &str = "reversal";

/// Posts balanced journal entries
///
/// # Invariants
///
/// - Every stored entry has at least two lines
/// - Every stored entry balances exactly in minor units
/// - Stored entries are never modified
#[derive(Clone)]
pub struct JournalPoster {
    store: Arc<dyn LedgerStore>,
    currency: Currency,
}

impl JournalPoster {
    /// Creates a poster for a single-currency ledger
    ///
    /// # Arguments
    ///
    /// * `store` - Ledger storage
    /// * `currency` - Currency every line must carry
    pub fn new(store: Arc<dyn LedgerStore>, currency: Currency) -> Self {
        Self { store, currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Validates a draft and builds the entry without storing it
    ///
    /// Checks run in a fixed order and the first failure wins:
    ///
    /// 1. at least two lines
    /// 2. every account exists and is active
    /// 3. every line carries exactly one positive amount in the ledger currency
    /// 4. debits equal credits
    ///
    /// # Errors
    ///
    /// `InsufficientLines`, `UnknownAccount`, `InactiveAccount`,
    /// `InvalidLine` or `UnbalancedEntry`
    pub async fn prepare(&self, draft: JournalDraft) -> Result<JournalEntry, LedgerError> {
        if draft.lines.len() < 2 {
            return Err(LedgerError::InsufficientLines {
                count: draft.lines.len(),
            });
        }

        self.check_accounts(&draft.lines).await?;
        let lines = validate_lines(&draft.lines, self.currency)?;

        Ok(JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_date: draft.entry_date,
            description: draft.description,
            reference: draft.reference,
            reverses: draft.reverses,
            currency: self.currency,
            lines,
            created_at: Utc::now(),
        })
    }

    /// Validates and appends an entry
    ///
    /// # Returns
    ///
    /// The id of the stored entry
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let draft = JournalDraft::new(date, "Gate repairs")
    ///     .debit("5000", amount)
    ///     .credit("1000", amount);
    ///
    /// let entry_id = poster.post(draft).await?;
    /// ```
    #[instrument(skip(self, draft), fields(entry_date = %draft.entry_date, lines = draft.lines.len()))]
    pub async fn post(&self, draft: JournalDraft) -> Result<JournalEntryId, LedgerError> {
        let entry = match self.prepare(draft).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Journal entry rejected");
                return Err(e);
            }
        };
        self.store.append_entry(&entry).await?;
        info!(entry_id = %entry.id, "Journal entry posted");
        Ok(entry.id)
    }

    /// Fetches a posted entry
    pub async fn get_entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.store
            .find_entry(id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Posts an entry that offsets a previous one
    ///
    /// Debits become credits and vice versa. The original entry is left
    /// untouched and the new entry goes through the same validation as
    /// [`JournalPoster::post`].
    ///
    /// # Arguments
    ///
    /// * `entry_id` - The entry to offset
    /// * `entry_date` - Accounting date of the correction
    /// * `reason` - Reason recorded in the description
    #[instrument(skip(self))]
    pub async fn reverse(
        &self,
        entry_id: JournalEntryId,
        entry_date: NaiveDate,
        reason: &str,
    ) -> Result<JournalEntryId, LedgerError> {
        let original = self.get_entry(entry_id).await?;

        let mut draft = JournalDraft::new(
            entry_date,
            format!("Reversal of {}: {}", original.id, reason),
        )
        .with_reference(REVERSAL_REFERENCE, *original.id.as_uuid());
        draft.reverses = Some(original.id);

        for line in &original.lines {
            let mirrored = match line.side.opposite() {
                Side::Debit => NewJournalLine::debit(line.account_number.clone(), line.amount),
                Side::Credit => NewJournalLine::credit(line.account_number.clone(), line.amount),
            };
            draft = draft.line(match &line.memo {
                Some(memo) => mirrored.with_memo(memo.clone()),
                None => mirrored,
            });
        }

        let reversal_id = self.post(draft).await?;
        info!(original = %entry_id, reversal = %reversal_id, "Journal entry reversed");
        Ok(reversal_id)
    }

    async fn check_accounts(&self, lines: &[NewJournalLine]) -> Result<(), LedgerError> {
        let mut seen: HashMap<&str, Account> = HashMap::new();
        for line in lines {
            let number = line.account_number.as_str();
            if seen.contains_key(number) {
                continue;
            }
            let account = self
                .store
                .find_account(number)
                .await?
                .ok_or_else(|| LedgerError::UnknownAccount(number.to_string()))?;
            if !account.is_active {
                return Err(LedgerError::InactiveAccount(number.to_string()));
            }
            seen.insert(number, account);
        }
        debug!(accounts = seen.len(), "Accounts validated");
        Ok(())
    }
}

/// Checks line amounts and balance, producing stored lines
///
/// Assumes account checks have already passed.
pub fn validate_lines(
    lines: &[NewJournalLine],
    currency: Currency,
) -> Result<Vec<JournalLine>, LedgerError> {
    let mut validated = Vec::with_capacity(lines.len());
    let mut debits = Money::zero(currency);
    let mut credits = Money::zero(currency);

    for (index, line) in lines.iter().enumerate() {
        let (side, amount) = match (line.debit, line.credit) {
            (Some(amount), None) => (Side::Debit, amount),
            (None, Some(amount)) => (Side::Credit, amount),
            (Some(_), Some(_)) => {
                return Err(LedgerError::invalid_line(index, "both debit and credit are set"))
            }
            (None, None) => {
                return Err(LedgerError::invalid_line(index, "neither debit nor credit is set"))
            }
        };

        if amount.currency() != currency {
            return Err(LedgerError::invalid_line(
                index,
                format!("currency {} does not match ledger currency {}", amount.currency(), currency),
            ));
        }
        if !amount.is_positive() {
            return Err(LedgerError::invalid_line(
                index,
                format!("amount must be positive, got {}", amount),
            ));
        }

        let total = match side {
            Side::Debit => &mut debits,
            Side::Credit => &mut credits,
        };
        *total = total
            .checked_add(&amount)
            .map_err(|e| LedgerError::invalid_line(index, e.to_string()))?;

        validated.push(JournalLine {
            id: JournalLineId::new(),
            account_number: line.account_number.clone(),
            side,
            amount,
            memo: line.memo.clone(),
        });
    }

    if debits != credits {
        return Err(LedgerError::UnbalancedEntry { debits, credits });
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::memory::InMemoryLedgerStore;
    use crate::registry::AccountRegistry;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (JournalPoster, AccountRegistry, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let registry = AccountRegistry::new(store.clone());
        registry
            .create_account("1000", "Cash", AccountType::Asset)
            .await
            .unwrap();
        registry
            .create_account("4000", "Income", AccountType::Revenue)
            .await
            .unwrap();
        (JournalPoster::new(store.clone(), Currency::USD), registry, store)
    }

    // ========================================================================
    // Line validation
    // ========================================================================

    mod validation_tests {
        use super::*;

        #[test]
        fn test_balanced_lines_pass() {
            let lines = vec![
                NewJournalLine::debit("1000", usd(100)),
                NewJournalLine::credit("4000", usd(60)),
                NewJournalLine::credit("4000", usd(40)),
            ];
            let validated = validate_lines(&lines, Currency::USD).unwrap();
            assert_eq!(validated.len(), 3);
            assert_eq!(validated[0].side, Side::Debit);
        }

        #[test]
        fn test_both_sides_set_is_invalid() {
            let mut line = NewJournalLine::debit("1000", usd(100));
            line.credit = Some(usd(100));
            let lines = vec![line, NewJournalLine::credit("4000", usd(100))];
            assert!(matches!(
                validate_lines(&lines, Currency::USD),
                Err(LedgerError::InvalidLine { index: 0, .. })
            ));
        }

        #[test]
        fn test_zero_amount_is_invalid() {
            let lines = vec![
                NewJournalLine::debit("1000", usd(0)),
                NewJournalLine::credit("4000", usd(0)),
            ];
            assert!(matches!(
                validate_lines(&lines, Currency::USD),
                Err(LedgerError::InvalidLine { index: 0, .. })
            ));
        }

        #[test]
        fn test_foreign_currency_is_invalid() {
            let lines = vec![
                NewJournalLine::debit("1000", usd(100)),
                NewJournalLine::credit("4000", Money::from_minor(100, Currency::EUR)),
            ];
            assert!(matches!(
                validate_lines(&lines, Currency::USD),
                Err(LedgerError::InvalidLine { index: 1, .. })
            ));
        }

        #[test]
        fn test_overflow_is_invalid() {
            let lines = vec![
                NewJournalLine::debit("1000", usd(i64::MAX)),
                NewJournalLine::debit("1000", usd(1)),
                NewJournalLine::credit("4000", usd(1)),
            ];
            assert!(matches!(
                validate_lines(&lines, Currency::USD),
                Err(LedgerError::InvalidLine { index: 1, .. })
            ));
        }

        #[test]
        fn test_unbalanced_reports_totals() {
            let lines = vec![
                NewJournalLine::debit("1000", usd(100)),
                NewJournalLine::credit("4000", usd(99)),
            ];
            match validate_lines(&lines, Currency::USD) {
                Err(LedgerError::UnbalancedEntry { debits, credits }) => {
                    assert_eq!(debits, usd(100));
                    assert_eq!(credits, usd(99));
                }
                other => panic!("expected UnbalancedEntry, got {:?}", other),
            }
        }
    }

    // ========================================================================
    // Posting
    // ========================================================================

    mod posting_tests {
        use super::*;

        #[tokio::test]
        async fn test_post_stores_entry() {
            let (poster, _, store) = setup().await;
            let draft = JournalDraft::new(date(2024, 3, 1), "Levy")
                .debit("1000", usd(5000))
                .credit("4000", usd(5000));

            let id = poster.post(draft).await.unwrap();
            let entry = poster.get_entry(id).await.unwrap();

            assert_eq!(entry.lines.len(), 2);
            assert_eq!(entry.total_debits().unwrap(), usd(5000));
            assert_eq!(store.entry_count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_single_line_is_insufficient() {
            let (poster, _, _) = setup().await;
            let draft = JournalDraft::new(date(2024, 3, 1), "Half").debit("1000", usd(10));
            assert!(matches!(
                poster.post(draft).await,
                Err(LedgerError::InsufficientLines { count: 1 })
            ));
        }

        #[tokio::test]
        async fn test_account_check_precedes_amount_check() {
            let (poster, _, _) = setup().await;
            let draft = JournalDraft::new(date(2024, 3, 1), "Bad")
                .debit("1000", usd(0))
                .credit("9999", usd(10));
            assert!(matches!(
                poster.post(draft).await,
                Err(LedgerError::UnknownAccount(n)) if n == "9999"
            ));
        }

        #[tokio::test]
        async fn test_inactive_account_rejected() {
            let (poster, registry, store) = setup().await;
            registry.deactivate("4000").await.unwrap();
            let draft = JournalDraft::new(date(2024, 3, 1), "Levy")
                .debit("1000", usd(10))
                .credit("4000", usd(10));
            assert!(matches!(
                poster.post(draft).await,
                Err(LedgerError::InactiveAccount(_))
            ));
            assert_eq!(store.entry_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_unknown_entry_is_not_found() {
            let (poster, _, _) = setup().await;
            assert!(matches!(
                poster.get_entry(JournalEntryId::new()).await,
                Err(LedgerError::EntryNotFound(_))
            ));
        }

        #[tokio::test]
        async fn test_reverse_mirrors_lines() {
            let (poster, _, _) = setup().await;
            let original = poster
                .post(
                    JournalDraft::new(date(2024, 3, 1), "Levy")
                        .debit("1000", usd(700))
                        .credit("4000", usd(700)),
                )
                .await
                .unwrap();

            let reversal_id = poster
                .reverse(original, date(2024, 3, 2), "posted twice")
                .await
                .unwrap();
            let reversal = poster.get_entry(reversal_id).await.unwrap();

            assert_eq!(reversal.reverses, Some(original));
            assert!(reversal.description.starts_with("Reversal of"));
            assert!(reversal.description.ends_with("posted twice"));
            let cash = reversal
                .lines
                .iter()
                .find(|l| l.account_number == "1000")
                .unwrap();
            assert_eq!(cash.side, Side::Credit);
            assert_eq!(
                reversal.reference.as_ref().unwrap().reference_type,
                REVERSAL_REFERENCE
            );
        }

        #[tokio::test]
        async fn test_reverse_unknown_entry() {
            let (poster, _, _) = setup().await;
            let result = poster
                .reverse(JournalEntryId::new(), date(2024, 3, 2), "typo")
                .await;
            assert!(matches!(result, Err(LedgerError::EntryNotFound(_))));
        }
    }
}
