//! Property-Based Test Generators
//!
//! Proptest strategies producing ledger data that respects the posting
//! rules, plus a few that deliberately break them.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_ledger::{standard, JournalDraft, NewJournalLine};

use crate::fixtures::date;

/// Accounts of the standard chart that postings may use
pub const POSTABLE_ACCOUNTS: [&str; 6] = [
    standard::CASH,
    standard::ACCOUNTS_RECEIVABLE,
    standard::ESTATE_MANAGEMENT_FUND,
    standard::RETAINED_SURPLUS,
    standard::SERVICE_CHARGE_INCOME,
    standard::MAINTENANCE_EXPENSE,
];

/// Positive amounts in minor units, small enough that sums never overflow
pub fn positive_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Dates between 2020-01-01 and the end of 2029
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3653).prop_map(|offset| date(2020, 1, 1) + Duration::days(offset))
}

pub fn account_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(POSTABLE_ACCOUNTS.to_vec())
}

/// Balanced USD drafts of two to six lines
///
/// The debit side is a list of random amounts; their total is split across
/// one or more credit lines so the entry always balances.
pub fn balanced_draft_strategy() -> impl Strategy<Value = JournalDraft> {
    (
        date_strategy(),
        prop::collection::vec((account_strategy(), positive_minor_strategy()), 1..4),
        prop::collection::vec(account_strategy(), 1..3),
    )
        .prop_map(|(entry_date, debits, credit_accounts)| {
            let total: i64 = debits.iter().map(|(_, minor)| minor).sum();
            let mut draft = JournalDraft::new(entry_date, "Generated entry");
            for (account, minor) in &debits {
                draft = draft.debit(*account, Money::from_minor(*minor, Currency::USD));
            }
            for (account, minor) in split_amount(total, &credit_accounts) {
                draft = draft.line(NewJournalLine::credit(account, Money::from_minor(minor, Currency::USD)));
            }
            draft
        })
}

/// Two-line drafts whose sides differ by a non-zero amount
pub fn unbalanced_draft_strategy() -> impl Strategy<Value = JournalDraft> {
    (date_strategy(), positive_minor_strategy(), 1i64..1_000)
        .prop_map(|(entry_date, debit, skew)| {
            JournalDraft::new(entry_date, "Unbalanced entry")
                .debit(standard::CASH, Money::from_minor(debit, Currency::USD))
                .credit(
                    standard::SERVICE_CHARGE_INCOME,
                    Money::from_minor(debit + skew, Currency::USD),
                )
        })
}

/// Splits `total` into positive parts, one per account
///
/// Parts that would be zero are merged into the last line.
fn split_amount(total: i64, accounts: &[&'static str]) -> Vec<(&'static str, i64)> {
    let count = accounts.len() as i64;
    let share = total / count;
    if share == 0 {
        return vec![(accounts[0], total)];
    }

    let mut parts: Vec<(&'static str, i64)> = accounts.iter().map(|a| (*a, share)).collect();
    if let Some(last) = parts.last_mut() {
        last.1 += total - share * count;
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_amount_preserves_total() {
        let parts = split_amount(101, &[standard::CASH, standard::RETAINED_SURPLUS]);
        assert_eq!(parts.iter().map(|(_, m)| m).sum::<i64>(), 101);
        assert!(parts.iter().all(|(_, m)| *m > 0));
    }

    #[test]
    fn test_split_amount_smaller_than_accounts() {
        let parts = split_amount(1, &[standard::CASH, standard::RETAINED_SURPLUS]);
        assert_eq!(parts, vec![(standard::CASH, 1)]);
    }

    proptest! {
        #[test]
        fn prop_generated_drafts_balance(draft in balanced_draft_strategy()) {
            let debits: i64 = draft.lines.iter().filter_map(|l| l.debit).map(|m| m.minor()).sum();
            let credits: i64 = draft.lines.iter().filter_map(|l| l.credit).map(|m| m.minor()).sum();
            prop_assert_eq!(debits, credits);
            prop_assert!(draft.lines.len() >= 2);
        }
    }
}
