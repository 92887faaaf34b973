//! Custom Test Assertions
//!
//! Assertion helpers for ledger and billing results, with failure
//! messages that name the offending entry, row or bill.

use core_kernel::Money;
use domain_billing::Bill;
use domain_ledger::{JournalEntry, TrialBalance};

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that an entry's debits equal its credits
pub fn assert_entry_balanced(entry: &JournalEntry) {
    let debits = entry.total_debits().unwrap();
    let credits = entry.total_credits().unwrap();
    assert_eq!(
        debits, credits,
        "Entry {} is unbalanced: debits={}, credits={}",
        entry.id, debits, credits
    );
}

/// Asserts the report balances and that each row uses a single column
pub fn assert_trial_balance_balanced(report: &TrialBalance) {
    assert!(
        report.balanced,
        "Trial balance as of {} is unbalanced: debits={}, credits={}",
        report.as_of, report.total_debits, report.total_credits
    );
    assert_eq!(report.total_debits, report.total_credits);

    for row in &report.rows {
        assert!(
            row.debit.is_zero() || row.credit.is_zero(),
            "Row {} has both a debit and a credit",
            row.account_number
        );
    }
}

/// Asserts a subject's bills (ordered by period start) chain without gaps
/// or overlaps
pub fn assert_bills_contiguous(bills: &[Bill]) {
    for pair in bills.windows(2) {
        assert_eq!(
            pair[0].period_end, pair[1].period_start,
            "Bill {} ends {} but the next bill {} starts {}",
            pair[0].bill_number, pair[0].period_end, pair[1].bill_number, pair[1].period_start
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{BillId, BillingPeriod, Currency, JournalEntryId, SubjectId};

    use crate::fixtures::date;

    fn bill(start: chrono::NaiveDate) -> Bill {
        let period = BillingPeriod::annual(start).unwrap();
        Bill::new(
            BillId::new(),
            SubjectId::new(),
            period,
            Money::from_minor(100, Currency::USD),
            period.end(),
            JournalEntryId::new(),
        )
    }

    #[test]
    fn test_contiguous_bills_pass() {
        assert_bills_contiguous(&[bill(date(2023, 1, 1)), bill(date(2024, 1, 1))]);
    }

    #[test]
    #[should_panic(expected = "ends")]
    fn test_gap_is_reported() {
        assert_bills_contiguous(&[bill(date(2023, 1, 1)), bill(date(2025, 1, 1))]);
    }
}
