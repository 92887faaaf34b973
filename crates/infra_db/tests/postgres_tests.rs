//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default.
//! Run with `cargo test -p infra_db -- --ignored`.

use std::sync::Arc;

use core_kernel::PortError;
use domain_billing::{BillingConfig, BillingStore, SubjectStatus};
use domain_ledger::{standard, JournalDraft, LedgerError, LedgerStore};
use infra_db::{PgBillingStore, PgLedgerStore};
use test_utils::{
    assert_bills_contiguous, assert_trial_balance_balanced, create_isolated_test_database, date,
    BillingHarness, MoneyFixtures, TestDatabase, TestSubjectBuilder,
};

async fn harness(db: &TestDatabase) -> BillingHarness {
    let ledger_store: Arc<dyn LedgerStore> = Arc::new(PgLedgerStore::new(db.pool().clone()));
    let billing_store: Arc<dyn BillingStore> = Arc::new(PgBillingStore::new(db.pool().clone()));
    BillingHarness::with_stores(ledger_store, billing_store, BillingConfig::default()).await
}

// ============================================================================
// Ledger Store Tests
// ============================================================================

mod ledger_store_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_entry_round_trip() {
        let db = create_isolated_test_database().await.unwrap();
        let h = harness(&db).await;

        let draft = JournalDraft::new(date(2024, 3, 1), "Opening cash")
            .debit(standard::CASH, MoneyFixtures::usd(50_000))
            .credit(standard::RETAINED_SURPLUS, MoneyFixtures::usd(50_000))
            .with_reference("import", uuid::Uuid::new_v4());
        let id = h.ledger.poster().post(draft).await.unwrap();

        let entry = h.ledger.poster().get_entry(id).await.unwrap();
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].account_number, standard::CASH);
        assert_eq!(entry.reference.unwrap().reference_type, "import");

        let cash = h
            .ledger
            .balances()
            .balance_as_of(standard::CASH, date(2024, 3, 1))
            .await
            .unwrap();
        assert_eq!(cash, MoneyFixtures::usd(50_000));

        let before = h
            .ledger
            .balances()
            .balance_as_of(standard::CASH, date(2024, 2, 29))
            .await
            .unwrap();
        assert!(before.is_zero());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_referenced_account_cannot_be_removed() {
        let db = create_isolated_test_database().await.unwrap();
        let h = harness(&db).await;

        h.ledger
            .poster()
            .post(
                JournalDraft::new(date(2024, 1, 1), "Repairs")
                    .debit(standard::MAINTENANCE_EXPENSE, MoneyFixtures::usd(700))
                    .credit(standard::CASH, MoneyFixtures::usd(700)),
            )
            .await
            .unwrap();

        let err = h
            .ledger
            .registry()
            .remove_account(standard::CASH)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountInUse(_)));

        let deactivated = h.ledger.registry().deactivate(standard::CASH).await.unwrap();
        assert!(!deactivated.is_active);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_referenced_account_keeps_its_type() {
        let db = create_isolated_test_database().await.unwrap();
        let store = PgLedgerStore::new(db.pool().clone());
        let h = harness(&db).await;

        h.ledger
            .poster()
            .post(
                JournalDraft::new(date(2024, 1, 1), "Float")
                    .debit(standard::CASH, MoneyFixtures::usd(300))
                    .credit(standard::RETAINED_SURPLUS, MoneyFixtures::usd(300)),
            )
            .await
            .unwrap();

        let err = store
            .reclassify_account(standard::CASH, domain_ledger::AccountType::Liability)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        store
            .reclassify_account(standard::MAINTENANCE_EXPENSE, domain_ledger::AccountType::Asset)
            .await
            .unwrap();
        store
            .set_account_active(standard::MAINTENANCE_EXPENSE, false)
            .await
            .unwrap();
        let account = store
            .find_account(standard::MAINTENANCE_EXPENSE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.account_type, domain_ledger::AccountType::Asset);
        assert!(!account.is_active);

        let missing = store.set_account_active("9999", true).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_account_number_is_conflict() {
        let db = create_isolated_test_database().await.unwrap();
        let store = PgLedgerStore::new(db.pool().clone());
        let account = test_utils::TestAccountBuilder::new("1200", domain_ledger::AccountType::Asset).build();

        store.insert_account(&account).await.unwrap();
        let again = test_utils::TestAccountBuilder::new("1200", domain_ledger::AccountType::Asset).build();
        let err = store.insert_account(&again).await.unwrap_err();
        assert!(err.is_conflict());
    }
}

// ============================================================================
// Billing Store Tests
// ============================================================================

mod billing_store_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_billing_run_against_postgres() {
        let db = create_isolated_test_database().await.unwrap();
        let h = harness(&db).await;

        let subject = TestSubjectBuilder::new().registered_on(date(2023, 1, 1)).build();
        h.store.save_subject(&subject).await.unwrap();
        h.store
            .save_subject(&TestSubjectBuilder::new().without_charge().build())
            .await
            .unwrap();

        let summary = h.generator.generate_due_bills(date(2025, 1, 1)).await.unwrap();
        assert_eq!(summary.total_bills, 2);
        assert_eq!(summary.skipped, 1);

        let bills = h.store.bills_for_subject(subject.id).await.unwrap();
        assert_eq!(bills.len(), 2);
        assert_bills_contiguous(&bills);

        let rerun = h.generator.generate_due_bills(date(2025, 1, 1)).await.unwrap();
        assert_eq!(rerun.total_bills, 0);
        assert!(rerun.details.iter().all(|d| d.status != SubjectStatus::Failed));

        let report = h.ledger.reporter().trial_balance(date(2025, 1, 1)).await.unwrap();
        assert_trial_balance_balanced(&report);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_period_rolls_back_entry() {
        let db = create_isolated_test_database().await.unwrap();
        let h = harness(&db).await;

        let subject = TestSubjectBuilder::new().build();
        h.store.save_subject(&subject).await.unwrap();
        h.generator.generate_due_bills(date(2024, 1, 1)).await.unwrap();

        let existing = h.store.latest_bill(subject.id).await.unwrap().unwrap();
        let entries_before = h.ledger.store().entry_count().await.unwrap();

        // Re-issue the same period through the port directly.
        let draft = JournalDraft::new(existing.period_end, "Duplicate")
            .debit(standard::ACCOUNTS_RECEIVABLE, existing.amount)
            .credit(standard::ESTATE_MANAGEMENT_FUND, existing.amount);
        let entry = h.ledger.poster().prepare(draft).await.unwrap();
        let mut duplicate = existing.clone();
        duplicate.id = core_kernel::BillId::new();
        duplicate.journal_entry_id = entry.id;

        let err = h.store.commit_bill(&entry, &duplicate).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));
        assert_eq!(h.ledger.store().entry_count().await.unwrap(), entries_before);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_concurrent_generators_bill_each_period_once() {
        let db = create_isolated_test_database().await.unwrap();
        let first = harness(&db).await;
        let second = harness(&db).await;

        let subject = TestSubjectBuilder::new().registered_on(date(2020, 1, 1)).build();
        first.store.save_subject(&subject).await.unwrap();

        let as_of = date(2025, 1, 1);
        let (a, b) = tokio::join!(
            first.generator.generate_due_bills(as_of),
            second.generator.generate_due_bills(as_of),
        );
        let total = a.unwrap().total_bills + b.unwrap().total_bills;
        assert_eq!(total, 5);

        let bills = first.store.bills_for_subject(subject.id).await.unwrap();
        assert_eq!(bills.len(), 5);
        assert_bills_contiguous(&bills);
    }
}
