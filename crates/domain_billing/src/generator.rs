//! Billing cycle generator
//!
//! Issues annual service-charge bills for every eligible subject up to an
//! as-of date. Each bill is posted to the ledger as
//! `Dr Accounts Receivable / Cr Estate Management Fund` and stored together
//! with that entry.
//!
//! # Idempotency
//!
//! The next period always starts where the subject's latest stored bill
//! ends, so re-running for the same date creates nothing new.
//!
//! # Concurrency
//!
//! Subjects are processed concurrently up to [`BillingConfig::concurrency`].
//! Work on one subject is serialized by a per-subject lock held from reading
//! the latest bill to storing the new one; the store's uniqueness rule on
//! `(subject, period_start)` catches runs in other processes.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use core_kernel::{BillId, BillingPeriod, Money, SubjectId};
use domain_ledger::{AccountRegistry, AccountType, JournalDraft, JournalPoster, Ledger, LedgerError};

use crate::bill::Bill;
use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::store::BillingStore;
use crate::subject::{BillingSubject, Eligibility};

/// Reference type on bill entries
pub const BILL_REFERENCE: &str = "bill";

/// Skip reason for inactive subjects
pub const REASON_INACTIVE: &str = "inactive";

/// Skip reason for subjects without a charge or start date
pub const REASON_MISSING_DATA: &str = "missing billing data";

/// Per-subject result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    /// Billed up to date, possibly with zero new bills
    Success,
    /// Not eligible for billing
    Skipped,
    /// An error stopped billing for this subject
    Failed,
}

/// What happened to one subject during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectOutcome {
    pub subject_id: SubjectId,
    pub status: SubjectStatus,
    pub reason: Option<String>,
    /// Bills committed during this run, including before a failure
    pub bills_generated: usize,
}

impl SubjectOutcome {
    fn success(subject_id: SubjectId, bills_generated: usize) -> Self {
        Self {
            subject_id,
            status: SubjectStatus::Success,
            reason: None,
            bills_generated,
        }
    }

    fn skipped(subject_id: SubjectId, reason: &str) -> Self {
        Self {
            subject_id,
            status: SubjectStatus::Skipped,
            reason: Some(reason.to_string()),
            bills_generated: 0,
        }
    }

    fn failed(subject_id: SubjectId, error: &BillingError, bills_generated: usize) -> Self {
        Self {
            subject_id,
            status: SubjectStatus::Failed,
            reason: Some(error.to_string()),
            bills_generated,
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct BillingRunSummary {
    pub as_of: NaiveDate,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_bills: usize,
    pub message: String,
    /// One outcome per started subject, in subject order
    pub details: Vec<SubjectOutcome>,
    /// Subjects never started because the run was cancelled
    pub not_started: Vec<SubjectId>,
    pub cancelled: bool,
}

impl BillingRunSummary {
    fn from_outcomes(
        as_of: NaiveDate,
        details: Vec<SubjectOutcome>,
        not_started: Vec<SubjectId>,
    ) -> Self {
        let count = |status| details.iter().filter(|d| d.status == status).count();
        let success = count(SubjectStatus::Success);
        let failed = count(SubjectStatus::Failed);
        let skipped = count(SubjectStatus::Skipped);
        let total_bills = details.iter().map(|d| d.bills_generated).sum();
        let cancelled = !not_started.is_empty();

        let mut message = format!(
            "Generated {} bill(s): {} succeeded, {} failed, {} skipped",
            total_bills, success, failed, skipped
        );
        if cancelled {
            message.push_str(&format!("; cancelled with {} not started", not_started.len()));
        }

        Self {
            as_of,
            success,
            failed,
            skipped,
            total_bills,
            message,
            details,
            not_started,
            cancelled,
        }
    }
}

/// Generates annual service-charge bills
#[derive(Clone)]
pub struct BillingCycleGenerator {
    registry: AccountRegistry,
    poster: JournalPoster,
    store: Arc<dyn BillingStore>,
    config: BillingConfig,
    locks: Arc<DashMap<SubjectId, Arc<Mutex<()>>>>,
}

impl BillingCycleGenerator {
    /// Creates a generator
    ///
    /// # Arguments
    ///
    /// * `ledger` - Ledger the bills are posted to
    /// * `store` - Subject and bill storage sharing that ledger
    /// * `config` - Billing accounts and limits
    pub fn new(ledger: &Ledger, store: Arc<dyn BillingStore>, config: BillingConfig) -> Self {
        Self {
            registry: ledger.registry(),
            poster: ledger.poster(),
            store,
            config,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Bills every subject up to `as_of`
    ///
    /// Fails only if the subject list cannot be read; per-subject failures
    /// are reported in the summary.
    pub async fn generate_due_bills(&self, as_of: NaiveDate) -> Result<BillingRunSummary, BillingError> {
        self.generate_due_bills_until_cancelled(as_of, CancellationToken::new())
            .await
    }

    /// Bills every subject up to `as_of`, stopping early on cancellation
    ///
    /// Cancellation is observed before each subject starts. A subject that
    /// has started always runs to completion.
    #[instrument(skip(self, cancel))]
    pub async fn generate_due_bills_until_cancelled(
        &self,
        as_of: NaiveDate,
        cancel: CancellationToken,
    ) -> Result<BillingRunSummary, BillingError> {
        let subjects = self.store.list_subjects().await?;
        let ids: Vec<SubjectId> = subjects.iter().map(|s| s.id).collect();
        info!(subjects = subjects.len(), "Billing run started");

        let details: Vec<SubjectOutcome> = stream::iter(subjects)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(|subject| async move { self.process_subject(&subject, as_of).await })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let not_started = ids[details.len()..].to_vec();
        let summary = BillingRunSummary::from_outcomes(as_of, details, not_started);

        info!(
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            total_bills = summary.total_bills,
            cancelled = summary.cancelled,
            "Billing run finished"
        );
        Ok(summary)
    }

    /// Bills one subject up to `as_of`
    ///
    /// # Errors
    ///
    /// `SubjectNotFound` if the subject does not exist. Billing failures are
    /// reported in the outcome, not as an error.
    #[instrument(skip(self))]
    pub async fn generate_due_bills_for(
        &self,
        subject_id: SubjectId,
        as_of: NaiveDate,
    ) -> Result<SubjectOutcome, BillingError> {
        let subject = self
            .store
            .get_subject(subject_id)
            .await?
            .ok_or(BillingError::SubjectNotFound(subject_id))?;
        Ok(self.process_subject(&subject, as_of).await)
    }

    async fn process_subject(&self, subject: &BillingSubject, as_of: NaiveDate) -> SubjectOutcome {
        let (charge, registered_on) = match subject.eligibility() {
            Eligibility::Billable {
                charge,
                registered_on,
            } => (charge, registered_on),
            Eligibility::Inactive => {
                debug!(subject_id = %subject.id, "Skipping inactive subject");
                return SubjectOutcome::skipped(subject.id, REASON_INACTIVE);
            }
            Eligibility::MissingData => {
                debug!(subject_id = %subject.id, "Skipping subject without billing data");
                return SubjectOutcome::skipped(subject.id, REASON_MISSING_DATA);
            }
        };

        let outcome = {
            let lock = self
                .locks
                .entry(subject.id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            let _guard = lock.lock().await;

            let mut generated = 0;
            let result = self
                .bill_subject(subject, charge, registered_on, as_of, &mut generated)
                .await;
            match result {
                Ok(()) => SubjectOutcome::success(subject.id, generated),
                Err(e) => {
                    warn!(subject_id = %subject.id, error = %e, bills_generated = generated, "Billing failed for subject");
                    SubjectOutcome::failed(subject.id, &e, generated)
                }
            }
        };

        // Only the map holds the lock once no other run is waiting on it.
        self.locks
            .remove_if(&subject.id, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    async fn bill_subject(
        &self,
        subject: &BillingSubject,
        charge: Money,
        registered_on: NaiveDate,
        as_of: NaiveDate,
        generated: &mut usize,
    ) -> Result<(), BillingError> {
        self.resolve_accounts().await?;

        let first_start = match self.store.latest_bill(subject.id).await? {
            Some(bill) => bill.period_end,
            None => registered_on,
        };

        let mut period = BillingPeriod::annual(first_start)?;
        while period.is_complete_by(as_of) {
            let bill = self.issue_bill(subject, period, charge).await?;
            *generated += 1;
            info!(
                subject_id = %subject.id,
                bill_number = %bill.bill_number,
                period = %period,
                "Bill generated"
            );
            period = period.next()?;
        }

        Ok(())
    }

    async fn issue_bill(
        &self,
        subject: &BillingSubject,
        period: BillingPeriod,
        charge: Money,
    ) -> Result<Bill, BillingError> {
        let bill_id = BillId::new_v7();
        let due_date = period.end_plus_days(self.config.grace_days)?;

        let draft = JournalDraft::new(
            period.end(),
            format!("Service charge {} for {}", period, subject.name),
        )
        .with_reference(BILL_REFERENCE, *bill_id.as_uuid())
        .debit(self.config.receivable_account.as_str(), charge)
        .credit(self.config.fund_account.as_str(), charge);

        let entry = self.poster.prepare(draft).await?;
        let bill = Bill::new(bill_id, subject.id, period, charge, due_date, entry.id);

        self.store.commit_bill(&entry, &bill).await.map_err(|e| {
            if e.is_conflict() {
                BillingError::Conflict(format!(
                    "period starting {} was billed concurrently",
                    period.start()
                ))
            } else {
                BillingError::Store(e)
            }
        })?;

        Ok(bill)
    }

    async fn resolve_accounts(&self) -> Result<(), BillingError> {
        self.require_account(
            "accounts receivable",
            &self.config.receivable_account,
            AccountType::Asset,
        )
        .await?;
        self.require_account(
            "estate management fund",
            &self.config.fund_account,
            AccountType::Liability,
        )
        .await
    }

    async fn require_account(
        &self,
        role: &'static str,
        number: &str,
        expected: AccountType,
    ) -> Result<(), BillingError> {
        let missing = |reason: String| BillingError::MissingRequiredAccount {
            role,
            account_number: number.to_string(),
            reason,
        };

        let account = match self.registry.get_account(number).await {
            Ok(account) => account,
            Err(LedgerError::AccountNotFound(_)) => return Err(missing("not registered".into())),
            Err(e) => return Err(e.into()),
        };
        if !account.is_active {
            return Err(missing("inactive".into()));
        }
        if account.account_type != expected {
            return Err(missing(format!(
                "expected {} account, found {}",
                expected, account.account_type
            )));
        }
        Ok(())
    }
}
