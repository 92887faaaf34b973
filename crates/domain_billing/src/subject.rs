//! Billing subjects
//!
//! A subject is anything billed an annual service charge, typically a
//! resident or a unit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, SubjectId};

/// Whether a subject can be billed, and with what
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Billable {
        charge: Money,
        registered_on: NaiveDate,
    },
    Inactive,
    MissingData,
}

/// A billed entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSubject {
    /// Unique identifier
    pub id: SubjectId,
    /// Display name
    pub name: String,
    /// Unit or house reference
    pub unit: Option<String>,
    /// Inactive subjects are never billed
    pub is_active: bool,
    /// Annual service charge; billing-ineligible when absent
    pub service_charge: Option<Money>,
    /// Start of the first billing period; billing-ineligible when absent
    pub registration_start_date: Option<NaiveDate>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl BillingSubject {
    /// Creates an active subject with no billing data yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubjectId::new_v7(),
            name: name.into(),
            unit: None,
            is_active: true,
            service_charge: None,
            registration_start_date: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the annual service charge
    pub fn with_service_charge(mut self, charge: Money) -> Self {
        self.service_charge = Some(charge);
        self
    }

    /// Sets the registration start date
    pub fn registered_on(mut self, date: NaiveDate) -> Self {
        self.registration_start_date = Some(date);
        self
    }

    /// Sets the unit reference
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Marks the subject inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Classifies the subject for a billing run
    ///
    /// A zero or negative charge counts as missing data.
    pub fn eligibility(&self) -> Eligibility {
        if !self.is_active {
            return Eligibility::Inactive;
        }
        match (self.service_charge, self.registration_start_date) {
            (Some(charge), Some(registered_on)) if charge.is_positive() => Eligibility::Billable {
                charge,
                registered_on,
            },
            _ => Eligibility::MissingData,
        }
    }
}
