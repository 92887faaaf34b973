//! Test Data Builders
//!
//! Builders that fill every field with a sensible default so tests only
//! spell out what they care about.

use chrono::NaiveDate;
use fake::faker::address::en::BuildingNumber;
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::Money;
use domain_billing::BillingSubject;
use domain_ledger::{Account, AccountType};

use crate::fixtures::{MoneyFixtures, REGISTRATION_DATE};

/// Builder for billing subjects
///
/// Defaults to an active, fully billable subject with a random name.
pub struct TestSubjectBuilder {
    name: String,
    unit: Option<String>,
    active: bool,
    charge: Option<Money>,
    registered_on: Option<NaiveDate>,
}

impl Default for TestSubjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSubjectBuilder {
    pub fn new() -> Self {
        Self {
            name: Name().fake(),
            unit: Some(BuildingNumber().fake()),
            active: true,
            charge: Some(MoneyFixtures::annual_charge()),
            registered_on: Some(*REGISTRATION_DATE),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_charge(mut self, charge: Money) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn without_charge(mut self) -> Self {
        self.charge = None;
        self
    }

    pub fn registered_on(mut self, date: NaiveDate) -> Self {
        self.registered_on = Some(date);
        self
    }

    pub fn without_registration(mut self) -> Self {
        self.registered_on = None;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> BillingSubject {
        let mut subject = BillingSubject::new(self.name);
        subject.unit = self.unit;
        subject.is_active = self.active;
        subject.service_charge = self.charge;
        subject.registration_start_date = self.registered_on;
        subject
    }
}

/// Builder for chart-of-accounts entries
pub struct TestAccountBuilder {
    number: String,
    name: String,
    account_type: AccountType,
    active: bool,
}

impl TestAccountBuilder {
    pub fn new(number: impl Into<String>, account_type: AccountType) -> Self {
        let number = number.into();
        Self {
            name: format!("Test account {}", number),
            number,
            account_type,
            active: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Account {
        let mut account = Account::new(self.number, self.name, self.account_type);
        account.is_active = self.active;
        account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::Eligibility;

    #[test]
    fn test_default_subject_is_billable() {
        let subject = TestSubjectBuilder::new().build();
        assert!(matches!(subject.eligibility(), Eligibility::Billable { .. }));
        assert!(!subject.name.is_empty());
    }

    #[test]
    fn test_subject_without_charge() {
        let subject = TestSubjectBuilder::new().without_charge().build();
        assert_eq!(subject.eligibility(), Eligibility::MissingData);
    }

    #[test]
    fn test_inactive_account() {
        let account = TestAccountBuilder::new("1200", AccountType::Asset).inactive().build();
        assert!(!account.is_active);
        assert_eq!(account.number, "1200");
    }
}
