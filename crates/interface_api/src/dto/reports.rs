//! Report DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use domain_ledger::{AccountType, TrialBalance, TrialBalanceRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceResponse {
    pub as_of: NaiveDate,
    pub currency: String,
    pub accounts: Vec<TrialBalanceAccount>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_debits: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_credits: Decimal,
    pub balanced: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceAccount {
    pub account_id: Uuid,
    pub account_number: String,
    pub account_name: String,
    pub account_type: AccountType,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub debit_balance: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub credit_balance: Decimal,
}

impl From<TrialBalanceRow> for TrialBalanceAccount {
    fn from(row: TrialBalanceRow) -> Self {
        Self {
            account_id: *row.account_id.as_uuid(),
            account_number: row.account_number,
            account_name: row.account_name,
            account_type: row.account_type,
            debit_balance: row.debit.to_decimal(),
            credit_balance: row.credit.to_decimal(),
        }
    }
}

impl From<TrialBalance> for TrialBalanceResponse {
    fn from(report: TrialBalance) -> Self {
        Self {
            as_of: report.as_of,
            currency: report.total_debits.currency().code().to_string(),
            total_debits: report.total_debits.to_decimal(),
            total_credits: report.total_credits.to_decimal(),
            balanced: report.balanced,
            accounts: report.rows.into_iter().map(TrialBalanceAccount::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{Currency, Money};
    use domain_ledger::Account;

    #[test]
    fn test_large_totals_serialize_exactly() {
        // 2^53 + 1 minor units; an f64 would round this to ...992
        let amount = Money::from_minor(9_007_199_254_740_993, Currency::USD);
        let account = Account::new("1000", "Cash", AccountType::Asset);
        let report = TrialBalance {
            as_of: Utc::now().date_naive(),
            rows: vec![TrialBalanceRow {
                account_id: account.id,
                account_number: account.number,
                account_name: account.name,
                account_type: account.account_type,
                debit: amount,
                credit: Money::zero(Currency::USD),
            }],
            total_debits: amount,
            total_credits: amount,
            balanced: true,
        };

        let json = serde_json::to_string(&TrialBalanceResponse::from(report)).unwrap();
        assert!(json.contains(r#""totalDebits":90071992547409.93"#));
        assert!(json.contains(r#""debitBalance":90071992547409.93"#));
        assert!(json.contains(r#""creditBalance":0.00"#));
    }
}
