//! Money types with exact integer arithmetic
//!
//! Amounts are held as `i64` counts of the currency's minor unit (cents for
//! USD, whole yen for JPY). Decimal values only appear at the boundary, when
//! parsing request input or formatting for display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    INR,
    NGN,
    KES,
    ZAR,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::INR => "₹",
            Currency::NGN => "₦",
            Currency::KES => "KSh",
            Currency::ZAR => "R",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
            Currency::NGN => "NGN",
            Currency::KES => "KES",
            Currency::ZAR => "ZAR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "INR" => Ok(Currency::INR),
            "NGN" => Ok(Currency::NGN),
            "KES" => Ok(Currency::KES),
            "ZAR" => Ok(Currency::ZAR),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// The amount is a signed count of minor units. Balances can be negative;
/// journal line amounts are validated to be strictly positive by the poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Converts a decimal major-unit amount (e.g. `500.25`) into minor units.
    ///
    /// Fails if the value carries more precision than the currency allows or
    /// does not fit in an `i64`; nothing is rounded.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        let dp = currency.decimal_places();
        let normalized = amount.normalize();
        if normalized.scale() > dp {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} decimal places for {}",
                amount, dp, currency
            )));
        }
        let scaled = amount
            .checked_mul(Decimal::from(10_i64.pow(dp)))
            .ok_or(MoneyError::Overflow)?;
        let minor = scaled.trunc().to_i64().ok_or(MoneyError::Overflow)?;
        Ok(Self { minor, currency })
    }

    /// Returns the amount in minor units
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the amount as a decimal in major units, at currency precision
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.decimal_places())
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the absolute value; `i64::MIN` minor units overflow
    pub fn checked_abs(&self) -> Result<Money, MoneyError> {
        let minor = self.minor.checked_abs().ok_or(MoneyError::Overflow)?;
        Ok(Self::from_minor(minor, self.currency))
    }

    /// Checked negation
    pub fn checked_neg(&self) -> Result<Money, MoneyError> {
        let minor = self.minor.checked_neg().ok_or(MoneyError::Overflow)?;
        Ok(Self::from_minor(minor, self.currency))
    }

    /// Checked addition that fails on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let minor = self.minor.checked_add(other.minor).ok_or(MoneyError::Overflow)?;
        Ok(Self::from_minor(minor, self.currency))
    }

    /// Checked subtraction that fails on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let minor = self.minor.checked_sub(other.minor).ok_or(MoneyError::Overflow)?;
        Ok(Self::from_minor(minor, self.currency))
    }

    /// Sums an iterator of amounts, failing on mismatch or overflow
    pub fn checked_sum<'a, I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency.symbol(), self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch or overflow in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch or overflow in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        self.checked_neg().expect("Overflow in Money::neg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::USD);
        assert_eq!(m.minor(), 10050);
        assert_eq!(m.to_decimal(), dec!(100.50));
    }

    #[test]
    fn test_money_from_decimal_exact() {
        let m = Money::from_decimal(dec!(500.25), Currency::USD).unwrap();
        assert_eq!(m.minor(), 50025);

        let yen = Money::from_decimal(dec!(1200), Currency::JPY).unwrap();
        assert_eq!(yen.minor(), 1200);
    }

    #[test]
    fn test_money_from_decimal_rejects_excess_precision() {
        let result = Money::from_decimal(dec!(1.005), Currency::USD);
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));

        let yen = Money::from_decimal(dec!(10.5), Currency::JPY);
        assert!(matches!(yen, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_trailing_zeros_are_not_excess_precision() {
        let m = Money::from_decimal(dec!(12.5000), Currency::USD).unwrap();
        assert_eq!(m.minor(), 1250);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor(10000, Currency::USD);
        let b = Money::from_minor(5000, Currency::USD);

        assert_eq!((a + b).minor(), 15000);
        assert_eq!((a - b).minor(), 5000);
        assert_eq!((b - a).minor(), -5000);
        assert_eq!((-a).minor(), -10000);
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::from_minor(100, Currency::USD);
        let eur = Money::from_minor(100, Currency::EUR);

        let result = usd.checked_add(&eur);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Money::from_minor(i64::MAX, Currency::USD);
        let one = Money::from_minor(1, Currency::USD);
        assert_eq!(big.checked_add(&one), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_abs_and_neg_of_minimum_overflow() {
        let min = Money::from_minor(i64::MIN, Currency::USD);
        assert_eq!(min.checked_abs(), Err(MoneyError::Overflow));
        assert_eq!(min.checked_neg(), Err(MoneyError::Overflow));
        assert_eq!(Money::from_minor(-250, Currency::USD).checked_abs().unwrap().minor(), 250);
    }

    #[test]
    fn test_amounts_order_within_currency() {
        let mut amounts = vec![
            Money::from_minor(300, Currency::USD),
            Money::from_minor(-5, Currency::USD),
            Money::from_minor(120, Currency::USD),
        ];
        amounts.sort();
        let minors: Vec<i64> = amounts.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![-5, 120, 300]);
        assert!(Currency::USD < Currency::EUR);
    }

    #[test]
    fn test_checked_sum() {
        let amounts = vec![
            Money::from_minor(100, Currency::USD),
            Money::from_minor(250, Currency::USD),
        ];
        let total = Money::checked_sum(Currency::USD, &amounts).unwrap();
        assert_eq!(total.minor(), 350);
    }

    #[test]
    fn test_display() {
        let m = Money::from_minor(123456, Currency::USD);
        assert_eq!(m.to_string(), "$ 1234.56");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("ngn".parse::<Currency>().unwrap(), Currency::NGN);
        assert!("XYZ".parse::<Currency>().is_err());
    }
}
