//! Unit tests for the Money module
//!
//! Tests cover minor-unit construction, the decimal boundary, checked
//! arithmetic and currency handling.

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_from_minor_keeps_exact_units() {
        let m = Money::from_minor(5_000_000, Currency::NGN);
        assert_eq!(m.minor(), 5_000_000);
        assert_eq!(m.currency(), Currency::NGN);
    }

    #[test]
    fn test_zero() {
        let m = Money::zero(Currency::GBP);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }

    #[test]
    fn test_negative_amounts_are_allowed_for_balances() {
        let m = Money::from_minor(-250, Currency::USD);
        assert!(m.is_negative());
        assert_eq!(m.checked_abs().unwrap().minor(), 250);
    }
}

mod decimal_boundary {
    use super::*;

    #[test]
    fn test_to_decimal_uses_currency_precision() {
        assert_eq!(Money::from_minor(199, Currency::USD).to_decimal(), dec!(1.99));
        assert_eq!(Money::from_minor(199, Currency::JPY).to_decimal(), dec!(199));
    }

    #[test]
    fn test_from_decimal_whole_amount() {
        let m = Money::from_decimal(dec!(500), Currency::USD).unwrap();
        assert_eq!(m.minor(), 50_000);
    }

    #[test]
    fn test_from_decimal_negative() {
        let m = Money::from_decimal(dec!(-12.34), Currency::EUR).unwrap();
        assert_eq!(m.minor(), -1234);
    }

    #[test]
    fn test_from_decimal_never_rounds() {
        let err = Money::from_decimal(dec!(0.001), Currency::USD).unwrap_err();
        assert!(matches!(err, MoneyError::InvalidAmount(_)));
    }

    #[test]
    fn test_from_decimal_overflow() {
        let err = Money::from_decimal(dec!(99999999999999999999), Currency::USD).unwrap_err();
        assert_eq!(err, MoneyError::Overflow);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::from_minor(100, Currency::USD);
        let b = Money::from_minor(300, Currency::USD);
        assert_eq!(a.checked_sub(&b).unwrap().minor(), -200);
    }

    #[test]
    fn test_checked_sum_rejects_mixed_currencies() {
        let amounts = vec![
            Money::from_minor(100, Currency::USD),
            Money::from_minor(100, Currency::EUR),
        ];
        let result = Money::checked_sum(Currency::USD, &amounts);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_sum_of_nothing_is_zero() {
        let total = Money::checked_sum(Currency::USD, &Vec::new()).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_ordering_within_currency() {
        let small = Money::from_minor(1, Currency::USD);
        let large = Money::from_minor(2, Currency::USD);
        assert!(small < large);
    }
}
