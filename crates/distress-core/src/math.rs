//! Decimal helpers shared by the scoring models.
//!
//! Every fault is surfaced as a [`DistressError`]; nothing here clamps or
//! substitutes a value.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::{DistressError, DistressResult};

pub fn safe_divide(
    numerator: Decimal,
    denominator: Decimal,
    context: &str,
) -> DistressResult<Decimal> {
    if denominator.is_zero() {
        return Err(DistressError::DivisionByZero {
            context: context.to_string(),
        });
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| DistressError::DomainError {
            context: context.to_string(),
            reason: "quotient overflows Decimal range".into(),
        })
}

fn overflow(context: &str) -> DistressError {
    DistressError::DomainError {
        context: context.to_string(),
        reason: "result overflows Decimal range".into(),
    }
}

pub fn checked_product(a: Decimal, b: Decimal, context: &str) -> DistressResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

pub fn checked_sum(a: Decimal, b: Decimal, context: &str) -> DistressResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn checked_difference(a: Decimal, b: Decimal, context: &str) -> DistressResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

/// Adds `values` onto `start`, failing on the first overflow.
pub fn checked_total(
    start: Decimal,
    values: impl IntoIterator<Item = Decimal>,
    context: &str,
) -> DistressResult<Decimal> {
    values
        .into_iter()
        .try_fold(start, |acc, v| checked_sum(acc, v, context))
}

const LN_2: Decimal = dec!(0.6931471805599453094172321215);

/// Series terms below this no longer move a 28-digit Decimal.
const SERIES_EPSILON: Decimal = dec!(0.0000000000000000000000000001);

/// Natural logarithm, defined only for strictly positive values.
///
/// Reduces `x` into [0.5, 2] by powers of two, then sums
/// ln(v) = 2 * sum_k z^(2k+1) / (2k+1) with z = (v-1)/(v+1).
pub fn ln(x: Decimal, context: &str) -> DistressResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(DistressError::DomainError {
            context: context.to_string(),
            reason: format!("logarithm of non-positive value {x}"),
        });
    }
    let two = dec!(2);
    let mut val = x;
    let mut adjust = Decimal::ZERO;
    while val > two {
        val /= two;
        adjust += LN_2;
    }
    while val < dec!(0.5) {
        val *= two;
        adjust -= LN_2;
    }
    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1u32..60 {
        term *= z2;
        if term.abs() < SERIES_EPSILON {
            break;
        }
        sum += term / Decimal::from(2 * k + 1);
    }
    Ok(two * sum + adjust)
}

/// e^x, or `None` when the result exceeds the Decimal range.
///
/// Halves `x` until it is at most 1, sums the Taylor series, then squares
/// back. Negative arguments use e^x = 1 / e^-x and underflow to zero.
pub fn checked_exp(x: Decimal) -> Option<Decimal> {
    if x.is_zero() {
        return Some(Decimal::ONE);
    }
    if x.is_sign_negative() {
        return Some(match checked_exp(-x) {
            Some(growth) => Decimal::ONE / growth,
            None => Decimal::ZERO,
        });
    }
    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced > Decimal::ONE {
        reduced /= dec!(2);
        halvings += 1;
    }
    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for k in 1u32..=40 {
        term = term * reduced / Decimal::from(k);
        if term < SERIES_EPSILON {
            break;
        }
        sum += term;
    }
    for _ in 0..halvings {
        sum = sum.checked_mul(sum)?;
    }
    Some(sum)
}

/// Fixed-point rendering used in the audit fields of score breakdowns.
/// Rounds half to even before padding, so `0.99996` at 4dp reads `1.0000`.
pub fn fmt_dp(value: Decimal, dp: usize) -> String {
    let rounded = value.round_dp_with_strategy(dp as u32, RoundingStrategy::MidpointNearestEven);
    format!("{:.*}", dp, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_divide() {
        assert_eq!(safe_divide(dec!(1), dec!(4), "q").unwrap(), dec!(0.25));
    }

    #[test]
    fn test_safe_divide_zero_denominator() {
        match safe_divide(dec!(1), Decimal::ZERO, "NWC / TA").unwrap_err() {
            DistressError::DivisionByZero { context } => assert_eq!(context, "NWC / TA"),
            other => panic!("Expected DivisionByZero, got {other:?}"),
        }
    }

    #[test]
    fn test_ln_of_one_is_zero() {
        assert_eq!(ln(Decimal::ONE, "ln").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_ln_accuracy() {
        let v = ln(dec!(10), "ln").unwrap();
        assert!((v - dec!(2.302585093)).abs() < dec!(0.000001), "ln(10) = {v}");
    }

    #[test]
    fn test_ln_non_positive_is_domain_error() {
        assert!(matches!(
            ln(Decimal::ZERO, "ln"),
            Err(DistressError::DomainError { .. })
        ));
        assert!(matches!(
            ln(dec!(-3), "ln"),
            Err(DistressError::DomainError { .. })
        ));
    }

    #[test]
    fn test_ln_small_and_large() {
        let small = ln(dec!(0.001), "ln").unwrap();
        assert!((small + dec!(6.907755279)).abs() < dec!(0.000001), "ln(0.001) = {small}");
        let large = ln(dec!(1_000_000_000), "ln").unwrap();
        assert!((large - dec!(20.723265837)).abs() < dec!(0.000001), "ln(1e9) = {large}");
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(checked_exp(Decimal::ZERO), Some(Decimal::ONE));
        let e = checked_exp(Decimal::ONE).unwrap();
        assert!((e - dec!(2.718281828459045)).abs() < dec!(0.000000000001), "e = {e}");
        let e30 = checked_exp(dec!(30)).unwrap();
        assert!((e30 / dec!(10686474581524.46) - Decimal::ONE).abs() < dec!(0.000000001));
        let inv = checked_exp(dec!(-2)).unwrap();
        assert!((inv - dec!(0.135335283)).abs() < dec!(0.000000001), "e^-2 = {inv}");
    }

    #[test]
    fn test_exp_overflow_and_underflow() {
        assert_eq!(checked_exp(dec!(1000)), None);
        assert_eq!(checked_exp(dec!(-1000)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_ln_exp_inverse() {
        for x in [dec!(0.25), dec!(3), dec!(42.5)] {
            let back = checked_exp(ln(x, "ln").unwrap()).unwrap();
            assert!((back - x).abs() < dec!(0.0000001), "x = {x}, back = {back}");
        }
    }

    #[test]
    fn test_fmt_dp_pads() {
        assert_eq!(fmt_dp(dec!(0.1), 4), "0.1000");
        assert_eq!(fmt_dp(dec!(1500), 2), "1500.00");
    }

    #[test]
    fn test_fmt_dp_rounds_instead_of_truncating() {
        assert_eq!(fmt_dp(dec!(0.12345678), 4), "0.1235");
        assert_eq!(fmt_dp(dec!(0.99996), 4), "1.0000");
        assert_eq!(fmt_dp(dec!(1234.567), 2), "1234.57");
    }

    #[test]
    fn test_checked_arithmetic_overflow_is_domain_error() {
        let huge = Decimal::MAX;
        match checked_product(huge, dec!(2), "X1 weight").unwrap_err() {
            DistressError::DomainError { context, .. } => assert_eq!(context, "X1 weight"),
            other => panic!("Expected DomainError, got {other:?}"),
        }
        assert!(matches!(
            checked_sum(huge, Decimal::ONE, "sum"),
            Err(DistressError::DomainError { .. })
        ));
        assert!(matches!(
            checked_difference(Decimal::MIN, Decimal::ONE, "diff"),
            Err(DistressError::DomainError { .. })
        ));
        assert!(matches!(
            checked_total(Decimal::ZERO, [huge, huge], "total"),
            Err(DistressError::DomainError { .. })
        ));
        assert_eq!(
            checked_total(dec!(1), [dec!(2), dec!(3)], "total").unwrap(),
            dec!(6)
        );
    }
}
