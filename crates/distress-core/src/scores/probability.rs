//! Logistic transform from a linear log-odds score to a probability.

use rust_decimal::Decimal;

use crate::math::checked_exp;
use crate::types::Rate;

/// `e^x / (1 + e^x)`.
///
/// Built from `e^|x|` for either sign, so the positive and negative tails
/// are computed with the same precision. Once `e^|x|` leaves the Decimal
/// range the result saturates at 0 or 1.
pub fn probability_of_bankruptcy(linear_score: Decimal) -> Rate {
    let negative = linear_score.is_sign_negative();
    let saturated = if negative { Decimal::ZERO } else { Decimal::ONE };
    let Some(growth) = checked_exp(linear_score.abs()) else {
        return saturated;
    };
    let Some(denominator) = growth.checked_add(Decimal::ONE) else {
        return saturated;
    };
    if negative {
        Decimal::ONE / denominator
    } else {
        growth / denominator
    }
}
