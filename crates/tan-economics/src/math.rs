// crates/tan-economics/src/math.rs
//
// Fixed-point helpers. Balances are u128 wei; intermediate products such as
// `amount * acc_reward_per_share` can exceed 128 bits, so they are computed
// in 256 bits and narrowed back with an explicit overflow check.

use primitive_types::U256;
use tan_core::error::FarmError;

/// Compute `a * b / denominator`, rounding toward zero.
///
/// # Errors
/// Returns `FarmError::Overflow` if `denominator` is zero or the quotient
/// does not fit in a u128.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, FarmError> {
    if denominator == 0 {
        return Err(FarmError::Overflow(format!(
            "mul_div({}, {}, 0): division by zero",
            a, b
        )));
    }
    // Two u128 factors always fit in 256 bits.
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(FarmError::Overflow(format!(
            "mul_div({}, {}, {}) exceeds u128",
            a, b, denominator
        )));
    }
    Ok(quotient.as_u128())
}

/// Checked addition with a labelled overflow error.
pub fn add(a: u128, b: u128, what: &str) -> Result<u128, FarmError> {
    a.checked_add(b)
        .ok_or_else(|| FarmError::Overflow(format!("{} overflowed adding {} to {}", what, b, a)))
}
