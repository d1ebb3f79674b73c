//! Checked amount arithmetic and fixed-point helpers over [`U256`].

use rust_decimal::Decimal;
use tidepool_types::{Amount, BasisPoints, MathError};

use crate::wide::U256;

/// `(a · b) / d` rounded toward zero, with a 256-bit intermediate.
pub fn mul_div_floor(a: Amount, b: Amount, d: Amount) -> Result<Amount, MathError> {
    let (quotient, _rem) = U256::full_mul(a, b).div_rem(d)?;
    quotient.to_u128()
}

/// `(a · b) / d` rounded away from zero.
pub fn mul_div_ceil(a: Amount, b: Amount, d: Amount) -> Result<Amount, MathError> {
    let (quotient, rem) = U256::full_mul(a, b).div_rem(d)?;
    let floor = quotient.to_u128()?;
    if rem == 0 {
        Ok(floor)
    } else {
        floor.checked_add(1).ok_or(MathError::Overflow)
    }
}

pub fn checked_add(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Reduce an amount to display precision.
///
/// `Decimal` carries a 96-bit mantissa; amounts beyond it cannot be
/// represented exactly and are reported as precision loss rather than
/// rounded.
pub fn amount_to_decimal(amount: Amount) -> Result<Decimal, MathError> {
    let value = i128::try_from(amount).map_err(|_| MathError::PrecisionLoss)?;
    Decimal::try_from_i128_with_scale(value, 0).map_err(|_| MathError::PrecisionLoss)
}

/// A basis-point count as a percentage `Decimal` (150 bps → 1.50).
pub fn bps_ratio_decimal(bps: BasisPoints) -> Decimal {
    Decimal::new(i64::from(bps), 2)
}
