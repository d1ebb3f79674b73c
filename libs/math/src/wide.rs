//! 256-bit unsigned integer built from two `u128` limbs.
//!
//! Wide enough to hold any product of two amounts, so intermediate
//! computations never overflow before the final reduction. Division and
//! square root are bit-serial: slower than limb-wise schoolbook division but
//! branch-predictable, allocation-free, and trivially identical across hosts.

use tidepool_types::MathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct U256 {
    pub hi: u128,
    pub lo: u128,
}

impl U256 {
    pub const ZERO: Self = Self { hi: 0, lo: 0 };

    pub fn from_u128(value: u128) -> Self {
        Self { hi: 0, lo: value }
    }

    /// Full 128×128→256 widening multiply. Cannot overflow.
    pub fn full_mul(a: u128, b: u128) -> Self {
        const MASK: u128 = (1u128 << 64) - 1;
        let (a_hi, a_lo) = (a >> 64, a & MASK);
        let (b_hi, b_lo) = (b >> 64, b & MASK);

        let ll = a_lo * b_lo;
        let lh = a_lo * b_hi;
        let hl = a_hi * b_lo;
        let hh = a_hi * b_hi;

        // Accumulate the two middle partial products into the 64..192 band.
        let (mid, carry1) = lh.overflowing_add(hl);
        let mid_hi = (mid >> 64) + if carry1 { 1u128 << 64 } else { 0 };
        let mid_lo = mid << 64;

        let (lo, carry2) = ll.overflowing_add(mid_lo);
        let hi = hh + mid_hi + u128::from(carry2);

        Self { hi, lo }
    }

    pub fn is_zero(&self) -> bool {
        self.hi == 0 && self.lo == 0
    }

    fn bit(&self, index: u32) -> u128 {
        if index >= 128 {
            (self.hi >> (index - 128)) & 1
        } else {
            (self.lo >> index) & 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index >= 128 {
            self.hi |= 1u128 << (index - 128);
        } else {
            self.lo |= 1u128 << index;
        }
    }

    /// Divide by a `u128`, returning 256-bit quotient and the remainder.
    ///
    /// Bit-serial long division. The running remainder stays below the
    /// divisor, so the only subtlety is the shift carrying into bit 128:
    /// when it does, the true remainder exceeds the divisor by construction
    /// and the wrapping subtraction yields the correct reduced value.
    pub fn div_rem(self, divisor: u128) -> Result<(Self, u128), MathError> {
        if divisor == 0 {
            return Err(MathError::DivisionByZero);
        }
        let mut quotient = Self::ZERO;
        let mut rem: u128 = 0;
        for index in (0..256).rev() {
            let carry = rem >> 127;
            rem = (rem << 1) | self.bit(index);
            if carry == 1 || rem >= divisor {
                rem = rem.wrapping_sub(divisor);
                quotient.set_bit(index);
            }
        }
        Ok((quotient, rem))
    }

    /// Reduce to `u128`, failing if the high limb is occupied.
    pub fn to_u128(self) -> Result<u128, MathError> {
        if self.hi != 0 {
            Err(MathError::Overflow)
        } else {
            Ok(self.lo)
        }
    }

    /// Integer square root: the largest `x` with `x·x ≤ self`.
    ///
    /// The root of a 256-bit value always fits in 128 bits, so the result
    /// needs no overflow check. Bit-descent from the top keeps every step a
    /// single widening multiply and compare.
    pub fn isqrt(self) -> u128 {
        let mut root: u128 = 0;
        for index in (0..128).rev() {
            let candidate = root | (1u128 << index);
            if Self::full_mul(candidate, candidate) <= self {
                root = candidate;
            }
        }
        root
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.hi, self.lo).cmp(&(other.hi, other.lo))
    }
}
