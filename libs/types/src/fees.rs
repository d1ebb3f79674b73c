//! Fee tiers in basis points and their validation rules.
//!
//! A basis point is 1/10_000. Fee tiers are configured once at contract
//! initialization and are immutable afterwards; the protocol fee is the
//! fraction of each swap fee skimmed for the protocol rather than the LPs.

use crate::errors::AuthError;

pub type BasisPoints = u16;

/// All basis-point fractions are expressed over this divisor.
pub const BASIS_POINT_DIVISOR: BasisPoints = 10_000;

pub const MIN_PROTOCOL_FEE_BPS: BasisPoints = 1;
pub const MAX_PROTOCOL_FEE_BPS: BasisPoints = BASIS_POINT_DIVISOR / 2;

/// Validate the protocol fee fraction supplied at initialization.
pub fn validate_protocol_fee(protocol_fee_bps: BasisPoints) -> Result<BasisPoints, AuthError> {
    if (MIN_PROTOCOL_FEE_BPS..=MAX_PROTOCOL_FEE_BPS).contains(&protocol_fee_bps) {
        Ok(protocol_fee_bps)
    } else {
        Err(AuthError::IllegalFee {
            fee_bps: protocol_fee_bps,
        })
    }
}

/// Validate the fee-tier list supplied at initialization.
///
/// Tiers must be non-empty, strictly ascending (which also rules out
/// duplicates), and each below 100%. The ordering requirement keeps the
/// metadata view deterministic and lets the router's tie-break prefer lower
/// tiers by scanning in order.
pub fn validate_fee_tiers(tiers: &[BasisPoints]) -> Result<(), AuthError> {
    if tiers.is_empty() {
        return Err(AuthError::NoFeeTiers);
    }
    for window in tiers.windows(2) {
        if window[1] <= window[0] {
            return Err(AuthError::UnorderedFeeTiers);
        }
    }
    if let Some(&highest) = tiers.last() {
        if highest >= BASIS_POINT_DIVISOR {
            return Err(AuthError::IllegalFee { fee_bps: highest });
        }
    }
    Ok(())
}
