//! Constant-product swap quoting with exact integer rounding.
//!
//! Quotes are pure computations over a pool snapshot; nothing here mutates
//! state. Rounding always favors the pool: fee and required input round up,
//! output rounds down. That asymmetry is what keeps the invariant product
//! non-decreasing when the ledger commits a quote.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tidepool_math::{bps_ratio_decimal, checked_add, checked_sub, mul_div_ceil, mul_div_floor};
use tidepool_types::{
    Amount, BasisPoints, MathError, PoolError, SwapDirection, BASIS_POINT_DIVISOR,
};

use crate::pool::Pool;

/// One computed swap. Ephemeral: discarded unless the router commits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: Amount,
    pub amount_out: Amount,
    /// Fee charged, denominated in the input token.
    pub fee_amount: Amount,
    /// Price impact versus the spot price, as a percentage.
    pub price_impact: Decimal,
    pub direction: SwapDirection,
}

/// The pricing formula, isolated so concentrated-liquidity math can replace
/// the constant product without touching the router or the ledger.
pub trait CurveQuote {
    /// Output for a fixed input, net of the pool's fee tier.
    fn quote_exact_in(
        &self,
        pool: &Pool,
        direction: SwapDirection,
        amount_in: Amount,
    ) -> Result<SwapQuote, PoolError>;

    /// Required input for a fixed output, gross of the pool's fee tier.
    fn quote_exact_out(
        &self,
        pool: &Pool,
        direction: SwapDirection,
        amount_out: Amount,
    ) -> Result<SwapQuote, PoolError>;
}

/// Classic `x·y = k` pricing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProduct;

impl CurveQuote for ConstantProduct {
    fn quote_exact_in(
        &self,
        pool: &Pool,
        direction: SwapDirection,
        amount_in: Amount,
    ) -> Result<SwapQuote, PoolError> {
        if amount_in == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if !pool.has_liquidity() {
            return Err(PoolError::InsufficientLiquidity { pool: pool.key });
        }
        let (reserve_in, reserve_out) = pool.reserves(direction);
        let divisor = Amount::from(BASIS_POINT_DIVISOR);

        let fee_amount = mul_div_ceil(amount_in, Amount::from(pool.key.fee_bps), divisor)?;
        let net_in = checked_sub(amount_in, fee_amount)?;
        let denominator = checked_add(reserve_in, net_in)?;
        let amount_out = mul_div_floor(net_in, reserve_out, denominator)?;

        let price_impact = price_impact_exact_in(amount_in, amount_out, reserve_in, reserve_out)?;

        Ok(SwapQuote {
            amount_in,
            amount_out,
            fee_amount,
            price_impact,
            direction,
        })
    }

    fn quote_exact_out(
        &self,
        pool: &Pool,
        direction: SwapDirection,
        amount_out: Amount,
    ) -> Result<SwapQuote, PoolError> {
        if amount_out == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if !pool.has_liquidity() {
            return Err(PoolError::InsufficientLiquidity { pool: pool.key });
        }
        let (reserve_in, reserve_out) = pool.reserves(direction);
        if amount_out >= reserve_out {
            return Err(PoolError::InsufficientLiquidity { pool: pool.key });
        }
        let divisor = Amount::from(BASIS_POINT_DIVISOR);

        let remaining_out = checked_sub(reserve_out, amount_out)?;
        let net_in = mul_div_ceil(reserve_in, amount_out, remaining_out)?;
        // gross up for the fee taken from the input side
        let fee_complement = checked_sub(divisor, Amount::from(pool.key.fee_bps))?;
        let amount_in = mul_div_ceil(net_in, divisor, fee_complement)?;
        let fee_amount = checked_sub(amount_in, net_in)?;

        let price_impact = price_impact_exact_out(amount_in, amount_out, reserve_in, reserve_out)?;

        Ok(SwapQuote {
            amount_in,
            amount_out,
            fee_amount,
            price_impact,
            direction,
        })
    }
}

/// Impact of an exact-in trade: shortfall of realized output versus output
/// at the untouched spot price, in whole basis points.
fn price_impact_exact_in(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Decimal, MathError> {
    let spot_out = mul_div_floor(amount_in, reserve_out, reserve_in)?;
    if spot_out == 0 {
        return Ok(Decimal::ZERO);
    }
    // realized output never beats spot
    let shortfall = checked_sub(spot_out, amount_out)?;
    let impact_bps = mul_div_floor(shortfall, Amount::from(BASIS_POINT_DIVISOR), spot_out)?;
    to_impact_decimal(impact_bps)
}

/// Impact of an exact-out trade: excess of required input versus input at
/// the untouched spot price, in whole basis points.
fn price_impact_exact_out(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Decimal, MathError> {
    if amount_in == 0 {
        return Ok(Decimal::ZERO);
    }
    let spot_in = mul_div_ceil(amount_out, reserve_in, reserve_out)?;
    let excess = amount_in.saturating_sub(spot_in);
    let impact_bps = mul_div_floor(excess, Amount::from(BASIS_POINT_DIVISOR), amount_in)?;
    to_impact_decimal(impact_bps)
}

fn to_impact_decimal(impact_bps: Amount) -> Result<Decimal, MathError> {
    let bps = BasisPoints::try_from(impact_bps).map_err(|_| MathError::Overflow)?;
    Ok(bps_ratio_decimal(bps))
}
