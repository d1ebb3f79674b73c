//! Contract call surface.
//!
//! Every handler takes the state struct plus the call context and performs
//! validation strictly before mutation: slippage, balances, staleness, and
//! authorization are all settled before the first ledger write or external
//! transfer. An `Err` return maps to a host-level transaction rollback.

use serde::{Deserialize, Serialize};
use tracing::info;

use tidepool_amm::Pool;
use tidepool_types::{
    AccountId, Amount, BasisPoints, DexError, PoolError, PoolKey, Shares, TokenId,
};

use crate::external::{CallContext, NativeWrapper, TokenLedger};
use crate::metadata::{Metadata, MetadataStore};
use crate::router::{self, Router};
use crate::state::DexState;

/// Read-only answer of the estimate calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEstimate {
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub total_fee: Amount,
    pub pools: Vec<PoolKey>,
}

/// One-time deployment call.
pub fn initialize(
    state: &mut DexState,
    admin: AccountId,
    protocol_fee_bps: BasisPoints,
    fee_tiers: Vec<BasisPoints>,
) -> Result<(), DexError> {
    let config = MetadataStore::new(admin, protocol_fee_bps, fee_tiers)?;
    state.initialize(config)?;
    info!(%admin, protocol_fee_bps, "contract initialized");
    Ok(())
}

/// Read-only metadata query. No side effects, not even a nonce bump.
pub fn metadata(state: &DexState) -> Result<Metadata, DexError> {
    Ok(state.config()?.view(state.nonce()))
}

/// Escrow tokens into the caller's deposit account.
pub fn deposit(
    state: &mut DexState,
    ctx: &CallContext,
    tokens: &mut dyn TokenLedger,
    token: TokenId,
    amount: Amount,
) -> Result<(), DexError> {
    state.config()?;
    state.ensure_payable()?;
    if amount == 0 {
        return Err(PoolError::ZeroAmount.into());
    }
    tokens.transfer_in(token, ctx.caller, amount)?;
    state.credit_deposit(ctx.caller, token, amount)?;
    state.bump_nonce();
    Ok(())
}

/// Pay out tokens from the caller's deposit account.
pub fn withdraw(
    state: &mut DexState,
    ctx: &CallContext,
    tokens: &mut dyn TokenLedger,
    token: TokenId,
    amount: Amount,
) -> Result<(), DexError> {
    state.config()?;
    state.ensure_payable()?;
    if amount == 0 {
        return Err(PoolError::ZeroAmount.into());
    }
    state.debit_deposit(ctx.caller, token, amount)?;
    tokens.transfer_out(token, ctx.caller, amount)?;
    state.bump_nonce();
    Ok(())
}

/// Wrap native funds 1:1 and credit the wrapped token to the caller.
pub fn deposit_native(
    state: &mut DexState,
    ctx: &CallContext,
    wrapper: &mut dyn NativeWrapper,
    amount: Amount,
) -> Result<TokenId, DexError> {
    state.config()?;
    state.ensure_payable()?;
    if amount == 0 {
        return Err(PoolError::ZeroAmount.into());
    }
    wrapper.wrap(ctx.caller, amount)?;
    let token = wrapper.wrapped_token();
    state.credit_deposit(ctx.caller, token, amount)?;
    state.bump_nonce();
    Ok(token)
}

/// Burn wrapped deposit balance and release native funds to the caller.
pub fn withdraw_native(
    state: &mut DexState,
    ctx: &CallContext,
    wrapper: &mut dyn NativeWrapper,
    amount: Amount,
) -> Result<(), DexError> {
    state.config()?;
    state.ensure_payable()?;
    if amount == 0 {
        return Err(PoolError::ZeroAmount.into());
    }
    state.debit_deposit(ctx.caller, wrapper.wrapped_token(), amount)?;
    wrapper.unwrap(ctx.caller, amount)?;
    state.bump_nonce();
    Ok(())
}

/// Swap a fixed input along the best route. Returns realized (in, out).
pub fn swap_exact_in(
    state: &mut DexState,
    ctx: &CallContext,
    token_in: TokenId,
    token_out: TokenId,
    amount_in: Amount,
    min_amount_out: Amount,
    max_hops: Option<u8>,
) -> Result<(Amount, Amount), DexError> {
    let config = state.config()?;
    let (admin, protocol_fee_bps) = (config.admin(), config.protocol_fee_bps());
    state.ensure_payable()?;

    let available = state.deposit_balance(ctx.caller, token_in);
    if available < amount_in {
        return Err(PoolError::InsufficientBalance {
            required: amount_in,
            available,
        }
        .into());
    }

    let plan = Router::new(&state.ledger).plan_exact_in(
        token_in,
        token_out,
        amount_in,
        min_amount_out,
        max_hops,
    )?;
    let outcome = router::commit(&mut state.ledger, &plan, protocol_fee_bps)?;

    state.debit_deposit(ctx.caller, token_in, outcome.amount_in)?;
    state.credit_deposit(ctx.caller, token_out, outcome.amount_out)?;
    for (token, cut) in &outcome.protocol_cuts {
        state.credit_deposit(admin, *token, *cut)?;
    }
    state.bump_nonce();

    info!(
        caller = %ctx.caller,
        %token_in,
        %token_out,
        amount_in = outcome.amount_in,
        amount_out = outcome.amount_out,
        hops = plan.hops.len(),
        "swap executed"
    );
    Ok((outcome.amount_in, outcome.amount_out))
}

/// Swap for a fixed output along the cheapest route. Returns (in, out).
pub fn swap_exact_out(
    state: &mut DexState,
    ctx: &CallContext,
    token_in: TokenId,
    token_out: TokenId,
    amount_out: Amount,
    max_amount_in: Amount,
    max_hops: Option<u8>,
) -> Result<(Amount, Amount), DexError> {
    let config = state.config()?;
    let (admin, protocol_fee_bps) = (config.admin(), config.protocol_fee_bps());
    state.ensure_payable()?;

    let plan = Router::new(&state.ledger).plan_exact_out(
        token_in,
        token_out,
        amount_out,
        max_amount_in,
        max_hops,
    )?;

    let required = plan.amount_in();
    let available = state.deposit_balance(ctx.caller, token_in);
    if available < required {
        return Err(PoolError::InsufficientBalance {
            required,
            available,
        }
        .into());
    }

    let outcome = router::commit(&mut state.ledger, &plan, protocol_fee_bps)?;

    state.debit_deposit(ctx.caller, token_in, outcome.amount_in)?;
    state.credit_deposit(ctx.caller, token_out, outcome.amount_out)?;
    for (token, cut) in &outcome.protocol_cuts {
        state.credit_deposit(admin, *token, *cut)?;
    }
    state.bump_nonce();

    info!(
        caller = %ctx.caller,
        %token_in,
        %token_out,
        amount_in = outcome.amount_in,
        amount_out = outcome.amount_out,
        hops = plan.hops.len(),
        "swap executed"
    );
    Ok((outcome.amount_in, outcome.amount_out))
}

/// Pure quote for a fixed input. Mutates nothing, serves while suspended.
pub fn estimate_swap_exact_in(
    state: &DexState,
    token_in: TokenId,
    token_out: TokenId,
    amount_in: Amount,
    max_hops: Option<u8>,
) -> Result<SwapEstimate, DexError> {
    state.config()?;
    let plan =
        Router::new(&state.ledger).plan_exact_in(token_in, token_out, amount_in, 0, max_hops)?;
    Ok(estimate_from_plan(&plan))
}

/// Pure quote for a fixed output.
pub fn estimate_swap_exact_out(
    state: &DexState,
    token_in: TokenId,
    token_out: TokenId,
    amount_out: Amount,
    max_hops: Option<u8>,
) -> Result<SwapEstimate, DexError> {
    state.config()?;
    let plan = Router::new(&state.ledger).plan_exact_out(
        token_in,
        token_out,
        amount_out,
        Amount::MAX,
        max_hops,
    )?;
    Ok(estimate_from_plan(&plan))
}

fn estimate_from_plan(plan: &router::RoutePlan) -> SwapEstimate {
    SwapEstimate {
        amount_in: plan.amount_in(),
        amount_out: plan.amount_out(),
        total_fee: plan.total_fee(),
        pools: plan.hops.iter().map(|hop| hop.pool).collect(),
    }
}

/// Provide liquidity from the caller's deposit balances.
pub fn add_liquidity(
    state: &mut DexState,
    ctx: &CallContext,
    token_a: TokenId,
    token_b: TokenId,
    fee_bps: BasisPoints,
    amount_a: Amount,
    amount_b: Amount,
) -> Result<Shares, DexError> {
    let config = state.config()?;
    if !config.is_registered_tier(fee_bps) {
        return Err(PoolError::UnregisteredFeeTier { fee_bps }.into());
    }
    state.ensure_payable()?;

    let (key, swapped) = PoolKey::new(token_a, token_b, fee_bps)?;
    // caller amounts follow their token order; the ledger wants canonical
    let (canon_a, canon_b) = if swapped {
        (amount_b, amount_a)
    } else {
        (amount_a, amount_b)
    };

    for (token, amount) in [(key.pair.token_a, canon_a), (key.pair.token_b, canon_b)] {
        let available = state.deposit_balance(ctx.caller, token);
        if available < amount {
            return Err(PoolError::InsufficientBalance {
                required: amount,
                available,
            }
            .into());
        }
    }

    let minted = state
        .ledger
        .add_liquidity(&key, ctx.caller, canon_a, canon_b)?;
    state.debit_deposit(ctx.caller, key.pair.token_a, canon_a)?;
    state.debit_deposit(ctx.caller, key.pair.token_b, canon_b)?;
    state.bump_nonce();

    info!(caller = %ctx.caller, pool = %key, minted, "liquidity provided");
    Ok(minted)
}

/// Burn pool shares back into the caller's deposit balances.
pub fn remove_liquidity(
    state: &mut DexState,
    ctx: &CallContext,
    token_a: TokenId,
    token_b: TokenId,
    fee_bps: BasisPoints,
    shares: Shares,
) -> Result<(Amount, Amount), DexError> {
    state.config()?;
    state.ensure_payable()?;

    let (key, swapped) = PoolKey::new(token_a, token_b, fee_bps)?;
    let (canon_a, canon_b) = state.ledger.remove_liquidity(&key, ctx.caller, shares)?;
    state.credit_deposit(ctx.caller, key.pair.token_a, canon_a)?;
    state.credit_deposit(ctx.caller, key.pair.token_b, canon_b)?;
    state.bump_nonce();

    info!(caller = %ctx.caller, pool = %key, shares, "liquidity removed");
    // answer in the caller's token order
    if swapped {
        Ok((canon_b, canon_a))
    } else {
        Ok((canon_a, canon_b))
    }
}

/// Read-only pool state lookup.
pub fn get_pool_info(
    state: &DexState,
    token_a: TokenId,
    token_b: TokenId,
    fee_bps: BasisPoints,
) -> Result<Pool, DexError> {
    state.config()?;
    let (key, _) = PoolKey::new(token_a, token_b, fee_bps)?;
    state
        .ledger
        .get_pool(&key)
        .cloned()
        .ok_or_else(|| PoolError::UnknownPool { pool: key }.into())
}

/// Read-only deposit balances of one account.
pub fn get_deposits(state: &DexState, account: AccountId) -> Vec<(TokenId, Amount)> {
    state.deposits_of(account)
}

/// Admin circuit breaker: reject payable calls until resumed.
pub fn suspend_payable_api(state: &mut DexState, ctx: &CallContext) -> Result<(), DexError> {
    state.ensure_admin(ctx.caller)?;
    state.set_suspended(true);
    state.bump_nonce();
    info!(caller = %ctx.caller, "payable API suspended");
    Ok(())
}

pub fn resume_payable_api(state: &mut DexState, ctx: &CallContext) -> Result<(), DexError> {
    state.ensure_admin(ctx.caller)?;
    state.set_suspended(false);
    state.bump_nonce();
    info!(caller = %ctx.caller, "payable API resumed");
    Ok(())
}
