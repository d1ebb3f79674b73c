//! End-to-end scenarios over the full contract surface.

use anyhow::Result;

use tidepool_contract::{handlers, router, CallContext, Router, MAX_ROUTE_HOPS};
use tidepool_e2e_tests::{World, ADMIN, ALICE, BOB, DEPLOY_TIERS};
use tidepool_math::U256;
use tidepool_types::{Amount, DexError, RouterError, TokenId};

const WETH: TokenId = TokenId(10);
const USDC: TokenId = TokenId(11);
const DAI: TokenId = TokenId(12);

#[test]
fn deployment_metadata_echoes_tier_list() -> Result<()> {
    let world = World::deploy(&DEPLOY_TIERS);
    let meta = handlers::metadata(&world.state)?;

    assert_eq!(meta.admin, ADMIN);
    assert_eq!(meta.nonce, 0);
    assert_eq!(meta.fee_tiers, DEPLOY_TIERS.to_vec());
    assert_eq!(meta.fee_divisor, 10_000);
    Ok(())
}

#[test]
fn nonce_counts_mutating_calls_only() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.fund_deposit(ALICE, WETH, 1_000);
    assert_eq!(handlers::metadata(&world.state)?.nonce, 1);

    // a second metadata read does not move the nonce
    assert_eq!(handlers::metadata(&world.state)?.nonce, 1);
    Ok(())
}

#[test]
fn slippage_bound_rejects_and_preserves_reserves() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 1_000_000, 1_000_000);
    world.fund_deposit(BOB, WETH, 1_000);

    let quote = handlers::estimate_swap_exact_in(&world.state, WETH, USDC, 1_000, None)?;
    let before = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;

    // demand one unit more than the pool can actually pay
    let err = handlers::swap_exact_in(
        &mut world.state,
        &CallContext::new(BOB),
        WETH,
        USDC,
        1_000,
        quote.amount_out + 1,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DexError::Router(RouterError::SlippageExceeded)
    ));

    let after = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;
    assert_eq!(before, after);
    assert_eq!(world.state.deposit_balance(BOB, WETH), 1_000);
    Ok(())
}

#[test]
fn committed_swaps_never_shrink_the_invariant() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 2_000_000, 3_000_000);
    world.fund_deposit(BOB, WETH, 500_000);
    world.fund_deposit(BOB, USDC, 500_000);

    let ctx = CallContext::new(BOB);
    for (token_in, token_out, amount) in [
        (WETH, USDC, 100_000u128),
        (USDC, WETH, 50_000),
        (WETH, USDC, 1),
        (USDC, WETH, 250_000),
    ] {
        let before = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;
        handlers::swap_exact_in(
            &mut world.state,
            &ctx,
            token_in,
            token_out,
            amount,
            0,
            None,
        )?;
        let after = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;
        assert!(
            U256::full_mul(after.reserve_a, after.reserve_b)
                >= U256::full_mul(before.reserve_a, before.reserve_b),
            "invariant shrank on {token_in}→{token_out}"
        );
    }
    Ok(())
}

#[test]
fn zero_fee_round_trip_never_profits() -> Result<()> {
    // a zero tier is legal when registered at deployment
    let mut world = World::deploy(&[0, 500]);
    world.seed_pool(ALICE, WETH, USDC, 0, 1_000_000, 1_000_000);
    world.fund_deposit(BOB, WETH, 10_000);

    let ctx = CallContext::new(BOB);
    let (_, received) =
        handlers::swap_exact_in(&mut world.state, &ctx, WETH, USDC, 10_000, 0, None)?;
    let (_, back) =
        handlers::swap_exact_in(&mut world.state, &ctx, USDC, WETH, received, 0, None)?;
    assert!(back <= 10_000);
    Ok(())
}

#[test]
fn router_respects_hop_budget() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    // only WETH→DAI→USDC exists; no direct pool
    world.seed_pool(ALICE, WETH, DAI, 500, 1_000_000, 1_000_000);
    world.seed_pool(ALICE, DAI, USDC, 500, 1_000_000, 1_000_000);
    world.fund_deposit(BOB, WETH, 10_000);

    let ctx = CallContext::new(BOB);
    let err = handlers::swap_exact_in(
        &mut world.state,
        &ctx,
        WETH,
        USDC,
        10_000,
        0,
        Some(1),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DexError::Router(RouterError::NoRouteFound { max_hops: 1, .. })
    ));

    let (_, received) =
        handlers::swap_exact_in(&mut world.state, &ctx, WETH, USDC, 10_000, 0, Some(2))?;
    assert!(received > 0);

    let err = handlers::swap_exact_in(
        &mut world.state,
        &ctx,
        WETH,
        USDC,
        10,
        0,
        Some(MAX_ROUTE_HOPS + 1),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DexError::Router(RouterError::HopLimitExceeded { .. })
    ));
    Ok(())
}

#[test]
fn router_picks_the_cheaper_tier() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    // identical depth at two tiers: the 500 bps pool must win
    world.seed_pool(ALICE, WETH, USDC, 500, 1_000_000, 1_000_000);
    world.seed_pool(ALICE, WETH, USDC, 1200, 1_000_000, 1_000_000);

    let quote = handlers::estimate_swap_exact_in(&world.state, WETH, USDC, 10_000, None)?;
    assert_eq!(quote.pools.len(), 1);
    assert_eq!(quote.pools[0].fee_bps, 500);
    Ok(())
}

#[test]
fn stale_route_aborts_before_any_mutation() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 1_000_000, 1_000_000);

    // plan first, then mutate the pool underneath (simulated reentrancy)
    let plan = Router::new(&world.state.ledger).plan_exact_in(WETH, USDC, 10_000, 0, None)?;
    world.seed_pool(ALICE, WETH, USDC, 500, 100_000, 100_000);
    let before = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;

    let err = router::commit(&mut world.state.ledger, &plan, 1_000).unwrap_err();
    assert!(matches!(
        err,
        DexError::Router(RouterError::StaleRoute { .. })
    ));
    let after = handlers::get_pool_info(&world.state, WETH, USDC, 500)?;
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn exact_out_swap_delivers_requested_amount() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 5_000_000, 5_000_000);
    world.fund_deposit(BOB, WETH, 1_000_000);

    let ctx = CallContext::new(BOB);
    let (paid, received) = handlers::swap_exact_out(
        &mut world.state,
        &ctx,
        WETH,
        USDC,
        100_000,
        Amount::MAX,
        None,
    )?;
    assert_eq!(received, 100_000);
    assert!(paid > 100_000); // fee plus price movement
    assert_eq!(world.state.deposit_balance(BOB, USDC), 100_000);
    Ok(())
}

#[test]
fn protocol_fee_accrues_to_admin_deposits() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 5_000_000, 5_000_000);
    world.fund_deposit(BOB, WETH, 100_000);

    handlers::swap_exact_in(
        &mut world.state,
        &CallContext::new(BOB),
        WETH,
        USDC,
        100_000,
        0,
        None,
    )?;
    // 500 bps fee on 100_000 is 5_000; 10% protocol fraction of that
    assert_eq!(world.state.deposit_balance(ADMIN, WETH), 500);

    let deposits = handlers::get_deposits(&world.state, ADMIN);
    assert_eq!(deposits, vec![(WETH, 500)]);
    Ok(())
}

#[test]
fn full_withdraw_returns_chain_tokens() -> Result<()> {
    let mut world = World::deploy(&DEPLOY_TIERS);
    world.seed_pool(ALICE, WETH, USDC, 500, 1_000_000, 2_000_000);
    world.fund_deposit(BOB, WETH, 50_000);

    let ctx = CallContext::new(BOB);
    let (_, received) =
        handlers::swap_exact_in(&mut world.state, &ctx, WETH, USDC, 50_000, 0, None)?;

    handlers::withdraw(&mut world.state, &ctx, &mut world.tokens, USDC, received)?;
    assert_eq!(world.tokens.balance(BOB, USDC), received);
    assert_eq!(world.state.deposit_balance(BOB, USDC), 0);
    Ok(())
}
