//! Multi-hop route search, evaluation, and atomic commit.
//!
//! Per call the router runs `Start → CandidateDiscovery → PathEvaluation →
//! Commit | Abort`. Discovery and evaluation are fused into one bounded
//! depth-first search over the token graph: paths are simple (no token
//! revisited), capped at [`MAX_ROUTE_HOPS`] edges, and quoted hop-by-hop
//! against pool snapshots as they are walked. Since a simple path touches
//! each pool at most once, snapshot quoting is exact.
//!
//! Commit re-validates every hop's pool sequence number before the first
//! mutation; any mismatch aborts with `StaleRoute` and the host rollback
//! leaves reserves at their pre-call values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tidepool_amm::{ConstantProduct, CurveQuote, PoolLedger, SwapQuote};
use tidepool_math::{checked_sub, mul_div_floor};
use tidepool_types::{
    Amount, BasisPoints, DexError, PoolError, PoolKey, RouterError, Sequence, SwapDirection,
    TokenId, BASIS_POINT_DIVISOR,
};

/// Hard cap on route length. An unbounded search is disallowed: the hop
/// budget is what keeps the call's computation cost pre-declared.
pub const MAX_ROUTE_HOPS: u8 = 3;

/// One hop of a route plan, with the quote it was evaluated at and the pool
/// sequence number observed during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteHop {
    pub pool: PoolKey,
    pub direction: SwapDirection,
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub sequence: Sequence,
    pub quote: SwapQuote,
}

/// An evaluated route. Owned by the in-flight call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub hops: Vec<RouteHop>,
}

impl RoutePlan {
    pub fn amount_in(&self) -> Amount {
        self.hops.first().map_or(0, |hop| hop.quote.amount_in)
    }

    pub fn amount_out(&self) -> Amount {
        self.hops.last().map_or(0, |hop| hop.quote.amount_out)
    }

    pub fn total_fee(&self) -> Amount {
        self.hops
            .iter()
            .map(|hop| hop.quote.fee_amount)
            .sum()
    }

    fn total_fee_bps(&self) -> u32 {
        self.hops
            .iter()
            .map(|hop| u32::from(hop.pool.fee_bps))
            .sum()
    }
}

/// Result of committing a route: realized amounts plus the protocol-fee
/// cuts (per input token) the caller must credit to the admin.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub protocol_cuts: Vec<(TokenId, Amount)>,
}

/// Route planner over a ledger snapshot. Holds only borrows; pure reads.
pub struct Router<'a> {
    ledger: &'a PoolLedger,
    engine: ConstantProduct,
}

impl<'a> Router<'a> {
    pub fn new(ledger: &'a PoolLedger) -> Self {
        Self {
            ledger,
            engine: ConstantProduct,
        }
    }

    /// Best route for a fixed input, subject to the caller's slippage bound.
    pub fn plan_exact_in(
        &self,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: Amount,
        min_amount_out: Amount,
        max_hops: Option<u8>,
    ) -> Result<RoutePlan, DexError> {
        let hop_budget = validate_hop_budget(max_hops)?;
        if token_in == token_out {
            return Err(PoolError::IdenticalTokens { token: token_in }.into());
        }
        if amount_in == 0 {
            return Err(PoolError::ZeroAmount.into());
        }

        let mut best: Option<RoutePlan> = None;
        let mut visited = vec![token_in];
        let mut hops = Vec::new();
        self.search_exact_in(
            token_in,
            token_out,
            amount_in,
            hop_budget,
            &mut visited,
            &mut hops,
            &mut best,
        );

        let plan = best.ok_or(RouterError::NoRouteFound {
            token_in,
            token_out,
            max_hops: hop_budget,
        })?;
        debug!(
            hops = plan.hops.len(),
            amount_in,
            amount_out = plan.amount_out(),
            "route selected"
        );
        if plan.amount_out() < min_amount_out {
            return Err(RouterError::SlippageExceeded.into());
        }
        Ok(plan)
    }

    /// Cheapest route for a fixed output, subject to the caller's input cap.
    pub fn plan_exact_out(
        &self,
        token_in: TokenId,
        token_out: TokenId,
        amount_out: Amount,
        max_amount_in: Amount,
        max_hops: Option<u8>,
    ) -> Result<RoutePlan, DexError> {
        let hop_budget = validate_hop_budget(max_hops)?;
        if token_in == token_out {
            return Err(PoolError::IdenticalTokens { token: token_in }.into());
        }
        if amount_out == 0 {
            return Err(PoolError::ZeroAmount.into());
        }

        let mut best: Option<RoutePlan> = None;
        let mut visited = vec![token_out];
        let mut hops = Vec::new();
        self.search_exact_out(
            token_in,
            token_out,
            amount_out,
            hop_budget,
            &mut visited,
            &mut hops,
            &mut best,
        );

        let plan = best.ok_or(RouterError::NoRouteFound {
            token_in,
            token_out,
            max_hops: hop_budget,
        })?;
        debug!(
            hops = plan.hops.len(),
            amount_in = plan.amount_in(),
            amount_out,
            "route selected"
        );
        if plan.amount_in() > max_amount_in {
            return Err(RouterError::SlippageExceeded.into());
        }
        Ok(plan)
    }

    /// Forward walk: each hop feeds its output into the next hop's input.
    #[allow(clippy::too_many_arguments)]
    fn search_exact_in(
        &self,
        current: TokenId,
        target: TokenId,
        amount: Amount,
        remaining: u8,
        visited: &mut Vec<TokenId>,
        hops: &mut Vec<RouteHop>,
        best: &mut Option<RoutePlan>,
    ) {
        if remaining == 0 {
            return;
        }
        for pool in self.ledger.pools() {
            if !pool.key.pair.contains(current) || !pool.has_liquidity() {
                continue;
            }
            let next = match pool.key.pair.other(current) {
                Some(next) if !visited.contains(&next) => next,
                _ => continue,
            };
            let direction =
                SwapDirection::from_swapped(pool.key.pair.token_a != current);
            let quote = match self.engine.quote_exact_in(pool, direction, amount) {
                Ok(quote) => quote,
                // an unquotable pool just prunes this branch
                Err(_) => continue,
            };
            hops.push(RouteHop {
                pool: pool.key,
                direction,
                token_in: current,
                token_out: next,
                sequence: pool.sequence,
                quote,
            });
            if next == target {
                consider_exact_in(best, RoutePlan { hops: hops.clone() });
            } else {
                visited.push(next);
                self.search_exact_in(
                    next,
                    target,
                    quote.amount_out,
                    remaining - 1,
                    visited,
                    hops,
                    best,
                );
                visited.pop();
            }
            hops.pop();
        }
    }

    /// Backward walk from the output token: each hop's required input is
    /// the previous hop's required output. `hops` is kept in reverse order
    /// and flipped when a complete path is found.
    #[allow(clippy::too_many_arguments)]
    fn search_exact_out(
        &self,
        source: TokenId,
        current: TokenId,
        amount_out: Amount,
        remaining: u8,
        visited: &mut Vec<TokenId>,
        hops: &mut Vec<RouteHop>,
        best: &mut Option<RoutePlan>,
    ) {
        if remaining == 0 {
            return;
        }
        for pool in self.ledger.pools() {
            if !pool.key.pair.contains(current) || !pool.has_liquidity() {
                continue;
            }
            let prev = match pool.key.pair.other(current) {
                Some(prev) if !visited.contains(&prev) => prev,
                _ => continue,
            };
            // the swap runs prev → current
            let direction = SwapDirection::from_swapped(pool.key.pair.token_a != prev);
            let quote = match self.engine.quote_exact_out(pool, direction, amount_out) {
                Ok(quote) => quote,
                Err(_) => continue,
            };
            hops.push(RouteHop {
                pool: pool.key,
                direction,
                token_in: prev,
                token_out: current,
                sequence: pool.sequence,
                quote,
            });
            if prev == source {
                let mut ordered = hops.clone();
                ordered.reverse();
                consider_exact_out(best, RoutePlan { hops: ordered });
            } else {
                visited.push(prev);
                self.search_exact_out(
                    source,
                    prev,
                    quote.amount_in,
                    remaining - 1,
                    visited,
                    hops,
                    best,
                );
                visited.pop();
            }
            hops.pop();
        }
    }
}

fn validate_hop_budget(max_hops: Option<u8>) -> Result<u8, RouterError> {
    let requested = max_hops.unwrap_or(MAX_ROUTE_HOPS);
    if requested == 0 || requested > MAX_ROUTE_HOPS {
        return Err(RouterError::HopLimitExceeded {
            requested,
            limit: MAX_ROUTE_HOPS,
        });
    }
    Ok(requested)
}

/// Exact-in selection: highest output, then fewest hops, then lowest
/// combined fee tier. Remaining ties keep the first candidate found, which
/// is deterministic because pool iteration is ordered.
fn consider_exact_in(best: &mut Option<RoutePlan>, candidate: RoutePlan) {
    let replace = match best {
        None => true,
        Some(current) => {
            candidate.amount_out() > current.amount_out()
                || (candidate.amount_out() == current.amount_out()
                    && (candidate.hops.len() < current.hops.len()
                        || (candidate.hops.len() == current.hops.len()
                            && candidate.total_fee_bps() < current.total_fee_bps())))
        }
    };
    if replace {
        debug!(
            hops = candidate.hops.len(),
            amount_out = candidate.amount_out(),
            "path evaluated as new best"
        );
        *best = Some(candidate);
    }
}

/// Exact-out selection: lowest input, then fewest hops, then lowest
/// combined fee tier.
fn consider_exact_out(best: &mut Option<RoutePlan>, candidate: RoutePlan) {
    let replace = match best {
        None => true,
        Some(current) => {
            candidate.amount_in() < current.amount_in()
                || (candidate.amount_in() == current.amount_in()
                    && (candidate.hops.len() < current.hops.len()
                        || (candidate.hops.len() == current.hops.len()
                            && candidate.total_fee_bps() < current.total_fee_bps())))
        }
    };
    if replace {
        *best = Some(candidate);
    }
}

/// Commit a plan against the ledger.
///
/// Staleness is checked for every hop before the first mutation. The
/// protocol fraction of each hop's fee is withheld from the reserve credit
/// and reported back for crediting to the admin.
pub fn commit(
    ledger: &mut PoolLedger,
    plan: &RoutePlan,
    protocol_fee_bps: BasisPoints,
) -> Result<CommitOutcome, DexError> {
    for hop in &plan.hops {
        let pool = ledger
            .get_pool(&hop.pool)
            .ok_or(RouterError::StaleRoute { pool: hop.pool })?;
        if pool.sequence != hop.sequence {
            return Err(RouterError::StaleRoute { pool: hop.pool }.into());
        }
    }

    let mut protocol_cuts = Vec::new();
    for hop in &plan.hops {
        let cut = mul_div_floor(
            hop.quote.fee_amount,
            Amount::from(protocol_fee_bps),
            Amount::from(BASIS_POINT_DIVISOR),
        )
        .map_err(PoolError::Math)?;
        let reserve_credit = checked_sub(hop.quote.amount_in, cut).map_err(PoolError::Math)?;
        ledger.apply_swap(
            &hop.pool,
            hop.direction,
            reserve_credit,
            hop.quote.amount_out,
            hop.quote.fee_amount,
        )?;
        if cut > 0 {
            protocol_cuts.push((hop.token_in, cut));
        }
    }

    Ok(CommitOutcome {
        amount_in: plan.amount_in(),
        amount_out: plan.amount_out(),
        protocol_cuts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_types::AccountId;

    const LP: AccountId = AccountId(99);

    fn key(a: u64, b: u64, fee: BasisPoints) -> PoolKey {
        PoolKey::new(TokenId(a), TokenId(b), fee).unwrap().0
    }

    /// Two direct tiers (500 deep, 1200 shallow) plus a 1→3→2 detour.
    fn ledger() -> PoolLedger {
        let mut ledger = PoolLedger::new();
        ledger
            .add_liquidity(&key(1, 2, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        ledger
            .add_liquidity(&key(1, 2, 1200), LP, 10_000, 10_000)
            .unwrap();
        ledger
            .add_liquidity(&key(1, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        ledger
            .add_liquidity(&key(2, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        ledger
    }

    #[test]
    fn direct_route_beats_detour() {
        let ledger = ledger();
        let plan = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, 0, None)
            .unwrap();
        assert_eq!(plan.hops.len(), 1);
        assert_eq!(plan.hops[0].pool, key(1, 2, 500));
        // one 500 bps hop: fee 5% + slippage, two hops would pay twice
        assert!(plan.amount_out() > 900);
    }

    #[test]
    fn multi_hop_found_when_no_direct_pool() {
        let mut ledger = PoolLedger::new();
        ledger
            .add_liquidity(&key(1, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        ledger
            .add_liquidity(&key(2, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();

        let plan = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, 0, None)
            .unwrap();
        assert_eq!(plan.hops.len(), 2);
        assert_eq!(plan.hops[0].token_in, TokenId(1));
        assert_eq!(plan.hops[1].token_out, TokenId(2));
    }

    #[test]
    fn hop_cap_is_honored() {
        let mut ledger = PoolLedger::new();
        ledger
            .add_liquidity(&key(1, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        ledger
            .add_liquidity(&key(2, 3, 500), LP, 1_000_000, 1_000_000)
            .unwrap();

        let err = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, 0, Some(1))
            .unwrap_err();
        assert!(matches!(
            err,
            DexError::Router(RouterError::NoRouteFound { max_hops: 1, .. })
        ));
    }

    #[test]
    fn oversized_hop_request_rejected() {
        let ledger = ledger();
        let err = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, 0, Some(4))
            .unwrap_err();
        assert!(matches!(
            err,
            DexError::Router(RouterError::HopLimitExceeded {
                requested: 4,
                limit: MAX_ROUTE_HOPS
            })
        ));
    }

    #[test]
    fn no_route_to_unknown_token() {
        let ledger = ledger();
        let err = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(9), 1_000, 0, None)
            .unwrap_err();
        assert!(matches!(
            err,
            DexError::Router(RouterError::NoRouteFound { .. })
        ));
    }

    #[test]
    fn slippage_bound_enforced() {
        let ledger = ledger();
        let err = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, Amount::MAX, None)
            .unwrap_err();
        assert!(matches!(
            err,
            DexError::Router(RouterError::SlippageExceeded)
        ));
    }

    #[test]
    fn stale_plan_aborts_commit_without_mutation() {
        let mut ledger = ledger();
        let plan = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 1_000, 0, None)
            .unwrap();

        // reserves move underneath the plan (simulated reentrancy)
        ledger
            .add_liquidity(&key(1, 2, 500), LP, 1_000_000, 1_000_000)
            .unwrap();
        let snapshot = ledger.clone();

        let err = commit(&mut ledger, &plan, 1_000).unwrap_err();
        assert!(matches!(
            err,
            DexError::Router(RouterError::StaleRoute { .. })
        ));
        // staleness is detected before any hop is applied
        assert_eq!(
            ledger.get_pool(&key(1, 2, 500)),
            snapshot.get_pool(&key(1, 2, 500))
        );
    }

    #[test]
    fn commit_reports_protocol_cut() {
        let mut ledger = ledger();
        let plan = Router::new(&ledger)
            .plan_exact_in(TokenId(1), TokenId(2), 100_000, 0, None)
            .unwrap();
        // 500 bps tier on 100_000 in → fee 5_000; 1_000 bps protocol → 500
        let outcome = commit(&mut ledger, &plan, 1_000).unwrap();
        assert_eq!(outcome.protocol_cuts, vec![(TokenId(1), 500)]);
        assert_eq!(outcome.amount_in, 100_000);
    }

    #[test]
    fn exact_out_plans_cover_requested_output() {
        let mut ledger = ledger();
        let plan = Router::new(&ledger)
            .plan_exact_out(TokenId(1), TokenId(2), 10_000, Amount::MAX, None)
            .unwrap();
        assert_eq!(plan.amount_out(), 10_000);
        assert!(plan.amount_in() > 10_000); // fee plus slippage

        let outcome = commit(&mut ledger, &plan, 1_000).unwrap();
        assert_eq!(outcome.amount_out, 10_000);
    }
}
