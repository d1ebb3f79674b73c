//! Pool ledger: reserve state, liquidity shares, fee accrual.
//!
//! The ledger is the sole writer of pool state. Quoting reads snapshots;
//! every mutation lands here, re-verifies the constant-function invariant,
//! and bumps the pool's sequence number so in-flight route plans can detect
//! staleness at commit time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use tidepool_math::{checked_add, checked_sub, mul_div_floor, U256};
use tidepool_types::{
    AccountId, Amount, PoolError, PoolKey, Sequence, Shares, SwapDirection, TokenId, TokenPair,
};

/// Smallest share issue accepted for the first deposit into a pool.
///
/// Keeps the share granularity fine enough that later pro-rata mints do not
/// truncate to zero for reasonable deposit sizes.
pub const MIN_INITIAL_SHARES: Shares = 1_000;

/// One constant-function pool: a canonical token pair at one fee tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub key: PoolKey,
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub total_shares: Shares,
    /// Lifetime fee totals per side, for reporting only; fees themselves
    /// compound into the reserves.
    pub acc_fees_a: Amount,
    pub acc_fees_b: Amount,
    pub sequence: Sequence,
}

impl Pool {
    fn new(key: PoolKey) -> Self {
        Self {
            key,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            acc_fees_a: 0,
            acc_fees_b: 0,
            sequence: 0,
        }
    }

    /// Reserves as (in-side, out-side) for the given direction.
    pub fn reserves(&self, direction: SwapDirection) -> (Amount, Amount) {
        match direction {
            SwapDirection::AtoB => (self.reserve_a, self.reserve_b),
            SwapDirection::BtoA => (self.reserve_b, self.reserve_a),
        }
    }

    /// The constant-function invariant value `reserve_a · reserve_b`.
    pub fn invariant(&self) -> U256 {
        U256::full_mul(self.reserve_a, self.reserve_b)
    }

    pub fn has_liquidity(&self) -> bool {
        self.reserve_a > 0 && self.reserve_b > 0
    }
}

/// A liquidity provider's stake in one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub owner: AccountId,
    pub pool: PoolKey,
    pub shares: Shares,
}

/// All pools and positions. Maps are ordered so iteration — and therefore
/// router candidate discovery — is deterministic across validators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolLedger {
    pools: BTreeMap<PoolKey, Pool>,
    positions: BTreeMap<(AccountId, PoolKey), Shares>,
}

impl PoolLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_pool(&self, key: &PoolKey) -> Option<&Pool> {
        self.pools.get(key)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    /// Pools for one token pair across all fee tiers, ascending by tier.
    pub fn pools_for_pair(&self, pair: TokenPair) -> impl Iterator<Item = &Pool> {
        self.pools
            .values()
            .filter(move |pool| pool.key.pair == pair)
    }

    /// Every token that appears in at least one pool.
    pub fn tokens(&self) -> BTreeSet<TokenId> {
        let mut tokens = BTreeSet::new();
        for key in self.pools.keys() {
            tokens.insert(key.pair.token_a);
            tokens.insert(key.pair.token_b);
        }
        tokens
    }

    pub fn position(&self, owner: AccountId, key: &PoolKey) -> Shares {
        self.positions.get(&(owner, *key)).copied().unwrap_or(0)
    }

    pub fn positions_of(&self, owner: AccountId) -> impl Iterator<Item = Position> + '_ {
        self.positions
            .iter()
            .filter(move |((account, _), _)| *account == owner)
            .map(|((owner, pool), shares)| Position {
                owner: *owner,
                pool: *pool,
                shares: *shares,
            })
    }

    /// Commit one swap hop against a pool.
    ///
    /// `reserve_credit` is the amount entering the in-side reserve (input
    /// net of any protocol skim), `amount_out` leaves the out-side, and
    /// `fee_amount` is recorded in the fee totals. The constant-function
    /// product must not decrease, checked in 256-bit arithmetic.
    pub fn apply_swap(
        &mut self,
        key: &PoolKey,
        direction: SwapDirection,
        reserve_credit: Amount,
        amount_out: Amount,
        fee_amount: Amount,
    ) -> Result<Sequence, PoolError> {
        let pool = self
            .pools
            .get_mut(key)
            .ok_or(PoolError::UnknownPool { pool: *key })?;

        let (reserve_in, reserve_out) = pool.reserves(direction);
        let new_in = checked_add(reserve_in, reserve_credit)?;
        let new_out = checked_sub(reserve_out, amount_out)
            .map_err(|_| PoolError::InsufficientLiquidity { pool: *key })?;

        let before = U256::full_mul(reserve_in, reserve_out);
        let after = U256::full_mul(new_in, new_out);
        if after < before {
            return Err(PoolError::InvariantViolation { pool: *key });
        }

        // All fallible arithmetic is done before the first field write, so an
        // error leaves the pool untouched.
        match direction {
            SwapDirection::AtoB => {
                let new_fees = checked_add(pool.acc_fees_a, fee_amount)?;
                pool.reserve_a = new_in;
                pool.reserve_b = new_out;
                pool.acc_fees_a = new_fees;
            }
            SwapDirection::BtoA => {
                let new_fees = checked_add(pool.acc_fees_b, fee_amount)?;
                pool.reserve_b = new_in;
                pool.reserve_a = new_out;
                pool.acc_fees_b = new_fees;
            }
        }
        pool.sequence += 1;

        debug!(
            pool = %key,
            ?direction,
            reserve_credit,
            amount_out,
            fee_amount,
            sequence = pool.sequence,
            "swap committed"
        );
        Ok(pool.sequence)
    }

    /// Deposit liquidity, minting shares.
    ///
    /// The first deposit mints `⌊√(a·b)⌋` shares and must clear the dust
    /// minimum; later deposits mint pro-rata against the lower of the two
    /// contribution ratios, so an unbalanced deposit donates its excess to
    /// the pool. Pools are created on first deposit and never deleted.
    pub fn add_liquidity(
        &mut self,
        key: &PoolKey,
        owner: AccountId,
        amount_a: Amount,
        amount_b: Amount,
    ) -> Result<Shares, PoolError> {
        if amount_a == 0 || amount_b == 0 {
            return Err(PoolError::ZeroAmount);
        }

        // Validate and compute against a snapshot first; the ledger is only
        // touched once nothing can fail.
        let snapshot = self.pools.get(key);
        let live_shares = snapshot.map_or(0, |pool| pool.total_shares);

        let minted = if live_shares == 0 {
            let minted = U256::full_mul(amount_a, amount_b).isqrt();
            if minted < MIN_INITIAL_SHARES {
                return Err(PoolError::DustDeposit);
            }
            minted
        } else {
            // live_shares > 0 implies both reserves are non-zero
            let pool = snapshot.ok_or(PoolError::UnknownPool { pool: *key })?;
            let by_a = mul_div_floor(amount_a, pool.total_shares, pool.reserve_a)?;
            let by_b = mul_div_floor(amount_b, pool.total_shares, pool.reserve_b)?;
            let minted = by_a.min(by_b);
            if minted == 0 {
                return Err(PoolError::DustDeposit);
            }
            minted
        };

        let (new_a, new_b, new_total) = match snapshot {
            Some(pool) => (
                checked_add(pool.reserve_a, amount_a)?,
                checked_add(pool.reserve_b, amount_b)?,
                checked_add(pool.total_shares, minted)?,
            ),
            None => (amount_a, amount_b, minted),
        };
        let new_position = checked_add(self.position(owner, key), minted)?;

        let pool = self.pools.entry(*key).or_insert_with(|| Pool::new(*key));
        pool.reserve_a = new_a;
        pool.reserve_b = new_b;
        pool.total_shares = new_total;
        pool.sequence += 1;
        self.positions.insert((owner, *key), new_position);

        debug!(pool = %key, %owner, amount_a, amount_b, minted, "liquidity added");
        Ok(minted)
    }

    /// Burn shares, paying out the pro-rata floor of each reserve.
    pub fn remove_liquidity(
        &mut self,
        key: &PoolKey,
        owner: AccountId,
        shares: Shares,
    ) -> Result<(Amount, Amount), PoolError> {
        if shares == 0 {
            return Err(PoolError::ZeroAmount);
        }
        let pool = self
            .pools
            .get_mut(key)
            .ok_or(PoolError::UnknownPool { pool: *key })?;

        let held = self.positions.get(&(owner, *key)).copied().unwrap_or(0);
        if shares > held {
            return Err(PoolError::InsufficientShares {
                requested: shares,
                available: held,
            });
        }

        let amount_a = mul_div_floor(shares, pool.reserve_a, pool.total_shares)?;
        let amount_b = mul_div_floor(shares, pool.reserve_b, pool.total_shares)?;

        // floor pro-rata payouts never exceed the reserves they come from
        let new_a = checked_sub(pool.reserve_a, amount_a)?;
        let new_b = checked_sub(pool.reserve_b, amount_b)?;
        let new_total = checked_sub(pool.total_shares, shares)?;
        pool.reserve_a = new_a;
        pool.reserve_b = new_b;
        pool.total_shares = new_total;
        pool.sequence += 1;

        let remaining = held - shares;
        if remaining == 0 {
            self.positions.remove(&(owner, *key));
        } else {
            self.positions.insert((owner, *key), remaining);
        }

        debug!(pool = %key, %owner, shares, amount_a, amount_b, "liquidity removed");
        Ok((amount_a, amount_b))
    }
}
