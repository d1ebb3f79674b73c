//! Token, account, and pool identifiers with canonical pair ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PoolError;
use crate::fees::BasisPoints;

/// Opaque token identifier assigned by the chain's token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token-{}", self.0)
    }
}

/// Opaque account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account-{}", self.0)
    }
}

/// Canonically ordered token pair: `token_a < token_b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub token_a: TokenId,
    pub token_b: TokenId,
}

impl TokenPair {
    /// Build a canonical pair from tokens in any order.
    ///
    /// Returns the pair plus whether the input order was swapped, which the
    /// caller needs to derive the swap direction. Identical tokens cannot
    /// form a pool.
    pub fn new(first: TokenId, second: TokenId) -> Result<(Self, bool), PoolError> {
        if first == second {
            return Err(PoolError::IdenticalTokens { token: first });
        }
        if first < second {
            Ok((
                Self {
                    token_a: first,
                    token_b: second,
                },
                false,
            ))
        } else {
            Ok((
                Self {
                    token_a: second,
                    token_b: first,
                },
                true,
            ))
        }
    }

    pub fn contains(&self, token: TokenId) -> bool {
        self.token_a == token || self.token_b == token
    }

    /// The pair member that is not `token`, if `token` is a member at all.
    pub fn other(&self, token: TokenId) -> Option<TokenId> {
        if token == self.token_a {
            Some(self.token_b)
        } else if token == self.token_b {
            Some(self.token_a)
        } else {
            None
        }
    }
}

/// Identifies one pool: a canonical token pair at one fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub pair: TokenPair,
    pub fee_bps: BasisPoints,
}

impl PoolKey {
    pub fn new(first: TokenId, second: TokenId, fee_bps: BasisPoints) -> Result<(Self, bool), PoolError> {
        let (pair, swapped) = TokenPair::new(first, second)?;
        Ok((Self { pair, fee_bps }, swapped))
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.pair.token_a, self.pair.token_b, self.fee_bps
        )
    }
}

/// Which way value flows through a pool during a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// `token_a` in, `token_b` out.
    AtoB,
    /// `token_b` in, `token_a` out.
    BtoA,
}

impl SwapDirection {
    /// Direction for a swap entering the pool with `token_in`, given whether
    /// the (in, out) order was swapped during pair canonicalization.
    pub fn from_swapped(swapped: bool) -> Self {
        if swapped {
            SwapDirection::BtoA
        } else {
            SwapDirection::AtoB
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            SwapDirection::AtoB => SwapDirection::BtoA,
            SwapDirection::BtoA => SwapDirection::AtoB,
        }
    }
}
