//! Error taxonomy for the contract core.
//!
//! Four families, all fatal to the current call: arithmetic, pool ledger,
//! router, and authorization. The host's transaction semantics roll back all
//! state on any `Err`, so no variant carries recovery hints — only enough
//! context to diagnose the rejected call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fees::BasisPoints;
use crate::identifiers::{PoolKey, TokenId};
use crate::{Amount, Shares};

/// Deterministic arithmetic failures. Never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("precision loss reducing to display precision")]
    PrecisionLoss,
}

/// Pool-ledger failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PoolError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("swap would decrease the pool invariant: {pool}")]
    InvariantViolation { pool: PoolKey },

    #[error("insufficient liquidity in pool {pool}")]
    InsufficientLiquidity { pool: PoolKey },

    #[error("unknown pool {pool}")]
    UnknownPool { pool: PoolKey },

    #[error("cannot pool a token against itself: {token}")]
    IdenticalTokens { token: TokenId },

    #[error("burning {requested} shares but only {available} held")]
    InsufficientShares { requested: Shares, available: Shares },

    #[error("deposit balance too low: need {required}, have {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("initial deposit mints below the minimum share dust threshold")]
    DustDeposit,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("fee tier {fee_bps} is not registered")]
    UnregisteredFeeTier { fee_bps: BasisPoints },
}

/// Router failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RouterError {
    #[error("no route from {token_in} to {token_out} within {max_hops} hops")]
    NoRouteFound {
        token_in: TokenId,
        token_out: TokenId,
        max_hops: u8,
    },

    #[error("pool {pool} changed between evaluation and commit")]
    StaleRoute { pool: PoolKey },

    #[error("best route violates the slippage bound")]
    SlippageExceeded,

    #[error("requested {requested} hops, limit is {limit}")]
    HopLimitExceeded { requested: u8, limit: u8 },
}

/// Authorization and lifecycle failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AuthError {
    #[error("caller lacks permission for this operation")]
    PermissionDenied,

    #[error("contract already initialized")]
    AlreadyInitialized,

    #[error("contract not initialized")]
    NotInitialized,

    #[error("payable API is suspended")]
    Suspended,

    #[error("illegal fee fraction: {fee_bps} bps")]
    IllegalFee { fee_bps: BasisPoints },

    #[error("fee tier list must not be empty")]
    NoFeeTiers,

    #[error("fee tier list must be strictly ascending")]
    UnorderedFeeTiers,
}

/// Umbrella error surfaced by every contract call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DexError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
