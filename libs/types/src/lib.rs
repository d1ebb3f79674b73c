//! # Tidepool Core Types
//!
//! ## Purpose
//!
//! Shared identifier, amount, and fee-tier types plus the complete error
//! taxonomy used across the Tidepool contract core. Every other crate in the
//! workspace depends on this leaf crate, so it carries no math and no state —
//! only the vocabulary the ledger, swap engine, and router speak.
//!
//! ## Integration Points
//!
//! - **Consumers**: `tidepool-math` (error kinds), `tidepool-amm` (pool keys,
//!   amounts, fee tiers), `tidepool-contract` (call-level error taxonomy)
//! - **Serialization**: all public types derive serde traits since contract
//!   state and query responses cross an encoding boundary
//!
//! ## Critical Rules
//!
//! 1. **NO FLOATING POINT**: amounts are `u128`, fees are basis points
//! 2. **Canonical pairs**: pool keys always order `token_a < token_b`
//! 3. **Explicit errors**: every failure mode has a dedicated variant;
//!    nothing is silently clamped or truncated

pub mod errors;
pub mod fees;
pub mod identifiers;

pub use errors::{AuthError, DexError, MathError, PoolError, RouterError};
pub use fees::{
    validate_fee_tiers, validate_protocol_fee, BasisPoints, BASIS_POINT_DIVISOR,
    MAX_PROTOCOL_FEE_BPS, MIN_PROTOCOL_FEE_BPS,
};
pub use identifiers::{AccountId, PoolKey, SwapDirection, TokenId, TokenPair};

/// Token quantity in the token's native smallest unit.
///
/// 128 bits covers every chain-native amount encountered in practice;
/// intermediate products that need more width go through the math layer's
/// 256-bit helpers and come back down checked.
pub type Amount = u128;

/// Per-pool monotonic mutation counter used for stale-route detection.
pub type Sequence = u64;

/// Liquidity share quantity issued against a pool.
pub type Shares = u128;
