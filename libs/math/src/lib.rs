//! # Tidepool Deterministic Math Layer
//!
//! ## Purpose
//!
//! Integer-only arithmetic primitives guaranteeing bit-identical results on
//! every validator regardless of host CPU or OS. All pool-invariant checks
//! and price computations in the workspace route through this crate
//! exclusively — native floating point is forbidden everywhere in the core.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve and amount values from the pool ledger
//! - **Output Destinations**: swap engine quotes, invariant verification,
//!   liquidity share minting
//! - **Precision**: 256-bit intermediates over `u128` amounts; results are
//!   reduced back to `u128` with explicit overflow detection
//! - **Failure Mode**: division by zero, overflow, and precision loss are
//!   returned as [`MathError`] kinds, never as silent truncation
//!
//! ## Architecture Role
//!
//! The math layer is the only place wide arithmetic lives. The swap engine
//! expresses the constant-product formula purely in terms of [`mul_div_floor`]
//! / [`mul_div_ceil`], which keeps the curve swappable without touching
//! callers.

pub mod ops;
pub mod wide;

pub use ops::{
    amount_to_decimal, bps_ratio_decimal, checked_add, checked_sub, mul_div_ceil, mul_div_floor,
};
pub use wide::U256;

pub use tidepool_types::MathError;
