//! # Tidepool AMM Library - Pool Ledger and Swap Engine
//!
//! ## Purpose
//!
//! Constant-function pool accounting with deterministic swap quoting.
//! Tracks per-(pair, fee-tier) reserves, liquidity shares, position
//! ownership, and accrued fees, and computes exact swap quotes over pool
//! snapshots with zero floating point. Every arithmetic step routes through
//! the deterministic math layer so results are bit-identical on all
//! validators.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool mutations and reads from the contract router
//! - **Output Destinations**: composite route quotes, committed reserve
//!   updates, position share issuance
//! - **Math Foundation**: `tidepool-math` 256-bit helpers for products,
//!   quotients, and the initial-share square root
//! - **Invariant Guard**: every committed swap re-verifies the
//!   constant-function product in 256-bit arithmetic
//!
//! ## Architecture Role
//!
//! ```text
//! Router Hops → [Swap Engine Quotes] → [Route Selection] → [Ledger Commit]
//!       ↓               ↓                                        ↓
//! Pool Snapshots   Pure Computation                     Invariant Check
//! Fee Tiers        Floor/Ceil Rounding                  Sequence Bump
//! ```
//!
//! The swap engine is pure: quoting never mutates a pool. Reserve mutation
//! happens only through the ledger's commit operations, which are the sole
//! writers of pool state.

pub mod pool;
pub mod swap;

pub use pool::{Pool, PoolLedger, Position, MIN_INITIAL_SHARES};
pub use swap::{ConstantProduct, CurveQuote, SwapQuote};
