//! # Tidepool Contract Core - Routing and Call Surface
//!
//! ## Purpose
//!
//! The on-chain call surface of the DEX: initialization and metadata,
//! deposit accounts, liquidity provision, and multi-hop swap routing over
//! the pool ledger. Every call executes single-threaded to completion under
//! the host's transaction semantics — a returned error means the host rolls
//! back all state, so no partial swap is ever observable.
//!
//! ## Integration Points
//!
//! - **Input Sources**: call handlers invoked by the host VM dispatcher
//! - **Output Destinations**: committed ledger mutations, deposit balance
//!   updates, external token transfers via the [`external::TokenLedger`]
//!   collaborator
//! - **State Dependencies**: `tidepool-amm` pool ledger, metadata store
//! - **Collaborators**: wrapped-native token contract and the chain token
//!   registry, consumed only through trait interfaces
//!
//! ## Architecture Role
//!
//! ```text
//! Swap Call → [Candidate Discovery] → [Path Evaluation] → [Commit | Abort]
//!      ↓              ↓                      ↓                   ↓
//! Deposit Check   Pools per Tier       Hop-by-hop Quotes   Staleness Check
//! Hop Budget      Bounded Search       Best-output Pick    Atomic Apply
//! ```
//!
//! The router is a pure compute-then-commit pipeline: no external call and
//! no ledger mutation happens between quote computation and the final
//! commit, which re-validates every pool's sequence number first.

pub mod external;
pub mod handlers;
pub mod metadata;
pub mod router;
pub mod state;

pub use external::{CallContext, NativeWrapper, TokenLedger};
pub use metadata::{Metadata, MetadataStore};
pub use router::{CommitOutcome, RouteHop, RoutePlan, Router, MAX_ROUTE_HOPS};
pub use state::DexState;
