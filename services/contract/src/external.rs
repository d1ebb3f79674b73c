//! Collaborator interfaces and the per-call context.
//!
//! The contract never inlines token issuance or native wrapping; both are
//! separate contracts reached through these traits. Implementations live in
//! the host environment (and in test mocks) — the core only decides *when*
//! a transfer may happen: strictly after all validation has passed.

use tidepool_types::{AccountId, Amount, DexError, TokenId};

/// Ambient data for one call, supplied by the host dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub caller: AccountId,
}

impl CallContext {
    pub fn new(caller: AccountId) -> Self {
        Self { caller }
    }
}

/// The chain's token registry, used to escrow tokens into and out of the
/// contract's deposit accounts.
pub trait TokenLedger {
    /// Pull `amount` of `token` from `from` into the contract's escrow.
    fn transfer_in(&mut self, token: TokenId, from: AccountId, amount: Amount)
        -> Result<(), DexError>;

    /// Push `amount` of `token` from escrow out to `to`.
    fn transfer_out(&mut self, token: TokenId, to: AccountId, amount: Amount)
        -> Result<(), DexError>;
}

/// Pass-through wrapped-native contract: mints/burns a wrapped token 1:1
/// against locked native funds.
pub trait NativeWrapper {
    /// The token id of the wrapped representation.
    fn wrapped_token(&self) -> TokenId;

    /// Lock `amount` native from `from` and mint wrapped into escrow.
    fn wrap(&mut self, from: AccountId, amount: Amount) -> Result<(), DexError>;

    /// Burn wrapped from escrow and release native to `to`.
    fn unwrap(&mut self, to: AccountId, amount: Amount) -> Result<(), DexError>;
}
