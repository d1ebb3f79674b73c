//! The contract's single state struct.
//!
//! No ambient or static mutable state anywhere: every handler receives
//! `&mut DexState` explicitly, and the host guarantees one call mutates it
//! at a time with all-or-nothing transaction semantics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tidepool_amm::PoolLedger;
use tidepool_math::{checked_add, checked_sub};
use tidepool_types::{AccountId, Amount, AuthError, DexError, PoolError, TokenId};

use crate::metadata::MetadataStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexState {
    config: Option<MetadataStore>,
    pub ledger: PoolLedger,
    /// Contract-held token balances per (account, token): the deposit
    /// accounts swaps and liquidity calls settle against.
    deposits: BTreeMap<(AccountId, TokenId), Amount>,
    suspended: bool,
    nonce: u64,
}

impl DexState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, config: MetadataStore) -> Result<(), AuthError> {
        if self.config.is_some() {
            return Err(AuthError::AlreadyInitialized);
        }
        self.config = Some(config);
        Ok(())
    }

    pub fn config(&self) -> Result<&MetadataStore, AuthError> {
        self.config.as_ref().ok_or(AuthError::NotInitialized)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn bump_nonce(&mut self) {
        self.nonce += 1;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Reject payable calls while the circuit breaker is set.
    pub fn ensure_payable(&self) -> Result<(), AuthError> {
        if self.suspended {
            Err(AuthError::Suspended)
        } else {
            Ok(())
        }
    }

    pub fn ensure_admin(&self, caller: AccountId) -> Result<(), AuthError> {
        if self.config()?.admin() == caller {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied)
        }
    }

    pub fn deposit_balance(&self, account: AccountId, token: TokenId) -> Amount {
        self.deposits.get(&(account, token)).copied().unwrap_or(0)
    }

    /// All non-zero deposit balances of one account, ordered by token.
    pub fn deposits_of(&self, account: AccountId) -> Vec<(TokenId, Amount)> {
        self.deposits
            .iter()
            .filter(|((owner, _), amount)| *owner == account && **amount > 0)
            .map(|((_, token), amount)| (*token, *amount))
            .collect()
    }

    pub fn credit_deposit(
        &mut self,
        account: AccountId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), DexError> {
        let balance = self.deposit_balance(account, token);
        let updated = checked_add(balance, amount).map_err(PoolError::Math)?;
        self.deposits.insert((account, token), updated);
        Ok(())
    }

    pub fn debit_deposit(
        &mut self,
        account: AccountId,
        token: TokenId,
        amount: Amount,
    ) -> Result<(), DexError> {
        let balance = self.deposit_balance(account, token);
        if balance < amount {
            return Err(PoolError::InsufficientBalance {
                required: amount,
                available: balance,
            }
            .into());
        }
        let updated = checked_sub(balance, amount).map_err(PoolError::Math)?;
        if updated == 0 {
            self.deposits.remove(&(account, token));
        } else {
            self.deposits.insert((account, token), updated);
        }
        Ok(())
    }
}
