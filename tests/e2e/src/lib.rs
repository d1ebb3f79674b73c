//! Shared harness for the end-to-end scenarios.
//!
//! Wraps a deployed contract state together with a mock chain token
//! registry so scenarios read like the deployment scripts they mirror:
//! deploy, fund, provide liquidity, trade, assert.

use std::collections::BTreeMap;
use std::sync::Once;

use tidepool_contract::{handlers, CallContext, DexState, TokenLedger};
use tidepool_types::{AccountId, Amount, BasisPoints, DexError, PoolError, TokenId};

pub const ADMIN: AccountId = AccountId(1);
pub const ALICE: AccountId = AccountId(2);
pub const BOB: AccountId = AccountId(3);

/// The tier list used by the reference deployment scenario.
pub const DEPLOY_TIERS: [BasisPoints; 8] = [500, 600, 700, 800, 900, 1000, 1100, 1200];

static TRACING: Once = Once::new();

/// Install a subscriber honoring `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// In-memory chain token registry.
#[derive(Debug, Default)]
pub struct MockTokens {
    balances: BTreeMap<(AccountId, TokenId), Amount>,
}

impl MockTokens {
    pub fn fund(&mut self, account: AccountId, token: TokenId, amount: Amount) {
        *self.balances.entry((account, token)).or_insert(0) += amount;
    }

    pub fn balance(&self, account: AccountId, token: TokenId) -> Amount {
        self.balances.get(&(account, token)).copied().unwrap_or(0)
    }
}

impl TokenLedger for MockTokens {
    fn transfer_in(
        &mut self,
        token: TokenId,
        from: AccountId,
        amount: Amount,
    ) -> Result<(), DexError> {
        let balance = self.balances.entry((from, token)).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance {
                required: amount,
                available: *balance,
            })?;
        Ok(())
    }

    fn transfer_out(
        &mut self,
        token: TokenId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), DexError> {
        *self.balances.entry((to, token)).or_insert(0) += amount;
        Ok(())
    }
}

/// One deployed contract plus its token registry.
pub struct World {
    pub state: DexState,
    pub tokens: MockTokens,
}

impl World {
    /// Deploy with the given tier list and a 10% protocol fee fraction.
    pub fn deploy(fee_tiers: &[BasisPoints]) -> Self {
        init_tracing();
        let mut state = DexState::new();
        handlers::initialize(&mut state, ADMIN, 1_000, fee_tiers.to_vec())
            .expect("deployment parameters are valid");
        Self {
            state,
            tokens: MockTokens::default(),
        }
    }

    /// Mint chain tokens to an account and escrow them into the contract.
    pub fn fund_deposit(&mut self, account: AccountId, token: TokenId, amount: Amount) {
        self.tokens.fund(account, token, amount);
        handlers::deposit(
            &mut self.state,
            &CallContext::new(account),
            &mut self.tokens,
            token,
            amount,
        )
        .expect("funded deposit succeeds");
    }

    /// Fund and provide two-sided liquidity in one step.
    pub fn seed_pool(
        &mut self,
        lp: AccountId,
        token_a: TokenId,
        token_b: TokenId,
        fee_bps: BasisPoints,
        amount_a: Amount,
        amount_b: Amount,
    ) {
        self.fund_deposit(lp, token_a, amount_a);
        self.fund_deposit(lp, token_b, amount_b);
        handlers::add_liquidity(
            &mut self.state,
            &CallContext::new(lp),
            token_a,
            token_b,
            fee_bps,
            amount_a,
            amount_b,
        )
        .expect("seed liquidity succeeds");
    }
}
