//! Metadata store: global parameters persisted at initialization.
//!
//! Written exactly once by `initialize` and immutable afterwards; every
//! later read serves from this snapshot. The queryable [`Metadata`] view
//! additionally carries the call nonce so clients get a cheap freshness
//! probe alongside the static configuration.

use serde::{Deserialize, Serialize};

use tidepool_types::{
    validate_fee_tiers, validate_protocol_fee, AccountId, AuthError, BasisPoints,
    BASIS_POINT_DIVISOR,
};

/// Persisted global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStore {
    admin: AccountId,
    protocol_fee_bps: BasisPoints,
    fee_tiers: Vec<BasisPoints>,
}

impl MetadataStore {
    /// Validate and persist the deployment parameters.
    pub fn new(
        admin: AccountId,
        protocol_fee_bps: BasisPoints,
        fee_tiers: Vec<BasisPoints>,
    ) -> Result<Self, AuthError> {
        let protocol_fee_bps = validate_protocol_fee(protocol_fee_bps)?;
        validate_fee_tiers(&fee_tiers)?;
        Ok(Self {
            admin,
            protocol_fee_bps,
            fee_tiers,
        })
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    pub fn protocol_fee_bps(&self) -> BasisPoints {
        self.protocol_fee_bps
    }

    pub fn fee_tiers(&self) -> &[BasisPoints] {
        &self.fee_tiers
    }

    pub fn is_registered_tier(&self, fee_bps: BasisPoints) -> bool {
        // list is short and sorted; binary search keeps the lookup exact
        self.fee_tiers.binary_search(&fee_bps).is_ok()
    }

    pub fn view(&self, nonce: u64) -> Metadata {
        Metadata {
            admin: self.admin,
            nonce,
            protocol_fee_bps: self.protocol_fee_bps,
            fee_tiers: self.fee_tiers.clone(),
            fee_divisor: BASIS_POINT_DIVISOR,
        }
    }
}

/// Read-only metadata answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub admin: AccountId,
    pub nonce: u64,
    pub protocol_fee_bps: BasisPoints,
    pub fee_tiers: Vec<BasisPoints>,
    pub fee_divisor: BasisPoints,
}
