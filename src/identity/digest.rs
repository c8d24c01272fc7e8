//! Identity digest: keccak-256 over the canonical JSON of a normalized record.
//!
//! The verification contract stores the digest as `bytes32`, so the hash
//! function is fixed to keccak-256, the same one the EVM exposes.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use crate::identity::record::IdentityRecord;

/// 32-byte fingerprint of an identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityDigest(pub B256);

impl IdentityDigest {
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    /// The all-zero value the contract returns for unknown accounts.
    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl From<B256> for IdentityDigest {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<IdentityDigest> for B256 {
    fn from(value: IdentityDigest) -> Self {
        value.0
    }
}

impl fmt::Display for IdentityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityDigest {
    type Err = alloy::primitives::hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<B256>().map(Self)
    }
}

/// Compute the digest of a record. Pure; normalizes before hashing.
pub fn compute_digest(record: &IdentityRecord) -> IdentityDigest {
    let json = record.normalize().canonical_json();
    let digest = IdentityDigest(keccak256(json.as_bytes()));
    tracing::debug!(digest = %digest, "Identity digest computed");
    digest
}
