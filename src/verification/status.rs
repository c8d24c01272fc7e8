//! On-chain verification status per account and chain target.

use alloy::primitives::Address;
use futures_util::future::join_all;
use serde::Serialize;

use crate::blockchain::contract;
use crate::blockchain::session::ChainReader;
use crate::blockchain::types::{BlockchainResult, ChainTarget};
use crate::identity::IdentityDigest;
use crate::observability::metrics;

/// What a chain says about an account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Query not resolved yet.
    #[default]
    Unknown,
    Verified(IdentityDigest),
    NotVerified,
    /// The read failed; the caller decides whether to ask again.
    Error(String),
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Verified(_) => "verified",
            Self::NotVerified => "not_verified",
            Self::Error(_) => "error",
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Status of one account on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStatus {
    pub chain_id: u64,
    pub chain: String,
    pub status: VerificationStatus,
}

/// Reads `isUserVerified` / `getUserProofHash` through a [`ChainReader`].
#[derive(Debug, Clone)]
pub struct StatusReader<R> {
    reader: R,
}

impl<R: ChainReader> StatusReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Query one chain. Never fails: read errors become [`VerificationStatus::Error`].
    pub async fn query(&self, account: Address, target: &ChainTarget) -> VerificationStatus {
        let status = match self.read(account, target).await {
            Ok(Some(digest)) => VerificationStatus::Verified(digest),
            Ok(None) => VerificationStatus::NotVerified,
            Err(e) => {
                tracing::warn!(
                    account = %account,
                    chain_id = target.chain_id,
                    error = %e,
                    "Verification status read failed"
                );
                VerificationStatus::Error(e.to_string())
            }
        };
        metrics::record_status_query(target.chain_id, status.label());
        status
    }

    /// Query every target concurrently; results keep the input order.
    pub async fn query_all<'a>(
        &self,
        account: Address,
        targets: impl IntoIterator<Item = &'a ChainTarget>,
    ) -> Vec<ChainStatus> {
        let queries = targets.into_iter().map(|target| async move {
            ChainStatus {
                chain_id: target.chain_id,
                chain: target.name.clone(),
                status: self.query(account, target).await,
            }
        });
        join_all(queries).await
    }

    async fn read(
        &self,
        account: Address,
        target: &ChainTarget,
    ) -> BlockchainResult<Option<IdentityDigest>> {
        let verified = self
            .reader
            .call(
                target.chain_id,
                target.contract_address,
                contract::encode_is_user_verified(account),
            )
            .await?;
        if !contract::decode_bool(&verified)? {
            return Ok(None);
        }

        let proof = self
            .reader
            .call(
                target.chain_id,
                target.contract_address,
                contract::encode_get_user_proof_hash(account),
            )
            .await?;
        Ok(Some(IdentityDigest(contract::decode_bytes32(&proof)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::BlockchainError;
    use alloy::primitives::{Bytes, B256};
    use alloy::sol_types::{SolCall, SolValue};
    use std::collections::HashMap;

    /// Answers reads from a fixed table of (chain, account) → proof hash.
    struct FixedReader {
        proofs: HashMap<(u64, Address), B256>,
        offline_chain: Option<u64>,
    }

    impl ChainReader for FixedReader {
        async fn call(&self, chain_id: u64, _to: Address, data: Bytes) -> BlockchainResult<Bytes> {
            if self.offline_chain == Some(chain_id) {
                return Err(BlockchainError::Rpc("connection refused".to_string()));
            }
            if let Ok(call) = contract::isUserVerifiedCall::abi_decode(&data) {
                let known = self.proofs.contains_key(&(chain_id, call.user));
                return Ok(known.abi_encode().into());
            }
            if let Ok(call) = contract::getUserProofHashCall::abi_decode(&data) {
                let proof = self
                    .proofs
                    .get(&(chain_id, call.user))
                    .copied()
                    .unwrap_or_default();
                return Ok(proof.abi_encode().into());
            }
            Err(BlockchainError::Abi("unexpected call".to_string()))
        }
    }

    fn target(name: &str, chain_id: u64) -> ChainTarget {
        ChainTarget {
            name: name.to_string(),
            chain_id,
            ..ChainTarget::avalanche_fuji()
        }
    }

    #[tokio::test]
    async fn test_query_statuses() {
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        let proof = B256::repeat_byte(0x77);
        let reader = StatusReader::new(FixedReader {
            proofs: HashMap::from([((43113, alice), proof)]),
            offline_chain: Some(13337),
        });

        let fuji = target("Fuji", 43113);
        let beam = target("Beam", 13337);

        assert_eq!(
            reader.query(alice, &fuji).await,
            VerificationStatus::Verified(IdentityDigest(proof))
        );
        assert_eq!(reader.query(bob, &fuji).await, VerificationStatus::NotVerified);
        assert!(matches!(reader.query(alice, &beam).await, VerificationStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_query_all_keeps_order() {
        let alice = Address::repeat_byte(0xa1);
        let reader = StatusReader::new(FixedReader {
            proofs: HashMap::from([((13337, alice), B256::repeat_byte(1))]),
            offline_chain: None,
        });
        let targets = [target("Fuji", 43113), target("Beam", 13337)];

        let statuses = reader.query_all(alice, &targets).await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].chain_id, 43113);
        assert_eq!(statuses[0].status, VerificationStatus::NotVerified);
        assert!(statuses[1].status.is_verified());
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(VerificationStatus::default(), VerificationStatus::Unknown);
    }

    #[test]
    fn test_status_json_shape() {
        let json = serde_json::to_string(&VerificationStatus::NotVerified).unwrap();
        assert_eq!(json, r#"{"status":"not_verified"}"#);
    }
}
