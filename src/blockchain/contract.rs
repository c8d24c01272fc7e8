//! Verification contract ABI and calldata helpers.

use alloy::primitives::{Address, Bytes, B256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::identity::IdentityDigest;

sol! {
    /// Identity verification contract deployed on every chain target.
    #[derive(Debug, PartialEq, Eq)]
    interface IIdentityVerifier {
        function verify(address user, bytes32 proofHash) external;
        function isUserVerified(address user) external view returns (bool);
        function getUserProofHash(address user) external view returns (bytes32);
        function transportProof(address destinationProofStore, bytes32 destinationChainId) external returns (bytes32);
    }
}

pub use IIdentityVerifier::{
    getUserProofHashCall, isUserVerifiedCall, transportProofCall, verifyCall,
};

/// Calldata for `verify(user, proofHash)`.
pub fn encode_verify(user: Address, digest: IdentityDigest) -> Bytes {
    verifyCall {
        user,
        proofHash: digest.as_b256(),
    }
    .abi_encode()
    .into()
}

/// Calldata for `isUserVerified(user)`.
pub fn encode_is_user_verified(user: Address) -> Bytes {
    isUserVerifiedCall { user }.abi_encode().into()
}

/// Calldata for `getUserProofHash(user)`.
pub fn encode_get_user_proof_hash(user: Address) -> Bytes {
    getUserProofHashCall { user }.abi_encode().into()
}

/// Calldata for `transportProof(destinationProofStore, destinationChainId)`.
pub fn encode_transport_proof(destination_store: Address, destination_chain: B256) -> Bytes {
    transportProofCall {
        destinationProofStore: destination_store,
        destinationChainId: destination_chain,
    }
    .abi_encode()
    .into()
}

pub fn decode_bool(data: &[u8]) -> BlockchainResult<bool> {
    bool::abi_decode(data).map_err(|e| BlockchainError::Abi(e.to_string()))
}

pub fn decode_bytes32(data: &[u8]) -> BlockchainResult<B256> {
    B256::abi_decode(data).map_err(|e| BlockchainError::Abi(e.to_string()))
}
