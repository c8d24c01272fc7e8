//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

// Re-export ChainTarget from config module to avoid duplication
pub use crate::config::schema::{ChainKind, ChainTarget};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction {0} not confirmed in time")]
    ConfirmationTimeout(TxHash),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or signing error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// No account is connected to the session.
    #[error("No wallet connected")]
    WalletNotConnected,

    /// The signer declined to sign or send the transaction.
    #[error("User rejected the request: {0}")]
    Rejected(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// No target configured for the requested chain.
    #[error("Unknown chain id {0}")]
    UnknownChain(u64),

    /// Return data did not decode against the contract ABI.
    #[error("ABI decode error: {0}")]
    Abi(String),
}

impl BlockchainError {
    /// The underlying message as reported by the client, without our prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Rpc(msg)
            | Self::Reverted(msg)
            | Self::Wallet(msg)
            | Self::Rejected(msg)
            | Self::Abi(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Final outcome of a submitted transaction as reported by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Included with the required block depth.
    Included { tx_hash: TxHash, block_number: u64 },
    /// Mined but reverted.
    Reverted { tx_hash: TxHash },
}
