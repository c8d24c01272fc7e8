//! User-facing error taxonomy for verification actions.

use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::identity::FieldError;
use crate::verification::tracker::TransitionError;

/// Why a verification action failed. Every variant is scoped to one user
/// action; none is fatal to the process, and none is retried automatically.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Form input rejected before hashing.
    #[error("Invalid identity data: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// No wallet, wrong chain, or the user declined to sign.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// RPC or chain-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The transaction reverted on-chain.
    #[error("Contract error: {0}")]
    Contract(String),

    /// The requested chain targets cannot serve this action.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The chain-write client reported events out of order.
    #[error("Unexpected transaction state: {0}")]
    State(#[from] TransitionError),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<BlockchainError> for VerificationError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::Wallet(_)
            | BlockchainError::WalletNotConnected
            | BlockchainError::Rejected(_)
            | BlockchainError::GasPriceTooHigh { .. } => Self::Wallet(err.to_string()),
            BlockchainError::Reverted(_) => Self::Contract(err.to_string()),
            BlockchainError::UnknownChain(_) => Self::Config(err.to_string()),
            BlockchainError::Rpc(_)
            | BlockchainError::Timeout(_)
            | BlockchainError::ConfirmationTimeout(_)
            | BlockchainError::ChainMismatch { .. }
            | BlockchainError::Abi(_) => Self::Network(err.to_string()),
        }
    }
}

impl VerificationError {
    /// Short category name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Wallet(_) => "wallet",
            Self::Network(_) => "network",
            Self::Contract(_) => "contract",
            Self::Config(_) => "config",
            Self::State(_) => "state",
        }
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blockchain_error_mapping() {
        let cases = [
            (BlockchainError::WalletNotConnected, "wallet"),
            (BlockchainError::Rejected("user rejected".into()), "wallet"),
            (BlockchainError::Rpc("connection refused".into()), "network"),
            (BlockchainError::Timeout(10), "network"),
            (BlockchainError::Reverted("already verified".into()), "contract"),
            (BlockchainError::UnknownChain(1), "config"),
        ];
        for (err, kind) in cases {
            assert_eq!(VerificationError::from(err).kind(), kind);
        }
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = VerificationError::Validation(vec![
            FieldError { field: "email", message: "Please enter a valid email address" },
            FieldError { field: "address", message: "Address must be at least 10 characters" },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Invalid identity data: email:"));
        assert!(text.contains("; address:"));
    }
}
