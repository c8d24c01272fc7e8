//! Local signing wallet backing the [`WalletSession`] capability.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use std::sync::Arc;
use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use tokio::time::{interval, timeout};

use crate::blockchain::client::RpcClient;
use crate::blockchain::session::WalletSession;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainTarget, ReceiptOutcome};
use crate::config::schema::RpcConfig;

/// Default environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "CHAIN_IDENTITY_PRIVATE_KEY";

/// Write and read handles for the chain the wallet is pointed at.
#[derive(Clone)]
struct Connection {
    chain_id: u64,
    writer: Arc<dyn Provider + Send + Sync>,
    reader: RpcClient,
}

/// Wallet holding a local private key, connected to one chain at a time.
#[derive(Clone)]
pub struct LocalWallet {
    signer: Option<PrivateKeySigner>,
    connection: Option<Connection>,
    rpc: RpcConfig,
}

impl LocalWallet {
    /// A wallet with no key loaded.
    pub fn disconnected(rpc: RpcConfig) -> Self {
        Self {
            signer: None,
            connection: None,
            rpc,
        }
    }

    /// Create a wallet from a hex-encoded private key string (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str, rpc: RpcConfig) -> BlockchainResult<Self> {
        let mut wallet = Self::disconnected(rpc);
        wallet.connect_key(private_key_hex)?;
        Ok(wallet)
    }

    /// Load the private key from the named environment variable.
    pub fn from_env(var: &str, rpc: RpcConfig) -> BlockchainResult<Self> {
        let private_key = std::env::var(var).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", var))
        })?;
        Self::from_private_key(&private_key, rpc)
    }

    /// Load a key into the wallet, replacing any previous one.
    pub fn connect_key(&mut self, private_key_hex: &str) -> BlockchainResult<()> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet connected");
        self.signer = Some(signer);
        self.connection = None;
        Ok(())
    }

    /// Drop the key and the chain connection.
    pub fn disconnect(&mut self) {
        if let Some(signer) = self.signer.take() {
            tracing::info!(address = %signer.address(), "Wallet disconnected");
        }
        self.connection = None;
    }

    /// Point the wallet at a chain target.
    pub fn switch_chain(&mut self, target: &ChainTarget) -> BlockchainResult<()> {
        let signer = self.signer.clone().ok_or(BlockchainError::WalletNotConnected)?;
        let url: url::Url = target.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", target.rpc_url, e))
        })?;

        let writer = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);
        let reader = RpcClient::connect(target.clone(), &self.rpc)?;

        self.connection = Some(Connection {
            chain_id: target.chain_id,
            writer: Arc::new(writer),
            reader,
        });
        tracing::info!(chain = %target.name, chain_id = target.chain_id, "Wallet switched chain");
        Ok(())
    }

    fn connection(&self) -> BlockchainResult<&Connection> {
        if self.signer.is_none() {
            return Err(BlockchainError::WalletNotConnected);
        }
        self.connection
            .as_ref()
            .ok_or_else(|| BlockchainError::Wallet("Wallet is not connected to a chain".to_string()))
    }

    async fn check_gas_price(&self, conn: &Connection) -> BlockchainResult<()> {
        let gas_price_gwei = conn.reader.get_gas_price().await? / 1_000_000_000;
        if gas_price_gwei > self.rpc.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.rpc.max_gas_price_gwei,
            });
        }
        Ok(())
    }
}

/// Sort a send failure into rejection, revert or transport error.
fn classify_send_error(message: String) -> BlockchainError {
    let lower = message.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") {
        BlockchainError::Rejected(message)
    } else if lower.contains("revert") {
        BlockchainError::Reverted(message)
    } else {
        BlockchainError::Rpc(message)
    }
}

impl WalletSession for LocalWallet {
    fn current_account(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    fn current_chain(&self) -> Option<u64> {
        self.connection.as_ref().map(|c| c.chain_id)
    }

    async fn submit(&self, to: Address, data: Bytes) -> BlockchainResult<TxHash> {
        let conn = self.connection()?;
        self.check_gas_price(conn).await?;

        let tx = TransactionRequest::default().with_to(to).with_input(data);
        let pending = timeout(
            Duration::from_secs(self.rpc.timeout_secs),
            conn.writer.send_transaction(tx),
        )
        .await
        .map_err(|_| BlockchainError::Timeout(self.rpc.timeout_secs))?
        .map_err(|e| classify_send_error(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, to = %to, chain_id = conn.chain_id, "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptOutcome> {
        let conn = self.connection()?;
        let required_confirmations = self.rpc.confirmation_blocks as u64;
        let poll_interval = Duration::from_millis(self.rpc.poll_interval_ms);

        let result = timeout(Duration::from_secs(self.rpc.confirmation_timeout_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match conn.reader.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ReceiptOutcome::Reverted { tx_hash });
                }

                let current_block = conn.reader.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // the inclusion block counts as the first confirmation
                let confirmations = current_block.saturating_sub(tx_block) + 1;

                if confirmations >= required_confirmations {
                    return Ok(ReceiptOutcome::Included {
                        tx_hash,
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(tx_hash)),
        }
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("account", &self.current_account())
            .field("chain_id", &self.current_chain())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn anvil_target() -> ChainTarget {
        ChainTarget {
            name: "Anvil".to_string(),
            chain_id: 31337,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            ..ChainTarget::avalanche_fuji()
        }
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, RpcConfig::default()).unwrap();
        assert_eq!(
            wallet.current_account().unwrap().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(wallet.current_chain(), None);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let key = format!("0x{}", TEST_PRIVATE_KEY);
        let wallet = LocalWallet::from_private_key(&key, RpcConfig::default()).unwrap();
        assert!(wallet.current_account().is_some());
    }

    #[test]
    fn test_invalid_private_key() {
        let result = LocalWallet::from_private_key("invalid_key", RpcConfig::default());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_missing_env_var() {
        let err = LocalWallet::from_env("CHAIN_IDENTITY_TEST_UNSET_KEY", RpcConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("CHAIN_IDENTITY_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_switch_chain_and_disconnect() {
        let mut wallet =
            LocalWallet::from_private_key(TEST_PRIVATE_KEY, RpcConfig::default()).unwrap();
        wallet.switch_chain(&anvil_target()).unwrap();
        assert_eq!(wallet.current_chain(), Some(31337));

        wallet.disconnect();
        assert_eq!(wallet.current_account(), None);
        assert_eq!(wallet.current_chain(), None);
    }

    #[test]
    fn test_switch_chain_requires_key() {
        let mut wallet = LocalWallet::disconnected(RpcConfig::default());
        let err = wallet.switch_chain(&anvil_target()).unwrap_err();
        assert!(matches!(err, BlockchainError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_submit_while_disconnected() {
        let wallet = LocalWallet::disconnected(RpcConfig::default());
        let err = wallet.submit(Address::ZERO, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, BlockchainError::WalletNotConnected));
    }

    #[test]
    fn test_classify_send_error() {
        assert!(matches!(
            classify_send_error("MetaMask Tx Signature: User denied transaction signature.".into()),
            BlockchainError::Rejected(_)
        ));
        assert!(matches!(
            classify_send_error("execution reverted: already verified".into()),
            BlockchainError::Reverted(_)
        ));
        assert!(matches!(
            classify_send_error("connection refused".into()),
            BlockchainError::Rpc(_)
        ));
    }
}
