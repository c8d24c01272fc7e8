//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoints of a chain target
//! - Query chain state (chain id, block number, gas price, receipts)
//! - Execute read-only contract calls
//! - Route calls to the right chain by id

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::timeout;

use crate::blockchain::session::ChainReader;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, ChainTarget};
use crate::config::schema::{AppConfig, RpcConfig};
use crate::observability::metrics;

/// RPC client for one chain target, with failover across its endpoints.
#[derive(Clone)]
pub struct RpcClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    target: ChainTarget,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a client for a chain target.
    ///
    /// The connected chain id is checked against the target, but a mismatch
    /// or an unreachable endpoint only logs a warning so that other chains
    /// stay usable.
    pub async fn new(target: ChainTarget, rpc: &RpcConfig) -> BlockchainResult<Self> {
        let client = Self::connect(target, rpc)?;

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    chain = %client.target.name,
                    rpc_url = %client.target.rpc_url,
                    chain_id = client.target.chain_id,
                    "RPC client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    chain = %client.target.name,
                    error = %e,
                    "RPC client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Build the provider list without touching the network.
    pub fn connect(target: ChainTarget, rpc: &RpcConfig) -> BlockchainResult<Self> {
        let mut providers = Vec::new();

        let primary_url: url::Url = target.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", target.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &target.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        Ok(Self {
            providers,
            target,
            timeout_duration: Duration::from_secs(rpc.timeout_secs),
        })
    }

    /// Verify the connected chain ID matches the target.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.target.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.target.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    fn note_failure(&self, provider_idx: usize, error: Option<&dyn std::fmt::Display>) {
        match error {
            Some(e) => tracing::warn!(
                chain_id = self.target.chain_id,
                provider_idx,
                error = %e,
                "RPC error, trying next provider"
            ),
            None => tracing::warn!(
                chain_id = self.target.chain_id,
                provider_idx,
                "RPC timeout, trying next provider"
            ),
        }
        metrics::record_rpc_failover(self.target.chain_id);
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => self.note_failure(i, Some(&e)),
                Err(_) => self.note_failure(i, None),
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => self.note_failure(i, Some(&e)),
                Err(_) => self.note_failure(i, None),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get block number".to_string()))
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_gas_price()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => self.note_failure(i, Some(&e)),
                Err(_) => self.note_failure(i, None),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get gas price".to_string()))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_transaction_receipt(tx_hash)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => self.note_failure(i, Some(&e)),
                Err(_) => self.note_failure(i, None),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get receipt".to_string()))
    }

    /// Execute a read-only contract call.
    pub async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.call(request.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => self.note_failure(i, Some(&e)),
                Err(_) => self.note_failure(i, None),
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All providers failed to call {} on chain {}",
            to, self.target.chain_id
        )))
    }

    /// Get the chain target this client serves.
    pub fn target(&self) -> &ChainTarget {
        &self.target
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("chain", &self.target.name)
            .field("rpc_url", &self.target.rpc_url)
            .field("chain_id", &self.target.chain_id)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Routes read calls to the client configured for each chain id.
#[derive(Clone, Debug, Default)]
pub struct RpcRouter {
    clients: HashMap<u64, RpcClient>,
}

impl RpcRouter {
    /// Connect a client for every configured chain target.
    pub async fn from_config(config: &AppConfig) -> BlockchainResult<Self> {
        let mut router = Self::default();
        for target in &config.chains {
            let client = RpcClient::new(target.clone(), &config.rpc).await?;
            router.insert(client);
        }
        Ok(router)
    }

    pub fn insert(&mut self, client: RpcClient) {
        self.clients.insert(client.target().chain_id, client);
    }

    pub fn client(&self, chain_id: u64) -> BlockchainResult<&RpcClient> {
        self.clients
            .get(&chain_id)
            .ok_or(BlockchainError::UnknownChain(chain_id))
    }
}

impl ChainReader for RpcRouter {
    async fn call(&self, chain_id: u64, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.client(chain_id)?.call(to, data).await
    }
}
