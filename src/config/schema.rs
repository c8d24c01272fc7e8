//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// RPC timing and transaction settings shared by every chain.
    pub rpc: RpcConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Local signing wallet settings.
    pub wallet: WalletConfig,

    /// Chain targets with a verification contract deployment.
    pub chains: Vec<ChainTarget>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            observability: ObservabilityConfig::default(),
            wallet: WalletConfig::default(),
            chains: vec![ChainTarget::avalanche_fuji()],
        }
    }
}

impl AppConfig {
    /// Find the target configured for a chain id.
    pub fn chain(&self, chain_id: u64) -> Option<&ChainTarget> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// The primary (source of truth) chain, if one is configured.
    pub fn primary_chain(&self) -> Option<&ChainTarget> {
        self.chains.iter().find(|c| c.kind == ChainKind::Primary)
    }
}

/// RPC and transaction lifecycle settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum time to wait for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Number of block confirmations required before a write counts as included.
    pub confirmation_blocks: u32,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 2000,
            confirmation_blocks: 1,
            max_gas_price_gwei: 500,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Wallet configuration. Keys themselves never live in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Role of a chain in the proof topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    /// Source chain where identities are verified first.
    Primary,
    /// Subnet / L1 that receives proofs over cross-chain messaging.
    #[default]
    L1,
}

/// A destination network and its verification contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainTarget {
    /// Human-readable network name.
    pub name: String,

    /// EVM chain id.
    pub chain_id: u64,

    /// Primary JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Address of the verification contract on this chain.
    pub contract_address: Address,

    /// Cross-chain routing identifier (e.g. an Avalanche blockchain ID).
    #[serde(default)]
    pub cross_chain_id: Option<B256>,

    #[serde(default)]
    pub kind: ChainKind,
}

impl ChainTarget {
    /// Avalanche Fuji C-Chain testnet, the default primary chain.
    pub fn avalanche_fuji() -> Self {
        Self {
            name: "Avalanche Fuji C-Chain".to_string(),
            chain_id: 43113,
            rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
            failover_urls: Vec::new(),
            contract_address: Address::ZERO,
            cross_chain_id: None,
            kind: ChainKind::Primary,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.kind == ChainKind::Primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_primary_fuji() {
        let config = AppConfig::default();
        let primary = config.primary_chain().unwrap();
        assert_eq!(primary.chain_id, 43113);
        assert!(config.chain(43113).is_some());
        assert!(config.chain(1).is_none());
    }

    #[test]
    fn test_chain_target_from_toml() {
        let raw = r#"
            name = "Dexalot L1"
            chain_id = 432201
            rpc_url = "https://subnets.avax.network/dexalot/testnet/rpc"
            contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            cross_chain_id = "0x9f3be606497285d0ffbb5ac9ba24aa60346a9b1812479ed66cb329f394a4b1c7"
            kind = "l1"
        "#;
        let target: ChainTarget = toml::from_str(raw).unwrap();
        assert_eq!(target.kind, ChainKind::L1);
        assert!(target.cross_chain_id.is_some());
        assert!(target.failover_urls.is_empty());
        assert!(!target.is_primary());
    }
}
