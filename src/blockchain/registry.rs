//! Chain target table keyed by chain id.

use std::collections::BTreeMap;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainTarget};
use crate::config::schema::AppConfig;

/// Static table of configured chain targets. Not mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    targets: BTreeMap<u64, ChainTarget>,
}

impl ChainRegistry {
    pub fn new(targets: impl IntoIterator<Item = ChainTarget>) -> Self {
        Self {
            targets: targets.into_iter().map(|t| (t.chain_id, t)).collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.chains.iter().cloned())
    }

    /// Look up a target, failing for unconfigured chain ids.
    pub fn get(&self, chain_id: u64) -> BlockchainResult<&ChainTarget> {
        self.targets
            .get(&chain_id)
            .ok_or(BlockchainError::UnknownChain(chain_id))
    }

    pub fn primary(&self) -> Option<&ChainTarget> {
        self.targets.values().find(|t| t.is_primary())
    }

    /// All targets, ordered by chain id.
    pub fn iter(&self) -> impl Iterator<Item = &ChainTarget> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
