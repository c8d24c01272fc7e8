//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, URLs parse)
//! - Check chain table integrity (unique ids, exactly one primary, deployed contracts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{AppConfig, ChainKind};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("no chain targets configured")]
    NoChains,

    #[error("chain id {0} is configured more than once")]
    DuplicateChainId(u64),

    #[error("chain '{name}' has an invalid RPC URL '{url}'")]
    InvalidUrl { name: String, url: String },

    #[error("expected exactly one primary chain, found {0}")]
    PrimaryCount(usize),

    #[error("chain '{0}' has an empty name")]
    EmptyName(u64),

    #[error("chain '{name}' has no contract_address configured")]
    ZeroContract { name: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "rpc.timeout_secs" });
    }
    if config.rpc.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "rpc.confirmation_timeout_secs",
        });
    }
    if config.rpc.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "rpc.poll_interval_ms" });
    }

    if config.chains.is_empty() {
        errors.push(ValidationError::NoChains);
    }

    let mut seen = HashSet::new();
    for chain in &config.chains {
        if !seen.insert(chain.chain_id) {
            errors.push(ValidationError::DuplicateChainId(chain.chain_id));
        }
        if chain.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(chain.chain_id));
        }
        if chain.contract_address == Address::ZERO {
            errors.push(ValidationError::ZeroContract {
                name: chain.name.clone(),
            });
        }
        for url in std::iter::once(&chain.rpc_url).chain(chain.failover_urls.iter()) {
            if url.parse::<url::Url>().is_err() {
                errors.push(ValidationError::InvalidUrl {
                    name: chain.name.clone(),
                    url: url.clone(),
                });
            }
        }
        if chain.kind == ChainKind::L1 && chain.cross_chain_id.is_none() {
            tracing::warn!(
                chain = %chain.name,
                chain_id = chain.chain_id,
                "L1 target has no cross_chain_id; proofs cannot be transported to it"
            );
        }
    }

    let primaries = config.chains.iter().filter(|c| c.is_primary()).count();
    if !config.chains.is_empty() && primaries != 1 {
        errors.push(ValidationError::PrimaryCount(primaries));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
