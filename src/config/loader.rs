//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), chains = config.chains.len(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [rpc]
        timeout_secs = 5

        [observability]
        log_level = "debug"

        [[chains]]
        name = "Avalanche Fuji C-Chain"
        chain_id = 43113
        rpc_url = "https://api.avax-test.network/ext/bc/C/rpc"
        contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        kind = "primary"

        [[chains]]
        name = "Beam L1"
        chain_id = 13337
        rpc_url = "https://build.onbeam.com/rpc/testnet"
        failover_urls = ["https://subnets.avax.network/beam/testnet/rpc"]
        contract_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
        cross_chain_id = "0x0000000000000000000000000000000000000000000000000000000000000001"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.rpc.timeout_secs, 5);
        // unspecified fields keep their defaults
        assert_eq!(config.rpc.poll_interval_ms, 2000);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.chains.len(), 2);
        assert_eq!(config.chain(13337).unwrap().failover_urls.len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.primary_chain().unwrap().chain_id, 43113);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/chain-identity.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[rpc]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("rpc.timeout_secs must be greater than zero"));
    }
}
