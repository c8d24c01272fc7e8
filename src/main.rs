//! chain-identity command-line client.
//!
//! # Architecture Overview
//!
//! ```text
//!   identity.json ──▶ identity (validate, normalize, keccak256)
//!                           │
//!                           ▼
//!                    verification::flow ──▶ tracker (Idle → … → Confirmed/Failed)
//!                           │
//!              ┌────────────┴────────────┐
//!              ▼                         ▼
//!     blockchain::wallet          blockchain::client
//!     (sign, send, receipts)      (eth_call per chain, failover)
//!              │                         │
//!              └──────▶ verification contract ◀──── verification::status
//! ```

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use clap::{Parser, Subcommand};

use chain_identity::blockchain::{ChainRegistry, LocalWallet, RpcRouter};
use chain_identity::config::{load_config, AppConfig};
use chain_identity::identity::{compute_digest, IdentityRecord};
use chain_identity::observability::logging;
use chain_identity::verification::{
    StatusReader, TransactionState, VerificationError, VerificationFlow,
};

#[derive(Parser)]
#[command(name = "chain-identity")]
#[command(about = "Hash identity records and verify them on-chain", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to Avalanche Fuji only)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical JSON and digest of an identity record
    Hash {
        #[arg(long)]
        identity: PathBuf,
    },
    /// List configured chain targets
    Chains,
    /// Show the verification status of an account
    Status {
        #[arg(long)]
        account: Address,
        /// Only query this chain id (all chains when omitted)
        #[arg(long)]
        chain: Option<u64>,
    },
    /// Submit an identity digest to the verification contract
    Verify {
        #[arg(long)]
        identity: PathBuf,
        /// Target chain id (primary chain when omitted)
        #[arg(long)]
        chain: Option<u64>,
    },
    /// Relay the wallet's proof to another chain
    Transport {
        /// Source chain id (primary chain when omitted)
        #[arg(long)]
        from: Option<u64>,
        #[arg(long)]
        to: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init(&config.observability.log_level);

    tracing::debug!(chains = config.chains.len(), "Configuration loaded");

    match cli.command {
        Commands::Hash { identity } => {
            let record = read_identity(&identity)?;
            record.validate().map_err(VerificationError::Validation)?;
            println!("{}", record.normalize().canonical_json());
            println!("{}", compute_digest(&record));
        }
        Commands::Chains => {
            for target in ChainRegistry::from_config(&config).iter() {
                println!(
                    "{:>10}  {:<8}  {}  {}",
                    target.chain_id,
                    if target.is_primary() { "primary" } else { "l1" },
                    target.contract_address,
                    target.name
                );
            }
        }
        Commands::Status { account, chain } => {
            let registry = ChainRegistry::from_config(&config);
            let reader = StatusReader::new(RpcRouter::from_config(&config).await?);
            let statuses = match chain {
                Some(id) => reader.query_all(account, [registry.get(id)?]).await,
                None => reader.query_all(account, registry.iter()).await,
            };
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        Commands::Verify { identity, chain } => {
            let record = read_identity(&identity)?;
            let registry = ChainRegistry::from_config(&config);
            let chain_id = chain_or_primary(&registry, chain)?;
            let mut flow = connect_flow(&config, registry, chain_id)?;
            watch_progress(&flow);

            let result = flow.submit_identity(&record, chain_id).await;
            log_final_state(&flow);
            let submission = result?;
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        Commands::Transport { from, to } => {
            let registry = ChainRegistry::from_config(&config);
            let source = chain_or_primary(&registry, from)?;
            let mut flow = connect_flow(&config, registry, source)?;
            watch_progress(&flow);

            let result = flow.transport_proof(source, to).await;
            log_final_state(&flow);
            let submission = result?;
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
    }

    Ok(())
}

fn read_identity(path: &Path) -> Result<IdentityRecord, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn chain_or_primary(
    registry: &ChainRegistry,
    chain: Option<u64>,
) -> Result<u64, VerificationError> {
    match chain {
        Some(id) => Ok(id),
        None => registry
            .primary()
            .map(|t| t.chain_id)
            .ok_or_else(|| VerificationError::Config("no primary chain configured".to_string())),
    }
}

fn connect_flow(
    config: &AppConfig,
    registry: ChainRegistry,
    chain_id: u64,
) -> Result<VerificationFlow<LocalWallet>, VerificationError> {
    let mut wallet = LocalWallet::from_env(&config.wallet.private_key_env, config.rpc.clone())?;
    wallet.switch_chain(registry.get(chain_id)?)?;
    Ok(VerificationFlow::new(wallet, registry))
}

/// Log every tracker transition while the command runs.
fn watch_progress(flow: &VerificationFlow<LocalWallet>) {
    let mut rx = flow.tracker().subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            tracing::info!(state = state.label(), tx_hash = ?state.tx_hash(), "Transaction status");
        }
    });
}

/// The watcher task may not get to run before `main` returns.
fn log_final_state(flow: &VerificationFlow<LocalWallet>) -> TransactionState {
    let state = flow.state();
    tracing::info!(state = state.label(), tx_hash = ?state.tx_hash(), "Final transaction status");
    state
}
