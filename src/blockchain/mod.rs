//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! config chains table
//!     → registry.rs (ChainTarget by chain id)
//!     → client.rs (RPC connection with timeouts and failover, eth_call routing)
//!     → wallet.rs (local key, signing provider, receipt polling)
//!     → contract.rs (verification contract ABI)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod registry;
pub mod session;
pub mod types;
pub mod wallet;

pub use client::{RpcClient, RpcRouter};
pub use registry::ChainRegistry;
pub use session::{ChainReader, WalletSession};
pub use types::{BlockchainError, BlockchainResult, ChainId, ChainTarget, ReceiptOutcome};
pub use wallet::LocalWallet;
