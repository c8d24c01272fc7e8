//! On-chain identity verification client.
//!
//! Hashes KYC-style identity records, records the digest with a verification
//! contract, reads verification status per chain and relays proofs to other
//! chains through the contract's cross-chain hook.

pub mod blockchain;
pub mod config;
pub mod identity;
pub mod observability;
pub mod verification;

pub use config::AppConfig;
pub use identity::{compute_digest, IdentityDigest, IdentityRecord};
pub use verification::{StatusReader, VerificationError, VerificationFlow, VerificationStatus};
