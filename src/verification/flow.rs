//! One user action end to end: validate, hash, write, wait.
//!
//! # Data Flow
//! ```text
//! IdentityRecord
//!     → validate (Validation error, tracker untouched)
//!     → target has a contract address? (Config error)
//!     → wallet connected + on target chain? (Wallet error, tracker stays Idle)
//!     → compute_digest
//!     → tracker: Submit → WalletSession::submit → Approved(tx) | Failed
//!     → WalletSession::await_receipt → Included(tx) | Failed
//! ```

use alloy::primitives::{Address, Bytes, TxHash};
use serde::Serialize;

use crate::blockchain::contract;
use crate::blockchain::registry::ChainRegistry;
use crate::blockchain::session::WalletSession;
use crate::blockchain::types::{BlockchainError, ChainTarget, ReceiptOutcome};
use crate::identity::{compute_digest, IdentityDigest, IdentityRecord};
use crate::observability::metrics;
use crate::verification::error::{VerificationError, VerificationResult};
use crate::verification::tracker::{TransactionState, TransactionTracker, TxEvent};

/// A write that reached `Confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub attempt: u64,
    pub chain_id: u64,
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Digest recorded by `verify`; `None` for proof transport.
    pub digest: Option<IdentityDigest>,
}

/// Drives verification writes for one wallet. Owns its tracker.
#[derive(Debug)]
pub struct VerificationFlow<W> {
    wallet: W,
    registry: ChainRegistry,
    tracker: TransactionTracker,
}

impl<W: WalletSession> VerificationFlow<W> {
    pub fn new(wallet: W, registry: ChainRegistry) -> Self {
        Self {
            wallet,
            registry,
            tracker: TransactionTracker::new(),
        }
    }

    pub fn tracker(&self) -> &TransactionTracker {
        &self.tracker
    }

    pub fn state(&self) -> TransactionState {
        self.tracker.state()
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut W {
        &mut self.wallet
    }

    /// Record the digest of `record` for the connected account on `chain_id`.
    pub async fn submit_identity(
        &mut self,
        record: &IdentityRecord,
        chain_id: u64,
    ) -> VerificationResult<Submission> {
        record.validate().map_err(VerificationError::Validation)?;

        let target = self.registry.get(chain_id)?.clone();
        require_contract(&target)?;
        let account = self.ready_account(&target)?;
        let digest = compute_digest(record);

        tracing::info!(
            account = %account,
            chain = %target.name,
            digest = %digest,
            "Submitting identity verification"
        );

        let data = contract::encode_verify(account, digest);
        let mut submission = self.write(&target, data, "verify").await?;
        submission.digest = Some(digest);
        Ok(submission)
    }

    /// Relay the connected account's proof from `source_chain` to `destination_chain`.
    pub async fn transport_proof(
        &mut self,
        source_chain: u64,
        destination_chain: u64,
    ) -> VerificationResult<Submission> {
        if source_chain == destination_chain {
            return Err(VerificationError::Config(format!(
                "source and destination are both chain {}",
                source_chain
            )));
        }
        let source = self.registry.get(source_chain)?.clone();
        let destination = self.registry.get(destination_chain)?.clone();

        if destination.is_primary() {
            return Err(VerificationError::Config(format!(
                "{} is the primary chain and cannot receive transported proofs",
                destination.name
            )));
        }
        let routing_id = destination.cross_chain_id.ok_or_else(|| {
            VerificationError::Config(format!("{} has no cross_chain_id configured", destination.name))
        })?;
        require_contract(&source)?;
        require_contract(&destination)?;

        let account = self.ready_account(&source)?;
        tracing::info!(
            account = %account,
            source = %source.name,
            destination = %destination.name,
            "Transporting proof"
        );

        let data = contract::encode_transport_proof(destination.contract_address, routing_id);
        self.write(&source, data, "transport").await
    }

    /// Connected account, provided the wallet is on the target chain.
    fn ready_account(&self, target: &ChainTarget) -> VerificationResult<Address> {
        let account = self
            .wallet
            .current_account()
            .ok_or(BlockchainError::WalletNotConnected)?;

        match self.wallet.current_chain() {
            Some(id) if id == target.chain_id => Ok(account),
            Some(id) => Err(VerificationError::Wallet(format!(
                "wallet is on chain {}, switch to {} ({})",
                id, target.name, target.chain_id
            ))),
            None => Err(VerificationError::Wallet(format!(
                "wallet is not connected to {} ({})",
                target.name, target.chain_id
            ))),
        }
    }

    async fn write(
        &mut self,
        target: &ChainTarget,
        data: Bytes,
        action: &'static str,
    ) -> VerificationResult<Submission> {
        let result = self.drive(target, data).await;
        let outcome = match &result {
            Ok(_) => "confirmed",
            Err(e) => e.kind(),
        };
        metrics::record_submission(target.chain_id, action, outcome);
        result
    }

    async fn drive(&mut self, target: &ChainTarget, data: Bytes) -> VerificationResult<Submission> {
        self.tracker.apply(TxEvent::Submit)?;
        let attempt = self.tracker.attempt();

        let tx_hash = match self.wallet.submit(target.contract_address, data).await {
            Ok(hash) => hash,
            Err(e) => return Err(self.fail(attempt, e.reason(), e.into())),
        };
        if let Err(e) = self.tracker.apply(TxEvent::Approved { attempt, tx_hash }) {
            return Err(self.fail(attempt, e.to_string(), e.into()));
        }

        match self.wallet.await_receipt(tx_hash).await {
            Ok(ReceiptOutcome::Included { tx_hash: included, block_number }) => {
                if let Err(e) = self.tracker.apply(TxEvent::Included { attempt, tx_hash: included }) {
                    return Err(self.fail(attempt, e.to_string(), e.into()));
                }
                tracing::info!(tx_hash = %included, block_number, chain_id = target.chain_id, "Transaction confirmed");
                Ok(Submission {
                    attempt,
                    chain_id: target.chain_id,
                    tx_hash: included,
                    block_number,
                    digest: None,
                })
            }
            Ok(ReceiptOutcome::Reverted { tx_hash }) => {
                let reason = format!("transaction {} reverted", tx_hash);
                Err(self.fail(attempt, reason.clone(), VerificationError::Contract(reason)))
            }
            Err(e) => Err(self.fail(attempt, e.reason(), e.into())),
        }
    }

    /// Move the current attempt to `Failed` and hand back the error to report.
    fn fail(&mut self, attempt: u64, reason: String, error: VerificationError) -> VerificationError {
        tracing::warn!(attempt, reason = %reason, kind = error.kind(), "Transaction failed");
        if let Err(e) = self.tracker.apply(TxEvent::Failed { attempt, reason }) {
            tracing::debug!(error = %e, "Tracker did not accept failure event");
        }
        error
    }
}

/// A call to an address without code succeeds without doing anything, so a
/// write there would be reported as confirmed.
fn require_contract(target: &ChainTarget) -> VerificationResult<()> {
    if target.contract_address == Address::ZERO {
        return Err(VerificationError::Config(format!(
            "{} ({}) has no contract_address configured",
            target.name, target.chain_id
        )));
    }
    Ok(())
}
