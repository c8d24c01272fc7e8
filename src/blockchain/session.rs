//! Capability interfaces over the wallet and the chain-read transport.
//!
//! The verification core only talks to these traits. Production code plugs in
//! [`LocalWallet`](crate::blockchain::wallet::LocalWallet) and
//! [`RpcRouter`](crate::blockchain::client::RpcRouter); tests plug in an
//! in-memory contract.

use std::future::Future;

use alloy::primitives::{Address, Bytes, TxHash};

use crate::blockchain::types::{BlockchainResult, ReceiptOutcome};

/// Read-only contract calls, routed by chain id.
pub trait ChainReader: Send + Sync {
    /// Execute an `eth_call` against `to` on the given chain.
    fn call(
        &self,
        chain_id: u64,
        to: Address,
        data: Bytes,
    ) -> impl Future<Output = BlockchainResult<Bytes>> + Send;
}

/// The connected wallet: identity, active chain and write primitives.
pub trait WalletSession: Send + Sync {
    /// Connected account, `None` when disconnected.
    fn current_account(&self) -> Option<Address>;

    /// Chain the wallet is currently pointed at.
    fn current_chain(&self) -> Option<u64>;

    /// Sign and broadcast a contract write. Resolves once the wallet hands
    /// back a transaction hash.
    fn submit(
        &self,
        to: Address,
        data: Bytes,
    ) -> impl Future<Output = BlockchainResult<TxHash>> + Send;

    /// Wait until the transaction is included or reverts.
    fn await_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<ReceiptOutcome>> + Send;
}
