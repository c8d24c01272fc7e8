//! Shared fixtures: an in-memory verification contract that can act as both
//! the chain-read transport and the connected wallet.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256};
use alloy::sol_types::{SolCall, SolValue};

use chain_identity::blockchain::contract::{
    getUserProofHashCall, isUserVerifiedCall, transportProofCall, verifyCall,
};
use chain_identity::blockchain::{
    BlockchainError, BlockchainResult, ChainReader, ChainRegistry, ChainTarget, ReceiptOutcome,
    WalletSession,
};
use chain_identity::config::ChainKind;
use chain_identity::IdentityRecord;

pub const FUJI: u64 = 43113;
pub const BEAM: u64 = 13337;
pub const DEXALOT: u64 = 432201;

/// How the wallet responds to the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBehavior {
    Accept,
    Reject,
    Revert,
    ZeroHash,
}

#[derive(Debug, Clone)]
enum Effect {
    Verify { chain_id: u64, user: Address, proof: B256 },
    Transport { user: Address, store: Address, routing: B256 },
}

#[derive(Debug, Default)]
struct LedgerState {
    proofs: HashMap<(u64, Address), B256>,
    transports: Vec<(Address, Address, B256)>,
    pending: HashMap<TxHash, (Effect, bool)>,
    nonce: u64,
    offline_chains: Vec<u64>,
    submissions: usize,
}

/// Shared contract state across chains.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, chain_id: u64) {
        self.state.lock().unwrap().offline_chains.push(chain_id);
    }

    pub fn record_proof(&self, chain_id: u64, user: Address, proof: B256) {
        self.state.lock().unwrap().proofs.insert((chain_id, user), proof);
    }

    pub fn proof(&self, chain_id: u64, user: Address) -> Option<B256> {
        self.state.lock().unwrap().proofs.get(&(chain_id, user)).copied()
    }

    pub fn transports(&self) -> Vec<(Address, Address, B256)> {
        self.state.lock().unwrap().transports.clone()
    }

    /// Writes the wallet has handed to the ledger, including rejected ones.
    pub fn submissions(&self) -> usize {
        self.state.lock().unwrap().submissions
    }

    pub fn wallet(&self, account: Address, chain_id: u64) -> MockWallet {
        MockWallet {
            ledger: self.clone(),
            account: Some(account),
            chain_id: Some(chain_id),
            behavior: WriteBehavior::Accept,
        }
    }

    pub fn disconnected_wallet(&self) -> MockWallet {
        MockWallet {
            ledger: self.clone(),
            account: None,
            chain_id: None,
            behavior: WriteBehavior::Accept,
        }
    }
}

impl ChainReader for MockLedger {
    async fn call(&self, chain_id: u64, _to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let state = self.state.lock().unwrap();
        if state.offline_chains.contains(&chain_id) {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        if let Ok(call) = isUserVerifiedCall::abi_decode(&data) {
            let known = state.proofs.contains_key(&(chain_id, call.user));
            return Ok(known.abi_encode().into());
        }
        if let Ok(call) = getUserProofHashCall::abi_decode(&data) {
            let proof = state
                .proofs
                .get(&(chain_id, call.user))
                .copied()
                .unwrap_or_default();
            return Ok(proof.abi_encode().into());
        }
        Err(BlockchainError::Reverted("unknown selector".to_string()))
    }
}

/// Wallet connected to the mock ledger.
#[derive(Debug, Clone)]
pub struct MockWallet {
    ledger: MockLedger,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub behavior: WriteBehavior,
}

impl WalletSession for MockWallet {
    fn current_account(&self) -> Option<Address> {
        self.account
    }

    fn current_chain(&self) -> Option<u64> {
        self.chain_id
    }

    async fn submit(&self, to: Address, data: Bytes) -> BlockchainResult<TxHash> {
        let user = self.account.ok_or(BlockchainError::WalletNotConnected)?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| BlockchainError::Wallet("no chain".to_string()))?;

        let mut state = self.ledger.state.lock().unwrap();
        state.submissions += 1;
        match self.behavior {
            WriteBehavior::Reject => return Err(BlockchainError::Rejected("user rejected".to_string())),
            WriteBehavior::ZeroHash => return Ok(TxHash::ZERO),
            WriteBehavior::Accept | WriteBehavior::Revert => {}
        }

        let effect = if let Ok(call) = verifyCall::abi_decode(&data) {
            Effect::Verify { chain_id, user: call.user, proof: call.proofHash }
        } else if let Ok(call) = transportProofCall::abi_decode(&data) {
            Effect::Transport {
                user,
                store: call.destinationProofStore,
                routing: call.destinationChainId,
            }
        } else {
            return Err(BlockchainError::Reverted(format!("unknown call to {}", to)));
        };

        state.nonce += 1;
        let tx_hash = keccak256(state.nonce.to_be_bytes());
        let reverts = self.behavior == WriteBehavior::Revert;
        state.pending.insert(tx_hash, (effect, reverts));
        Ok(tx_hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptOutcome> {
        let mut state = self.ledger.state.lock().unwrap();
        let (effect, reverts) = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| BlockchainError::Rpc(format!("unknown transaction {}", tx_hash)))?;
        if reverts {
            return Ok(ReceiptOutcome::Reverted { tx_hash });
        }
        match effect {
            Effect::Verify { chain_id, user, proof } => {
                state.proofs.insert((chain_id, user), proof);
            }
            Effect::Transport { user, store, routing } => {
                state.transports.push((user, store, routing));
            }
        }
        Ok(ReceiptOutcome::Included {
            tx_hash,
            block_number: 100 + state.nonce,
        })
    }
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

/// Fuji as primary plus two L1s, one of them without a routing id.
pub fn registry() -> ChainRegistry {
    let fuji = ChainTarget {
        contract_address: Address::repeat_byte(0xc0),
        ..ChainTarget::avalanche_fuji()
    };
    let beam = ChainTarget {
        name: "Beam L1".to_string(),
        chain_id: BEAM,
        rpc_url: "http://127.0.0.1:9650/ext/bc/beam/rpc".to_string(),
        failover_urls: Vec::new(),
        contract_address: Address::repeat_byte(0xbe),
        cross_chain_id: Some(B256::repeat_byte(0x0b)),
        kind: ChainKind::L1,
    };
    let dexalot = ChainTarget {
        name: "Dexalot L1".to_string(),
        chain_id: DEXALOT,
        cross_chain_id: None,
        contract_address: Address::repeat_byte(0xde),
        ..beam.clone()
    };
    ChainRegistry::new(vec![fuji, beam, dexalot])
}

pub fn jane() -> IdentityRecord {
    IdentityRecord {
        full_name: "Jane Doe".to_string(),
        email: "JANE@X.COM".to_string(),
        phone_number: "5551234567".to_string(),
        address: "123 Main St, Town".to_string(),
        document_type: "passport".to_string(),
        document_number: "AB12345".to_string(),
        additional_info: Some(String::new()),
    }
}
