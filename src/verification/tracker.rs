//! Lifecycle of a single contract write, as an explicit state machine.
//!
//! ```text
//! Idle ──Submit──▶ AwaitingApproval ──Approved(tx)──▶ Pending(tx) ──Included(tx)──▶ Confirmed(tx)
//!                        │                                 │
//!                        └──────────Failed(reason)─────────┴──────▶ Failed(reason)
//! Confirmed | Failed ──Submit──▶ AwaitingApproval (new attempt)
//! ```
//!
//! The tracker stores and publishes state only. It never polls, retries or
//! times out; events come from whoever drives the chain-write client.

use alloy::primitives::TxHash;
use thiserror::Error;
use tokio::sync::watch;

use crate::observability::metrics;

/// Latest known state of the outstanding write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionState {
    #[default]
    Idle,
    /// Submitted to the wallet, waiting for the user to sign.
    AwaitingApproval,
    /// Broadcast, waiting for inclusion.
    Pending(TxHash),
    Confirmed(TxHash),
    /// Raw error text from the chain-write client.
    Failed(String),
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::Failed(_))
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Pending(h) | Self::Confirmed(h) => Some(*h),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Pending(_) => "pending",
            Self::Confirmed(_) => "confirmed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Notifications that drive the state machine.
///
/// Every event except `Submit` names the attempt it belongs to, so results of
/// an abandoned attempt cannot leak into a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    Submit,
    Approved { attempt: u64, tx_hash: TxHash },
    Included { attempt: u64, tx_hash: TxHash },
    Failed { attempt: u64, reason: String },
}

impl TxEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approved { .. } => "approved",
            Self::Included { .. } => "included",
            Self::Failed { .. } => "failed",
        }
    }

    fn attempt(&self) -> Option<u64> {
        match self {
            Self::Submit => None,
            Self::Approved { attempt, .. }
            | Self::Included { attempt, .. }
            | Self::Failed { attempt, .. } => Some(*attempt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("event for attempt {event_attempt} ignored, current attempt is {current}")]
    Stale { event_attempt: u64, current: u64 },

    #[error("cannot apply '{event}' in state '{state}'")]
    Invalid {
        state: &'static str,
        event: &'static str,
    },

    #[error("wallet returned an empty transaction hash")]
    EmptyTxHash,

    #[error("receipt for {got} does not match pending transaction {expected}")]
    HashMismatch { expected: TxHash, got: TxHash },
}

/// The transition function. Pure: attempt bookkeeping lives in the tracker.
pub fn next_state(
    state: &TransactionState,
    event: &TxEvent,
) -> Result<TransactionState, TransitionError> {
    use TransactionState as S;

    match (state, event) {
        (S::Idle | S::Confirmed(_) | S::Failed(_), TxEvent::Submit) => Ok(S::AwaitingApproval),

        (S::AwaitingApproval, TxEvent::Approved { tx_hash, .. }) => {
            if *tx_hash == TxHash::ZERO {
                Err(TransitionError::EmptyTxHash)
            } else {
                Ok(S::Pending(*tx_hash))
            }
        }

        (S::Pending(expected), TxEvent::Included { tx_hash, .. }) => {
            if expected == tx_hash {
                Ok(S::Confirmed(*tx_hash))
            } else {
                Err(TransitionError::HashMismatch {
                    expected: *expected,
                    got: *tx_hash,
                })
            }
        }

        (S::AwaitingApproval | S::Pending(_), TxEvent::Failed { reason, .. }) => {
            Ok(S::Failed(reason.clone()))
        }

        (state, event) => Err(TransitionError::Invalid {
            state: state.label(),
            event: event.label(),
        }),
    }
}

/// Owns the state of one verification flow and publishes every change.
#[derive(Debug)]
pub struct TransactionTracker {
    attempt: u64,
    state: watch::Sender<TransactionState>,
}

impl Default for TransactionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TransactionState::Idle);
        Self { attempt: 0, state }
    }

    /// Current state snapshot.
    pub fn state(&self) -> TransactionState {
        self.state.borrow().clone()
    }

    /// Number of the current attempt; 0 before the first submit.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Observe state changes, e.g. to render a status indicator.
    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.state.subscribe()
    }

    /// Apply an event. On error the state is left unchanged.
    pub fn apply(&mut self, event: TxEvent) -> Result<TransactionState, TransitionError> {
        if let Some(event_attempt) = event.attempt() {
            if event_attempt != self.attempt {
                tracing::debug!(
                    event = event.label(),
                    event_attempt,
                    current = self.attempt,
                    "Discarding event from an earlier attempt"
                );
                return Err(TransitionError::Stale {
                    event_attempt,
                    current: self.attempt,
                });
            }
        }

        let current = self.state();
        let next = next_state(&current, &event)?;
        if event == TxEvent::Submit {
            self.attempt += 1;
        }

        tracing::debug!(
            attempt = self.attempt,
            from = current.label(),
            to = next.label(),
            "Transaction state changed"
        );
        metrics::record_tx_transition(next.label());
        self.state.send_replace(next.clone());
        Ok(next)
    }
}
