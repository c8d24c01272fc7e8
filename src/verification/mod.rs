//! Verification core: transaction tracking, status reads and the flows that
//! combine them with the identity digest.

pub mod error;
pub mod flow;
pub mod status;
pub mod tracker;

pub use error::{VerificationError, VerificationResult};
pub use flow::{Submission, VerificationFlow};
pub use status::{ChainStatus, StatusReader, VerificationStatus};
pub use tracker::{TransactionState, TransactionTracker, TransitionError, TxEvent};
