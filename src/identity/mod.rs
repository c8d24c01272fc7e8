//! Identity records and their on-chain digest.
//!
//! # Data Flow
//! ```text
//! IdentityRecord (user input)
//!     → record.rs (validate, normalize)
//!     → NormalizedIdentity::canonical_json (fixed key order)
//!     → digest.rs (keccak256 → bytes32)
//! ```

pub mod digest;
pub mod record;

pub use digest::{compute_digest, IdentityDigest};
pub use record::{FieldError, IdentityRecord, NormalizedIdentity};
