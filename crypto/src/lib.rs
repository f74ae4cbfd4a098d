//! Hashing for the IQ oracle.
//!
//! - **SHA-256** for generic digests
//! - **Truncated SHA-256** (first 20 bytes) for prevote commitments
//!
//! Vote authenticity comes from the transaction layer; nothing here signs.

pub mod hash;
pub mod vote;

pub use hash::{sha256, sha256_multi, sha256_truncated};
pub use vote::{aggregate_vote_hash, verify_aggregate_vote_hash};
