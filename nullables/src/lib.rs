//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the oracle (storage, staking, bank, reward
//! distribution) is abstracted behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what was done to them, for assertions
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod distribution;
pub mod staking;
pub mod store;

pub use bank::NullBankKeeper;
pub use distribution::NullRewardDistributor;
pub use staking::{NullStakingKeeper, SlashRecord};
pub use store::NullOracleStore;
