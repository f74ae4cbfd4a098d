//! Collaborator interfaces.
//!
//! The oracle does not own stake, balances, or reward pools. It reads and
//! mutates them through these traits, which the host application (or the
//! nullables in tests) implements.

pub mod bank;
pub mod distribution;
pub mod staking;

pub use bank::BankKeeper;
pub use distribution::{BallotWinners, RewardDistributor, Winner};
pub use staking::{StakingError, StakingKeeper, ValidatorInfo};
