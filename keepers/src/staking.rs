//! Staking collaborator.

use iq_types::{BlockHeight, Decimal, ValAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the oracle needs to know about one validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub operator: ValAddress,
    /// Consensus voting power.
    pub power: u64,
    pub bonded: bool,
    pub jailed: bool,
}

impl ValidatorInfo {
    pub fn is_bonded(&self) -> bool {
        self.bonded && !self.jailed
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("validator not found: {0}")]
    ValidatorNotFound(ValAddress),

    #[error("validator already jailed: {0}")]
    AlreadyJailed(ValAddress),

    #[error("staking failure: {0}")]
    Other(String),
}

pub trait StakingKeeper {
    /// Every bonded validator, sorted by operator address.
    fn bonded_validators(&self) -> Vec<ValidatorInfo>;

    /// Any known validator, bonded or not.
    fn validator(&self, operator: &ValAddress) -> Option<ValidatorInfo>;

    /// Sum of the power of all bonded validators.
    fn total_bonded_power(&self) -> u64;

    /// Burn `fraction` of the stake the validator had at `infraction_height`.
    fn slash(
        &self,
        operator: &ValAddress,
        infraction_height: BlockHeight,
        power: u64,
        fraction: Decimal,
    ) -> Result<(), StakingError>;

    fn jail(&self, operator: &ValAddress) -> Result<(), StakingError>;
}
