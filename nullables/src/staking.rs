//! Nullable staking keeper - a scripted validator set.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use iq_keepers::{StakingError, StakingKeeper, ValidatorInfo};
use iq_types::{BlockHeight, Decimal, ValAddress};

/// One `slash` call as observed by the keeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashRecord {
    pub operator: ValAddress,
    pub infraction_height: BlockHeight,
    pub power: u64,
    pub fraction: Decimal,
}

#[derive(Default)]
struct State {
    validators: BTreeMap<ValAddress, ValidatorInfo>,
    slashes: Vec<SlashRecord>,
    jailed: Vec<ValAddress>,
    fail_slashing: bool,
}

/// A validator set controlled by the test.
///
/// Jailing flips the validator's `jailed` flag, so a jailed validator drops
/// out of `bonded_validators` exactly as it would on a live chain.
#[derive(Default)]
pub struct NullStakingKeeper {
    state: Mutex<State>,
}

impl NullStakingKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a bonded, unjailed validator.
    pub fn add_validator(&self, operator: ValAddress, power: u64) {
        let info = ValidatorInfo {
            operator: operator.clone(),
            power,
            bonded: true,
            jailed: false,
        };
        self.lock().validators.insert(operator, info);
    }

    /// Add a validator that exists but is not in the active set.
    pub fn add_unbonded_validator(&self, operator: ValAddress, power: u64) {
        let info = ValidatorInfo {
            operator: operator.clone(),
            power,
            bonded: false,
            jailed: false,
        };
        self.lock().validators.insert(operator, info);
    }

    /// Make `slash` and `jail` return errors.
    pub fn set_fail_slashing(&self, fail: bool) {
        self.lock().fail_slashing = fail;
    }

    pub fn slashes(&self) -> Vec<SlashRecord> {
        self.lock().slashes.clone()
    }

    pub fn jailed(&self) -> Vec<ValAddress> {
        self.lock().jailed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StakingKeeper for NullStakingKeeper {
    fn bonded_validators(&self) -> Vec<ValidatorInfo> {
        self.lock()
            .validators
            .values()
            .filter(|v| v.is_bonded())
            .cloned()
            .collect()
    }

    fn validator(&self, operator: &ValAddress) -> Option<ValidatorInfo> {
        self.lock().validators.get(operator).cloned()
    }

    fn total_bonded_power(&self) -> u64 {
        self.lock()
            .validators
            .values()
            .filter(|v| v.is_bonded())
            .fold(0u64, |acc, v| acc.saturating_add(v.power))
    }

    fn slash(
        &self,
        operator: &ValAddress,
        infraction_height: BlockHeight,
        power: u64,
        fraction: Decimal,
    ) -> Result<(), StakingError> {
        let mut state = self.lock();
        if state.fail_slashing {
            return Err(StakingError::Other("slashing disabled".into()));
        }
        if !state.validators.contains_key(operator) {
            return Err(StakingError::ValidatorNotFound(operator.clone()));
        }
        state.slashes.push(SlashRecord {
            operator: operator.clone(),
            infraction_height,
            power,
            fraction,
        });
        Ok(())
    }

    fn jail(&self, operator: &ValAddress) -> Result<(), StakingError> {
        let mut state = self.lock();
        if state.fail_slashing {
            return Err(StakingError::Other("jailing disabled".into()));
        }
        let info = state
            .validators
            .get_mut(operator)
            .ok_or_else(|| StakingError::ValidatorNotFound(operator.clone()))?;
        if info.jailed {
            return Err(StakingError::AlreadyJailed(operator.clone()));
        }
        info.jailed = true;
        state.jailed.push(operator.clone());
        Ok(())
    }
}
