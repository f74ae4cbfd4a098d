//! Per-tally validator claims.

use std::collections::BTreeMap;

use iq_keepers::StakingKeeper;
use iq_types::ValAddress;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// A bonded validator's stake for one tally, and what it has won so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorClaim {
    pub recipient: ValAddress,
    pub power: u64,
    /// Sum of winning power across this period's ballots.
    pub weight: u64,
    pub win_count: u64,
}

impl ValidatorClaim {
    pub fn new(recipient: ValAddress, power: u64) -> Self {
        Self {
            recipient,
            power,
            weight: 0,
            win_count: 0,
        }
    }

    /// Credit one ballot win.
    pub fn record_win(&mut self, power: u64) -> Result<(), OracleError> {
        self.weight = self
            .weight
            .checked_add(power)
            .ok_or(OracleError::Overflow("claim weight"))?;
        self.win_count = self
            .win_count
            .checked_add(1)
            .ok_or(OracleError::Overflow("claim win count"))?;
        Ok(())
    }
}

pub type ClaimMap = BTreeMap<ValAddress, ValidatorClaim>;

/// One claim per currently bonded validator.
pub fn build_claim_map(staking: &impl StakingKeeper) -> ClaimMap {
    staking
        .bonded_validators()
        .into_iter()
        .filter(|v| v.is_bonded())
        .map(|v| {
            let claim = ValidatorClaim::new(v.operator.clone(), v.power);
            (v.operator, claim)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_nullables::NullStakingKeeper;

    #[test]
    fn claims_cover_bonded_validators_only() {
        let staking = NullStakingKeeper::new();
        let a = ValAddress::new("iqvaloper1a").unwrap();
        let b = ValAddress::new("iqvaloper1b").unwrap();
        staking.add_validator(a.clone(), 10);
        staking.add_unbonded_validator(b.clone(), 50);

        let claims = build_claim_map(&staking);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[&a].power, 10);
        assert_eq!(claims[&a].win_count, 0);
    }

    #[test]
    fn record_win_overflow_is_error() {
        let mut claim = ValidatorClaim::new(ValAddress::new("iqvaloper1a").unwrap(), 1);
        claim.weight = u64::MAX;
        assert!(matches!(claim.record_win(1), Err(OracleError::Overflow(_))));
    }
}
